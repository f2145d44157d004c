//! HTTP error taxonomy for the transport.
//!
//! Every failure surfaces as one [`HttpError`]. Statuses with a dedicated
//! meaning get their own variant so callers can branch on them; anything else
//! in the error range lands in [`HttpError::Status`] with the raw body kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use httpshopify::{HeaderSet, HttpError};
//!
//! match client.get(&url, &HeaderSet::new()).await {
//!     Ok(response) => println!("{} bytes", response.body.len()),
//!     Err(HttpError::NotFound(e)) => println!("missing: {e}"),
//!     Err(HttpError::Unprocessable(e)) => {
//!         for (field, messages) in &e.errors {
//!             println!("{field}: {}", messages.join(", "));
//!         }
//!     }
//!     Err(e) if e.is_retryable() => println!("gave up after retries: {e}"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::clients::status::StatusClass;

/// An error-range response, kept verbatim.
///
/// # Example
///
/// ```rust
/// use httpshopify::HttpResponseError;
///
/// let error = HttpResponseError::new(503, r#"{"errors":"Unavailable"}"#);
/// assert_eq!(error.to_string(), r#"HTTP 503: {"errors":"Unavailable"}"#);
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("HTTP {code}: {body}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The raw response body, lossily decoded as UTF-8.
    pub body: String,
    /// The `X-Request-Id` header, for reporting to Shopify support.
    pub request_id: Option<String>,
    /// The server's `Retry-After` hint, if one was sent.
    pub retry_after: Option<Duration>,
}

impl HttpResponseError {
    /// Creates an error for a status and body with no header metadata.
    #[must_use]
    pub fn new(code: u16, body: impl Into<String>) -> Self {
        Self {
            code,
            body: body.into(),
            request_id: None,
            retry_after: None,
        }
    }

    /// Parses the body as JSON, if it is JSON.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// A 422 Unprocessable Entity response.
///
/// Shopify reports validation failures as `{"errors": {"field": ["message"]}}`.
/// Messages that are not tied to a field (a bare string or array under
/// `errors`, or an `error` key) are collected under `"base"`.
///
/// ```rust
/// use httpshopify::{HttpResponseError, ValidationError};
///
/// let error = ValidationError::from_response(HttpResponseError::new(
///     422,
///     r#"{"errors":{"title":["can't be blank"]}}"#,
/// ));
/// assert_eq!(error.errors["title"], vec!["can't be blank".to_string()]);
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub struct ValidationError {
    /// Messages keyed by field name.
    pub errors: BTreeMap<String, Vec<String>>,
    /// The underlying response.
    pub response: HttpResponseError,
}

impl ValidationError {
    const BASE: &'static str = "base";

    /// Builds a validation error from a 422 response, extracting any
    /// per-field messages from its body.
    #[must_use]
    pub fn from_response(response: HttpResponseError) -> Self {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        if let Some(body) = response.json() {
            match body.get("errors") {
                Some(serde_json::Value::Object(fields)) => {
                    for (field, value) in fields {
                        errors
                            .entry(field.clone())
                            .or_default()
                            .extend(Self::messages(value));
                    }
                }
                Some(other) => {
                    errors
                        .entry(Self::BASE.to_string())
                        .or_default()
                        .extend(Self::messages(other));
                }
                None => {}
            }
            if let Some(error) = body.get("error") {
                errors
                    .entry(Self::BASE.to_string())
                    .or_default()
                    .extend(Self::messages(error));
            }
        }

        errors.retain(|_, messages| !messages.is_empty());
        Self { errors, response }
    }

    /// Returns the messages for one field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.errors.get(name).map_or(&[], Vec::as_slice)
    }

    fn messages(value: &serde_json::Value) -> Vec<String> {
        match value {
            serde_json::Value::String(s) => vec![s.clone()],
            serde_json::Value::Array(items) => items.iter().flat_map(Self::messages).collect(),
            serde_json::Value::Null => Vec::new(),
            other => vec![other.to_string()],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unprocessable entity: ")?;
        if self.errors.is_empty() {
            return f.write_str(&self.response.body);
        }
        let summary = self
            .errors
            .iter()
            .map(|(field, messages)| format!("{field} {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&summary)
    }
}

/// A resource that does not exist.
///
/// Raised for a 404 response, or by a caller that decoded a successful
/// response and found the entity missing (for example an unset `id`).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub struct NotFoundError {
    /// The kind of resource, when known (e.g. `"order"`).
    pub resource: Option<String>,
    /// The identifier that was looked up, when known.
    pub id: Option<String>,
    /// The 404 response, when the remote service produced one.
    pub response: Option<HttpResponseError>,
}

impl NotFoundError {
    /// A not-found condition detected after decoding a response.
    ///
    /// ```rust
    /// use httpshopify::NotFoundError;
    ///
    /// let error = NotFoundError::resource("order", 450789469);
    /// assert_eq!(error.to_string(), "order 450789469 not found");
    /// ```
    #[must_use]
    pub fn resource(kind: impl Into<String>, id: impl fmt::Display) -> Self {
        Self {
            resource: Some(kind.into()),
            id: Some(id.to_string()),
            response: None,
        }
    }

    /// A not-found condition reported by the remote service.
    #[must_use]
    pub const fn from_response(response: HttpResponseError) -> Self {
        Self {
            resource: None,
            id: None,
            response: Some(response),
        }
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.resource, &self.id, &self.response) {
            (Some(resource), Some(id), _) => write!(f, "{resource} {id} not found"),
            (Some(resource), None, _) => write!(f, "{resource} not found"),
            (None, _, Some(response)) => write!(f, "not found: {response}"),
            (None, _, None) => f.write_str("not found"),
        }
    }
}

/// A request that failed validation before it was sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The URL could not be parsed as an absolute URL.
    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL that was provided.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}'.")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },
}

/// Unified error type for all transport operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// 400: the request was malformed.
    #[error("bad request: {0}")]
    BadRequest(HttpResponseError),

    /// 401: the access token was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(HttpResponseError),

    /// 404, or a missing entity detected after decoding.
    #[error(transparent)]
    NotFound(NotFoundError),

    /// 422: the request was understood but rejected.
    #[error(transparent)]
    Unprocessable(ValidationError),

    /// 429: Shopify's own rate limit rejected the request.
    #[error("too many requests: {0}")]
    TooManyRequests(HttpResponseError),

    /// 500: Shopify failed to process the request.
    #[error("internal server error: {0}")]
    InternalServer(HttpResponseError),

    /// Any other error-range status.
    #[error("unexpected status: {0}")]
    Status(HttpResponseError),

    /// The request did not complete: connection failure, timeout, or a body
    /// that could not be read.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request validation failed before sending.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// A successful response body could not be decoded.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The caller cancelled the request while it was waiting.
    #[error("request cancelled")]
    Cancelled,
}

impl HttpError {
    /// Maps an error-range response to its typed error.
    ///
    /// The caller is responsible for only passing error-range responses.
    #[must_use]
    pub fn from_response(response: HttpResponseError) -> Self {
        match response.code {
            400 => Self::BadRequest(response),
            401 => Self::Unauthorized(response),
            404 => Self::NotFound(NotFoundError::from_response(response)),
            422 => Self::Unprocessable(ValidationError::from_response(response)),
            429 => Self::TooManyRequests(response),
            500 => Self::InternalServer(response),
            _ => Self::Status(response),
        }
    }

    /// Returns the response behind this error, if there was one.
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponseError> {
        match self {
            Self::BadRequest(r)
            | Self::Unauthorized(r)
            | Self::TooManyRequests(r)
            | Self::InternalServer(r)
            | Self::Status(r) => Some(r),
            Self::Unprocessable(e) => Some(&e.response),
            Self::NotFound(e) => e.response.as_ref(),
            Self::Network(_) | Self::InvalidRequest(_) | Self::Decode(_) | Self::Cancelled => None,
        }
    }

    /// Returns the HTTP status code, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            other => other.response().map(|r| r.code),
        }
    }

    /// Returns `true` for failures the retry loop will retry: 429, 5xx, and
    /// transport failures where no response arrived.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(e) => !e.is_builder(),
            other => other
                .response()
                .is_some_and(|r| StatusClass::of(r.code) == StatusClass::Retryable),
        }
    }

    /// Returns `true` for [`HttpError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
