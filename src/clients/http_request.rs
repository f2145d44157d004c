//! HTTP request types for the transport.
//!
//! [`HttpRequest`] describes one logical request: method, absolute URL,
//! per-call headers and an optional body. The same request is re-sent verbatim
//! on every retry.

use std::fmt;

use reqwest::header::{HeaderName, HeaderValue};

use crate::clients::errors::InvalidHttpRequestError;
use crate::clients::headers::HeaderSet;

/// HTTP methods used by the Shopify REST Admin API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources and triggering actions.
    Post,
    /// HTTP PUT method for updating resources.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl HttpMethod {
    /// Returns `true` if repeating the request has the same effect as sending it once.
    #[must_use]
    pub const fn is_idempotent(self) -> bool {
        matches!(self, Self::Get | Self::Put | Self::Delete)
    }

    pub(crate) const fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request to send through [`HttpClient`](crate::HttpClient).
///
/// # Example
///
/// ```rust
/// use httpshopify::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(
///     HttpMethod::Post,
///     "https://my-store.myshopify.com/admin/api/2021-04/orders/1/close.json",
/// )
/// .json(json!({}))
/// .header("X-Request-Tag", "close-order")
/// .build()
/// .unwrap();
///
/// assert_eq!(request.headers.get("content-type"), Some("application/json"));
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub method: HttpMethod,
    /// The absolute URL for this request.
    pub url: String,
    /// Per-call headers; these win over the client's defaults.
    pub headers: HeaderSet,
    /// Query parameters appended to the URL, in order.
    pub query: Vec<(String, String)>,
    /// The raw request body, if any.
    pub body: Option<Vec<u8>>,
    /// Whether the client's retry policy applies to this request.
    pub retry: bool,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// Validates the URL and headers.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the URL is not an absolute
    /// `http(s)` URL or a header is not valid HTTP.
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        let url = reqwest::Url::parse(&self.url).map_err(|e| InvalidHttpRequestError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidHttpRequestError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        for header in &self.headers {
            let valid = HeaderName::from_bytes(header.name.as_bytes()).is_ok()
                && HeaderValue::from_str(&header.value).is_ok();
            if !valid {
                return Err(InvalidHttpRequestError::InvalidHeader {
                    name: header.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: HttpMethod,
    url: String,
    headers: HeaderSet,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    retry: bool,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderSet::new(),
            query: Vec::new(),
            body: None,
            retry: true,
        }
    }

    /// Sets a raw request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and the matching `Content-Type` header.
    #[must_use]
    pub fn json(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into().to_string().into_bytes());
        self.headers.set("Content-Type", "application/json");
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a per-call header, replacing an earlier one with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Replaces all per-call headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderSet) -> Self {
        self.headers = headers;
        self
    }

    /// Opts this request out of the client's retry policy.
    #[must_use]
    pub const fn no_retry(mut self) -> Self {
        self.retry = false;
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            body: self.body,
            retry: self.retry,
        };
        request.verify()?;
        Ok(request)
    }
}
