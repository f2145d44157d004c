//! HTTP response types for the transport.
//!
//! [`HttpResponse`] keeps the raw body bytes and the response headers, and
//! exposes the Shopify-specific headers (`Link`, `Retry-After`,
//! `X-Shopify-Shop-Api-Call-Limit`, `X-Request-Id`,
//! `X-Shopify-API-Deprecated-Reason`) as typed accessors.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::clients::errors::HttpResponseError;
use crate::clients::pagination::PageCursor;

/// Rate limit information parsed from the `X-Shopify-Shop-Api-Call-Limit` header.
///
/// The header format is "X/Y" where X is the number of requests currently in
/// the bucket and Y is the bucket size.
///
/// # Example
///
/// ```rust
/// use httpshopify::ApiCallLimit;
///
/// let limit = ApiCallLimit::parse("32/40").unwrap();
/// assert_eq!(limit.request_count, 32);
/// assert_eq!(limit.bucket_size, 40);
/// assert_eq!(limit.remaining(), 8);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiCallLimit {
    /// The current number of requests made in this bucket.
    pub request_count: u32,
    /// The maximum number of requests allowed in this bucket.
    pub bucket_size: u32,
}

impl ApiCallLimit {
    /// Parses the rate limit header value, returning `None` if malformed.
    #[must_use]
    pub fn parse(header_value: &str) -> Option<Self> {
        let (count, size) = header_value.trim().split_once('/')?;
        Some(Self {
            request_count: count.trim().parse().ok()?,
            bucket_size: size.trim().parse().ok()?,
        })
    }

    /// Requests left before Shopify starts answering 429.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.bucket_size.saturating_sub(self.request_count)
    }
}

/// Response headers with case-insensitive lookup.
///
/// Names are stored lowercased; a header sent several times keeps every value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    headers: HashMap<String, Vec<String>>,
}

impl ResponseHeaders {
    /// Builds response headers from `(name, value)` pairs.
    #[must_use]
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        let mut headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in pairs {
            headers
                .entry(name.as_ref().to_lowercase())
                .or_default()
                .push(value.into());
        }
        Self { headers }
    }

    pub(crate) fn from_header_map(map: &reqwest::header::HeaderMap) -> Self {
        Self::from_pairs(map.iter().map(|(name, value)| {
            (
                name.as_str(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        }))
    }

    /// Returns the first value of a header, or `None` if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value of a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }
}

/// A response received from the Shopify API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The response headers.
    pub headers: ResponseHeaders,
    /// The raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a new response.
    #[must_use]
    pub const fn new(code: u16, headers: ResponseHeaders, body: Vec<u8>) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns the pagination cursor from the `Link` header.
    #[must_use]
    pub fn cursor(&self) -> PageCursor {
        self.headers
            .get("link")
            .map_or_else(PageCursor::default, PageCursor::parse)
    }

    /// Returns the `Retry-After` delay, if present and valid.
    ///
    /// Shopify sends seconds, possibly fractional (`"2.0"`).
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        let seconds: f64 = self.headers.get("retry-after")?.trim().parse().ok()?;
        if seconds.is_sign_negative() {
            return None;
        }
        Duration::try_from_secs_f64(seconds).ok()
    }

    /// Returns the parsed `X-Shopify-Shop-Api-Call-Limit` header.
    #[must_use]
    pub fn api_call_limit(&self) -> Option<ApiCallLimit> {
        self.headers
            .get("x-shopify-shop-api-call-limit")
            .and_then(ApiCallLimit::parse)
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get("x-request-id")
    }

    /// Returns the `X-Shopify-API-Deprecated-Reason` header value, if present.
    #[must_use]
    pub fn deprecation_reason(&self) -> Option<&str> {
        self.headers.get("x-shopify-api-deprecated-reason")
    }

    /// Converts this response into an [`HttpResponseError`], keeping the
    /// body, request id and retry hint.
    #[must_use]
    pub fn into_error(self) -> HttpResponseError {
        HttpResponseError {
            code: self.code,
            request_id: self.request_id().map(String::from),
            retry_after: self.retry_after(),
            body: String::from_utf8_lossy(&self.body).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(code: u16, headers: &[(&str, &str)]) -> HttpResponse {
        HttpResponse::new(
            code,
            ResponseHeaders::from_pairs(headers.iter().copied()),
            b"{}".to_vec(),
        )
    }

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in 200..=299 {
            assert!(response(code, &[]).is_ok(), "{code}");
        }
        for code in [199, 300, 400, 429, 500] {
            assert!(!response(code, &[]).is_ok(), "{code}");
        }
    }

    #[test]
    fn test_api_call_limit_parsing() {
        let limit = ApiCallLimit::parse("40/80").unwrap();
        assert_eq!(limit.request_count, 40);
        assert_eq!(limit.bucket_size, 80);

        assert!(ApiCallLimit::parse("invalid").is_none());
        assert!(ApiCallLimit::parse("40").is_none());
        assert!(ApiCallLimit::parse("40/").is_none());
        assert!(ApiCallLimit::parse("/80").is_none());
        assert!(ApiCallLimit::parse("abc/def").is_none());

        assert_eq!(ApiCallLimit::parse("90/80").unwrap().remaining(), 0);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let resp = response(200, &[("X-Request-Id", "req-1"), ("Link", "<a>; rel=\"next\"")]);
        assert_eq!(resp.request_id(), Some("req-1"));
        assert_eq!(resp.headers.get("x-REQUEST-id"), Some("req-1"));
        assert!(resp.headers.contains("link"));
        assert!(!resp.headers.contains("retry-after"));
    }

    #[test]
    fn test_repeated_headers_keep_every_value() {
        let headers = ResponseHeaders::from_pairs([("Set-Cookie", "a=1"), ("set-cookie", "b=2")]);
        assert_eq!(headers.get_all("Set-Cookie"), ["a=1", "b=2"]);
        assert_eq!(headers.get("set-cookie"), Some("a=1"));
        assert!(headers.get_all("missing").is_empty());
    }

    #[test]
    fn test_retry_after_parsing() {
        let resp = response(429, &[("Retry-After", "2.5")]);
        assert_eq!(resp.retry_after(), Some(Duration::from_millis(2500)));

        let resp = response(429, &[("Retry-After", "4")]);
        assert_eq!(resp.retry_after(), Some(Duration::from_secs(4)));

        for bad in ["-1", "soon", "", "NaN", "inf"] {
            assert!(response(429, &[("Retry-After", bad)]).retry_after().is_none(), "{bad}");
        }
        assert!(response(429, &[]).retry_after().is_none());
    }

    #[test]
    fn test_cursor_from_link_header() {
        let resp = response(
            200,
            &[("link", r#"<https://shop/next>; rel="next", <https://shop/prev>; rel="previous""#)],
        );
        let cursor = resp.cursor();
        assert_eq!(cursor.next.as_deref(), Some("https://shop/next"));
        assert_eq!(cursor.previous.as_deref(), Some("https://shop/prev"));

        assert!(!response(200, &[]).cursor().has_next());
    }

    #[test]
    fn test_json_body() {
        let resp = HttpResponse::new(
            200,
            ResponseHeaders::default(),
            br#"{"order":{"id":1}}"#.to_vec(),
        );
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value, json!({"order": {"id": 1}}));
        assert_eq!(resp.text(), r#"{"order":{"id":1}}"#);
    }

    #[test]
    fn test_into_error_keeps_metadata() {
        let resp = HttpResponse::new(
            503,
            ResponseHeaders::from_pairs([("x-request-id", "abc-123"), ("retry-after", "1")]),
            b"unavailable".to_vec(),
        );
        let error = resp.into_error();
        assert_eq!(error.code, 503);
        assert_eq!(error.body, "unavailable");
        assert_eq!(error.request_id.as_deref(), Some("abc-123"));
        assert_eq!(error.retry_after, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_deprecation_reason() {
        let resp = response(200, &[("X-Shopify-API-Deprecated-Reason", "use GraphQL")]);
        assert_eq!(resp.deprecation_reason(), Some("use GraphQL"));
    }
}
