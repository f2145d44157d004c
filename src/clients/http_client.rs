//! HTTP client for Shopify API communication.
//!
//! This module provides the [`HttpClient`] type, which paces, retries and
//! classifies every request sent to one shop.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;

use crate::clients::errors::{HttpError, InvalidHttpRequestError};
use crate::clients::headers::HeaderSet;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::{HttpResponse, ResponseHeaders};
use crate::clients::pagination::Paginator;
use crate::clients::rate_limit::{RateLimit, RateLimiter};
use crate::clients::retry::RetryConfig;
use crate::clients::status::StatusClass;
use crate::config::ClientConfig;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the Shopify API.
///
/// Every request goes through the same steps:
///
/// 1. wait for a token from the client's [`RateLimiter`]
/// 2. merge the request's headers over the client's defaults
/// 3. send it; on a 429, a 5xx or a transport failure, wait (the server's
///    `Retry-After` if given, exponential backoff plus jitter otherwise) and
///    send the identical request again, up to [`RetryConfig::max_retries`] times
/// 4. return the body on success, or the typed [`HttpError`] of the last attempt
///
/// Other 4xx statuses are returned immediately.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`. Share one instance (for example behind an
/// `Arc`) between every caller that talks to the same shop, so they all draw
/// from the same rate limit and connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use httpshopify::{HeaderSet, HttpClient, RateLimit, RetryConfig};
///
/// let client = HttpClient::new(
///     HeaderSet::from_pairs([("X-Shopify-Access-Token", "shpat_123")]),
///     RateLimit::standard(),
///     RetryConfig::none(),
/// )?;
///
/// let response = client
///     .get("https://my-store.myshopify.com/admin/api/2021-04/shop.json", &HeaderSet::new())
///     .await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    default_headers: HeaderSet,
    limiter: RateLimiter,
    retry: RetryConfig,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a client with explicit default headers, quota and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying TLS client cannot be
    /// initialized.
    pub fn new(
        default_headers: HeaderSet,
        rate_limit: RateLimit,
        retry: RetryConfig,
    ) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_reqwest(client, default_headers, rate_limit, retry))
    }

    /// Creates a client for the shop described by `config`.
    ///
    /// Default headers: `X-Shopify-Access-Token`, `Content-Type` and `Accept`
    /// (both `application/json`) and a `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying TLS client cannot be
    /// initialized.
    pub fn from_config(config: &ClientConfig) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_reqwest(
            builder.build()?,
            Self::default_headers_for(config),
            config.rate_limit(),
            config.retry().clone(),
        ))
    }

    /// Creates a client around an existing `reqwest::Client` (custom proxies,
    /// connection pool settings, ...).
    #[must_use]
    pub fn with_reqwest(
        client: reqwest::Client,
        default_headers: HeaderSet,
        rate_limit: RateLimit,
        retry: RetryConfig,
    ) -> Self {
        Self {
            client,
            default_headers,
            limiter: RateLimiter::new(rate_limit),
            retry,
        }
    }

    fn default_headers_for(config: &ClientConfig) -> HeaderSet {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let user_agent = format!("{user_agent_prefix}httpshopify v{SDK_VERSION} | Rust");

        HeaderSet::from_pairs([
            ("X-Shopify-Access-Token", config.access_token().as_ref()),
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
            ("User-Agent", user_agent.as_str()),
        ])
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HeaderSet {
        &self.default_headers
    }

    /// Returns the rate limiter shared by every request of this client.
    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Sends a request, pacing and retrying it as described on [`HttpClient`].
    ///
    /// Dropping the returned future cancels the request; a rate-limit token is
    /// only consumed once the request is actually sent.
    ///
    /// Retries do not look at the HTTP method. A POST whose connection failed
    /// before any response arrived may have been applied by Shopify and will
    /// be sent again; use [`HttpRequestBuilder::no_retry`](crate::HttpRequestBuilder::no_retry)
    /// where that is unacceptable.
    ///
    /// # Errors
    ///
    /// Returns the typed [`HttpError`] for a 4xx response, or for the last
    /// attempt once retries are exhausted.
    pub async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.run(request, None).await
    }

    /// Like [`execute`](Self::execute), but returns [`HttpError::Cancelled`]
    /// as soon as `cancel` fires, whether the request is waiting for the rate
    /// limiter, sleeping between retries, or in flight.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); additionally [`HttpError::Cancelled`].
    pub async fn execute_with_cancel(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, HttpError> {
        self.run(request, Some(cancel)).await
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get(&self, url: &str, headers: &HeaderSet) -> Result<HttpResponse, HttpError> {
        self.send(HttpMethod::Get, url, headers, None).await
    }

    /// Sends a POST request with a raw body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn post(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &HeaderSet,
    ) -> Result<HttpResponse, HttpError> {
        self.send(HttpMethod::Post, url, headers, Some(body)).await
    }

    /// Sends a PUT request with a raw body.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn put(
        &self,
        url: &str,
        body: Vec<u8>,
        headers: &HeaderSet,
    ) -> Result<HttpResponse, HttpError> {
        self.send(HttpMethod::Put, url, headers, Some(body)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn delete(&self, url: &str, headers: &HeaderSet) -> Result<HttpResponse, HttpError> {
        self.send(HttpMethod::Delete, url, headers, None).await
    }

    /// Starts walking a paginated listing at `url`.
    #[must_use]
    pub fn paginate(&self, url: impl Into<String>) -> Paginator<'_> {
        Paginator::new(self, url.into())
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &HeaderSet,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, HttpError> {
        let mut builder = HttpRequest::builder(method, url).headers(headers.clone());
        if let Some(body) = body {
            builder = builder.body(body);
        }
        self.execute(&builder.build()?).await
    }

    async fn run(
        &self,
        request: &HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let headers = Self::header_map(&HeaderSet::merge(&self.default_headers, &request.headers))?;

        let mut attempt: u32 = 0;
        loop {
            Self::cancellable(cancel, self.limiter.acquire()).await?;

            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                "sending request"
            );

            let error = match Self::cancellable(cancel, self.send_once(request, &headers)).await? {
                Ok(response) => {
                    if let Some(reason) = response.deprecation_reason() {
                        tracing::warn!(
                            "Deprecated request to Shopify API at {}, received reason: {}",
                            request.url,
                            reason
                        );
                    }

                    match StatusClass::of(response.code) {
                        StatusClass::Success => return Ok(response),
                        StatusClass::Fatal => {
                            return Err(HttpError::from_response(response.into_error()));
                        }
                        StatusClass::Retryable => HttpError::from_response(response.into_error()),
                    }
                }
                Err(e) => HttpError::Network(e),
            };

            if !request.retry || !error.is_retryable() {
                return Err(error);
            }

            if !self.retry.should_retry(attempt) {
                if self.retry.is_enabled() {
                    tracing::warn!(
                        method = %request.method,
                        url = %request.url,
                        attempts = attempt + 1,
                        error = %error,
                        "giving up after exhausting retries"
                    );
                }
                return Err(error);
            }

            let retry_after = error.response().and_then(|r| r.retry_after);
            let delay = self.retry.delay_for(attempt, retry_after);
            tracing::debug!(
                status = ?error.status(),
                ?delay,
                from_retry_after = retry_after.is_some(),
                retry = attempt + 1,
                max_retries = self.retry.max_retries,
                "retrying request"
            );

            Self::cancellable(cancel, tokio::time::sleep(delay)).await?;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        request: &HttpRequest,
        headers: &HeaderMap,
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &request.url)
            .headers(headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let code = response.status().as_u16();
        let headers = ResponseHeaders::from_header_map(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse::new(code, headers, body))
    }

    async fn cancellable<T>(
        cancel: Option<&CancellationToken>,
        future: impl Future<Output = T>,
    ) -> Result<T, HttpError> {
        match cancel {
            None => Ok(future.await),
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(HttpError::Cancelled),
                value = future => Ok(value),
            },
        }
    }

    fn header_map(headers: &HeaderSet) -> Result<HeaderMap, InvalidHttpRequestError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for header in headers {
            let invalid = || InvalidHttpRequestError::InvalidHeader {
                name: header.name.clone(),
            };
            let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(|_| invalid())?;
            let value = HeaderValue::from_str(&header.value).map_err(|_| invalid())?;
            map.entry(name).or_insert(value);
        }
        Ok(map)
    }
}
