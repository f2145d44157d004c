//! Resilient HTTP transport for the Shopify REST Admin API.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: paces, retries and classifies every request
//! - [`HttpRequest`]: a request to be sent, built with [`HttpRequest::builder`]
//! - [`HttpResponse`]: a response with typed access to Shopify's headers
//! - [`HeaderSet`]: ordered, case-insensitive header collection with merge semantics
//! - [`RateLimiter`]: token bucket that keeps a client under its quota
//! - [`RetryConfig`]: retry budget and exponential backoff with jitter
//! - [`StatusClass`] / [`classify`]: status code categorization
//! - [`PageCursor`] / [`Paginator`]: `Link` header cursor pagination
//! - [`HttpError`]: the error taxonomy
//!
//! # Retry Behavior
//!
//! - **429 and 5xx**: retried after the `Retry-After` header value when
//!   present, otherwise after `base_delay * 2^attempt` (capped at
//!   `max_delay`) plus random jitter
//! - **Transport failures**: retried the same way
//! - **Other 4xx**: returned immediately without retry
//!
//! The default [`RetryConfig`] performs no retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use httpshopify::{AccessToken, ClientConfig, HeaderSet, HttpClient, ShopDomain};
//!
//! let config = ClientConfig::builder()
//!     .shop(ShopDomain::new("my-store").unwrap())
//!     .access_token(AccessToken::new("shpat_123").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = HttpClient::from_config(&config)?;
//! let response = client
//!     .get(&config.endpoint_url("orders/450789469.json"), &HeaderSet::new())
//!     .await?;
//! ```

mod errors;
mod headers;
mod http_client;
mod http_request;
mod http_response;
mod pagination;
mod rate_limit;
mod retry;
mod status;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError, NotFoundError, ValidationError};
pub use headers::{Header, HeaderSet};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{ApiCallLimit, HttpResponse, ResponseHeaders};
pub use pagination::{PageCursor, Paginator};
pub use rate_limit::{RateLimit, RateLimiter};
pub use retry::RetryConfig;
pub use status::{classify, StatusClass};
