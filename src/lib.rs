//! # httpshopify
//!
//! A resilient HTTP transport for the Shopify Admin REST API.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for the access token, shop domain and base URL
//! - A token-bucket [`RateLimiter`] that keeps each client under its quota
//! - Automatic retries of 429, 5xx and transport failures with exponential
//!   backoff, jitter and `Retry-After` support ([`RetryConfig`])
//! - A typed error taxonomy ([`HttpError`]) including 422 field errors
//! - `Link` header cursor pagination ([`PageCursor`], [`Paginator`])
//! - A per-shop entry point with JSON helpers ([`Shop`])
//!
//! ## Quick Start
//!
//! ```rust
//! use httpshopify::{AccessToken, ClientConfig, RateLimit, RetryConfig, ShopDomain};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .shop(ShopDomain::new("my-store").unwrap())
//!     .access_token(AccessToken::new("shpat_123").unwrap())
//!     .rate_limit(RateLimit::standard())
//!     .retry(RetryConfig::exponential(3, Duration::from_millis(500), Duration::from_secs(8)))
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use httpshopify::{Shop, HttpError};
//! use serde_json::Value;
//!
//! let shop = Shop::new("my-store", "shpat_123")?;
//!
//! // Single entity, with a not-found check on the decoded body
//! let order: Value = shop
//!     .get_entity("orders/450789469.json", "order", "order", 450789469)
//!     .await?;
//!
//! // Every page of a listing
//! let products: Vec<Value> = shop.list_json("products.json?limit=250", "products").await?;
//!
//! // Lower level: the transport itself
//! let response = shop.client().get(&shop.endpoint_url("shop.json"), &Default::default()).await?;
//! if let Some(limit) = response.api_call_limit() {
//!     println!("{} calls left", limit.remaining());
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: quota and retry policy are per client, so clients on
//!   different plans coexist in one process
//! - **Fail-fast validation**: all newtypes and configs validate on construction
//! - **Thread-safe**: all types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod clients;
pub mod config;
pub mod error;
pub mod shop;

// Re-export public types at crate root for convenience
pub use config::{AccessToken, ApiVersion, BaseUrl, ClientConfig, ClientConfigBuilder, ShopDomain};
pub use error::ConfigError;
pub use shop::{Shop, ShopError};

// Re-export transport types
pub use clients::{
    classify, ApiCallLimit, Header, HeaderSet, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpRequestBuilder, HttpResponse, HttpResponseError, InvalidHttpRequestError, NotFoundError,
    PageCursor, Paginator, RateLimit, RateLimiter, ResponseHeaders, RetryConfig, StatusClass,
    ValidationError, SDK_VERSION,
};
