//! Configuration types for the Shopify transport.
//!
//! # Overview
//!
//! - [`ClientConfig`]: everything needed to construct one [`HttpClient`](crate::HttpClient)
//! - [`ClientConfigBuilder`]: validating builder for [`ClientConfig`]
//! - [`AccessToken`]: the Admin API credential, masked in debug output
//! - [`ShopDomain`]: a validated `*.myshopify.com` domain
//! - [`BaseUrl`]: a custom base URL (proxy, custom domain, test server)
//! - [`ApiVersion`]: the Admin API version segment
//!
//! The quota tier ([`RateLimit`]) and retry policy ([`RetryConfig`]) are plain
//! values carried by the config, so clients with different tiers can coexist
//! in one process.
//!
//! # Example
//!
//! ```rust
//! use httpshopify::{AccessToken, ClientConfig, RateLimit, RetryConfig, ShopDomain};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .shop(ShopDomain::new("my-store").unwrap())
//!     .access_token(AccessToken::new("shpat_123").unwrap())
//!     .rate_limit(RateLimit::plus())
//!     .retry(RetryConfig::exponential(3, Duration::from_millis(500), Duration::from_secs(10)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.endpoint_url("orders.json"),
//!     "https://my-store.myshopify.com/admin/api/2021-04/orders.json"
//! );
//! ```

mod newtypes;
mod version;

use std::time::Duration;

pub use newtypes::{AccessToken, BaseUrl, ShopDomain};
pub use version::ApiVersion;

use crate::clients::{RateLimit, RetryConfig};
use crate::error::ConfigError;

/// Configuration for a single shop connection.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    shop: Option<ShopDomain>,
    access_token: AccessToken,
    api_version: ApiVersion,
    rate_limit: RateLimit,
    retry: RetryConfig,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the base URL every endpoint is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the shop domain, if the config was built from one.
    #[must_use]
    pub const fn shop(&self) -> Option<&ShopDomain> {
        self.shop.as_ref()
    }

    /// Returns the access token.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the quota the client's rate limiter enforces.
    #[must_use]
    pub const fn rate_limit(&self) -> RateLimit {
        self.rate_limit
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the per-attempt transport timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the absolute URL for an endpoint relative to the base URL.
    ///
    /// Leading slashes on `endpoint` are ignored.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Required: an access token and one of `shop` or `base_url`. When both are
/// set, `base_url` is used for requests and `shop` is kept for reference.
///
/// # Defaults
///
/// - `api_version`: `2021-04`
/// - `rate_limit`: [`RateLimit::standard`]
/// - `retry`: [`RetryConfig::none`]
/// - `user_agent_prefix`: `None`
/// - `timeout`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    shop: Option<ShopDomain>,
    base_url: Option<BaseUrl>,
    access_token: Option<AccessToken>,
    api_version: Option<ApiVersion>,
    rate_limit: Option<RateLimit>,
    retry: Option<RetryConfig>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shop whose `myshopify.com` Admin API is targeted.
    #[must_use]
    pub fn shop(mut self, shop: ShopDomain) -> Self {
        self.shop = Some(shop);
        self
    }

    /// Sets a custom base URL, overriding the shop-derived one.
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the access token (required).
    #[must_use]
    pub fn access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Sets the API version used to build the shop-derived base URL.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the quota tier.
    #[must_use]
    pub const fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets a timeout applied to each individual attempt.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequiredField`] if the access token, or both
    ///   `shop` and `base_url`, are missing
    /// - [`ConfigError::InvalidRateLimit`] / [`ConfigError::InvalidRetryConfig`]
    ///   if the quota or retry values are unusable
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let access_token = self.access_token.ok_or(ConfigError::MissingRequiredField {
            field: "access_token",
        })?;
        let api_version = self.api_version.unwrap_or_default();

        let base_url = match (&self.base_url, &self.shop) {
            (Some(url), _) => url.as_ref().to_string(),
            (None, Some(shop)) => shop.admin_api_url(&api_version),
            (None, None) => {
                return Err(ConfigError::MissingRequiredField { field: "shop" });
            }
        };

        let rate_limit = self.rate_limit.unwrap_or_else(RateLimit::standard);
        rate_limit.validate()?;

        let retry = self.retry.unwrap_or_default();
        retry.validate()?;

        Ok(ClientConfig {
            base_url,
            shop: self.shop,
            access_token,
            api_version,
            rate_limit,
            retry,
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
        })
    }
}
