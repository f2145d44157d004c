//! Per-shop entry point.
//!
//! A [`Shop`] pairs a [`ClientConfig`] with one shared [`HttpClient`], so
//! every call made through it (and through its clones) draws from the same
//! rate limit and connection pool.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::clients::{HeaderSet, HttpClient, HttpError, HttpResponse, NotFoundError, Paginator};
use crate::config::{AccessToken, BaseUrl, ClientConfig, ShopDomain};
use crate::error::ConfigError;

/// Errors that can occur while constructing a [`Shop`].
#[derive(Debug, Error)]
pub enum ShopError {
    /// The shop name, URL or token was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The underlying HTTP client could not be initialized.
    #[error(transparent)]
    Client(#[from] HttpError),
}

/// A connection to one Shopify store.
///
/// # Example
///
/// ```rust,ignore
/// use httpshopify::Shop;
/// use serde_json::Value;
///
/// let shop = Shop::new("my-store", "shpat_123")?;
/// let orders: Vec<Value> = shop.list_json("orders.json?status=any", "orders").await?;
/// ```
#[derive(Clone, Debug)]
pub struct Shop {
    config: ClientConfig,
    client: Arc<HttpClient>,
}

// Verify Shop is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Shop>();
};

impl Shop {
    /// Connects to `https://{shop_name}.myshopify.com/admin/api/2021-04`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Config`] for an invalid shop name or empty token.
    pub fn new(shop_name: &str, access_token: &str) -> Result<Self, ShopError> {
        let config = ClientConfig::builder()
            .shop(ShopDomain::new(shop_name)?)
            .access_token(AccessToken::new(access_token)?)
            .build()?;
        Self::from_config(config)
    }

    /// Connects to a store behind a custom base URL (for example
    /// `https://my-shop-domain.com/foo/bar`).
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Config`] for an invalid URL or empty token.
    pub fn custom(url: &str, access_token: &str) -> Result<Self, ShopError> {
        let config = ClientConfig::builder()
            .base_url(BaseUrl::new(url)?)
            .access_token(AccessToken::new(access_token)?)
            .build()?;
        Self::from_config(config)
    }

    /// Connects using a fully specified configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Client`] if the HTTP client cannot be initialized.
    pub fn from_config(config: ClientConfig) -> Result<Self, ShopError> {
        let client = HttpClient::from_config(&config)?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the shared HTTP client.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Builds the absolute URL for an endpoint such as `orders.json`.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        self.config.endpoint_url(endpoint)
    }

    /// GETs an endpoint and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or [`HttpError::Decode`] if the body does
    /// not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, HttpError> {
        let response = self
            .client
            .get(&self.endpoint_url(endpoint), &HeaderSet::new())
            .await?;
        Ok(response.json()?)
    }

    /// POSTs `body` as JSON and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.endpoint_url(endpoint), serde_json::to_vec(body)?, &HeaderSet::new())
            .await?;
        Self::decode_or_empty(&response)
    }

    /// PUTs `body` as JSON and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn put_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .put(&self.endpoint_url(endpoint), serde_json::to_vec(body)?, &HeaderSet::new())
            .await?;
        Self::decode_or_empty(&response)
    }

    /// DELETEs an endpoint, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns the transport error.
    pub async fn delete(&self, endpoint: &str) -> Result<(), HttpError> {
        self.client
            .delete(&self.endpoint_url(endpoint), &HeaderSet::new())
            .await?;
        Ok(())
    }

    /// GETs a single entity wrapped in `{root_key: {...}}`.
    ///
    /// Shopify can answer 200 with an empty object for an entity that does
    /// not exist, so a missing root or an `id` that is absent or zero is
    /// reported as [`HttpError::NotFound`] naming `kind` and `id`.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn get_entity<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        root_key: &str,
        kind: &str,
        id: u64,
    ) -> Result<T, HttpError> {
        let mut body: Value = self.get_json(endpoint).await?;

        let entity = match body.get_mut(root_key).map(Value::take) {
            Some(entity) if Self::has_id(&entity) => entity,
            _ => return Err(HttpError::NotFound(NotFoundError::resource(kind, id))),
        };
        Ok(serde_json::from_value(entity)?)
    }

    /// Starts walking a paginated listing.
    #[must_use]
    pub fn paginate(&self, endpoint: &str) -> Paginator<'_> {
        self.client.paginate(self.endpoint_url(endpoint))
    }

    /// Fetches every page of a listing and concatenates each page's
    /// `root_key` array.
    ///
    /// # Errors
    ///
    /// Returns the first transport or decode error.
    pub async fn list_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        root_key: &str,
    ) -> Result<Vec<T>, HttpError> {
        let mut items = Vec::new();
        let mut pages = self.paginate(endpoint);

        while let Some(page) = pages.next_page().await {
            let mut body: Value = page?.json()?;
            if let Some(Value::Array(page_items)) = body.get_mut(root_key).map(Value::take) {
                for item in page_items {
                    items.push(serde_json::from_value(item)?);
                }
            }
        }

        Ok(items)
    }

    fn has_id(entity: &Value) -> bool {
        match entity.get("id") {
            Some(Value::Number(id)) => id.as_u64() != Some(0) && id.as_i64() != Some(0),
            Some(Value::String(id)) => !id.is_empty() && id != "0",
            _ => false,
        }
    }

    // Action endpoints such as `orders/{id}/close.json` may answer with an
    // empty body.
    fn decode_or_empty<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, HttpError> {
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(response.json()?)
    }
}
