//! Marketplace HTTP client.

use std::sync::Arc;
use std::time::Duration;

use giftora_core::{CartSessionId, OrderId, ProductId};
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::MarketplaceError;
use super::auth::{TokenCache, fetch_token};
use super::endpoints::Endpoint;
use super::types::{
    ApiEnvelope, CartSyncRequest, CustomerOrdersRequest, EnquiryRequest, OrderHistory,
    OrderSummary, ProductRequest, TaxRequest, TrackingRequest, check_envelope,
};
use crate::cart::{CartBackend, Product};
use crate::config::MarketplaceConfig;

/// Retries allowed after an unauthorized response.
const MAX_AUTH_RETRIES: u32 = 1;

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// =============================================================================
// MarketplaceClient
// =============================================================================

/// Client for the marketplace API.
///
/// Cheap to clone; clones share the HTTP connection pool, the token cache and
/// the product cache.
#[derive(Clone)]
pub struct MarketplaceClient {
    inner: Arc<MarketplaceClientInner>,
}

struct MarketplaceClientInner {
    client: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: SecretString,
    tokens: TokenCache,
    products: Cache<ProductId, Product>,
}

impl MarketplaceClient {
    /// Create a new marketplace client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MarketplaceConfig) -> Result<Self, MarketplaceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(MarketplaceClientInner {
                client,
                base_url: config.api_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                tokens: TokenCache::new(),
                products,
            }),
        })
    }

    fn url(&self, endpoint: Endpoint) -> Result<Url, MarketplaceError> {
        Ok(self.inner.base_url.join(endpoint.upstream_path())?)
    }

    /// The cached access token, fetching a new one if none is cached.
    async fn access_token(&self) -> Result<SecretString, MarketplaceError> {
        if let Some(token) = self.inner.tokens.current().await {
            return Ok(token);
        }

        let token = fetch_token(
            &self.inner.client,
            self.url(Endpoint::Token)?,
            &self.inner.client_id,
            &self.inner.client_secret,
        )
        .await?;
        self.inner.tokens.store(token.clone()).await;
        debug!("Fetched marketplace access token");

        Ok(token)
    }

    /// POST a JSON body to an endpoint and decode the JSON response.
    ///
    /// An unauthorized response discards the cached token and the request is
    /// sent again with a fresh one, at most [`MAX_AUTH_RETRIES`] times.
    ///
    /// # Errors
    ///
    /// - `MarketplaceError::Unauthorized` if the retry is also rejected
    /// - `MarketplaceError::RateLimited` on HTTP 429
    /// - `MarketplaceError::NotFound` on HTTP 404
    /// - `MarketplaceError::Upstream` on any other non-success status
    /// - `MarketplaceError::Parse` if the body is not the expected JSON
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, MarketplaceError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(endpoint)?;
        let mut auth_retries = 0;

        loop {
            let token = self.access_token().await?;

            let response = self
                .inner
                .client
                .post(url.clone())
                .bearer_auth(token.expose_secret())
                .json(body)
                .send()
                .await?;

            let status = response.status();

            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.inner.tokens.invalidate().await;
                if auth_retries < MAX_AUTH_RETRIES {
                    auth_retries += 1;
                    warn!("Access token rejected, retrying with a fresh token");
                    continue;
                }
                return Err(MarketplaceError::Unauthorized);
            }

            // Check for rate limiting
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                return Err(MarketplaceError::RateLimited(retry_after));
            }

            // Get response body as text first for better error diagnostics
            let response_text = response.text().await?;

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(MarketplaceError::NotFound(truncate(&response_text, 200)));
            }

            if !status.is_success() {
                error!(
                    status = %status,
                    body = %truncate(&response_text, 500),
                    "Marketplace returned non-success status"
                );
                return Err(MarketplaceError::Upstream {
                    status: status.as_u16(),
                    message: truncate(&response_text, 200),
                });
            }

            return serde_json::from_str(&response_text).map_err(|e| {
                error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse marketplace response"
                );
                MarketplaceError::Parse(e)
            });
        }
    }

    /// POST and unwrap the standard `{ status, data }` envelope.
    ///
    /// # Errors
    ///
    /// Everything [`post`](Self::post) returns, plus `MarketplaceError::Api`
    /// when the envelope reports a failure.
    pub async fn post_envelope<B, T>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<Option<T>, MarketplaceError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.post::<B, ApiEnvelope<T>>(endpoint, body)
            .await?
            .into_result()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch a product by id.
    ///
    /// Results are cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::NotFound` if the marketplace returns no
    /// product, or any error from the request.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, MarketplaceError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self
            .post_envelope(Endpoint::ProductDetail, &ProductRequest { product_id: id })
            .await?
            .ok_or_else(|| MarketplaceError::NotFound(format!("product {id}")))?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }

    /// Drop a product from the cache.
    pub async fn invalidate_product(&self, id: ProductId) {
        self.inner.products.invalidate(&id).await;
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch the raw tracking response for an order.
    ///
    /// The response is returned untouched: it may be any of the tracking
    /// payload shapes, including a bare string or an error object.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_tracking(&self, order_id: OrderId) -> Result<Value, MarketplaceError> {
        self.post(Endpoint::OrderTracking, &TrackingRequest { order_id })
            .await
    }

    /// Fetch one page of a customer's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope reports a
    /// failure.
    #[instrument(skip(self))]
    pub async fn customer_orders(
        &self,
        customer_id: i64,
        page: u32,
    ) -> Result<Vec<OrderSummary>, MarketplaceError> {
        let history: Option<OrderHistory> = self
            .post_envelope(
                Endpoint::CustomerOrders,
                &CustomerOrdersRequest { customer_id, page },
            )
            .await?;

        Ok(history.map(OrderHistory::into_orders).unwrap_or_default())
    }

    // =========================================================================
    // Enquiries
    // =========================================================================

    /// Submit an enquiry form.
    ///
    /// Returns the marketplace's confirmation message, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the envelope reports a
    /// failure.
    #[instrument(skip(self, enquiry), fields(product_id = ?enquiry.product_id))]
    pub async fn submit_enquiry(
        &self,
        enquiry: &EnquiryRequest,
    ) -> Result<Option<String>, MarketplaceError> {
        let response: Value = self.post(Endpoint::Enquiry, enquiry).await?;
        check_envelope(&response)?;

        Ok(response
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string))
    }
}

impl CartBackend for MarketplaceClient {
    #[instrument(skip(self, request), fields(cart_id = %request.cart_id, product_id = %request.product_id))]
    async fn sync_cart(&self, request: &CartSyncRequest) -> Result<Value, MarketplaceError> {
        let response: Value = self.post(Endpoint::AddCart, request).await?;
        check_envelope(&response)?;
        Ok(response)
    }

    #[instrument(skip(self), fields(cart_id = %cart_id))]
    async fn calculate_tax(&self, cart_id: &CartSessionId) -> Result<Value, MarketplaceError> {
        let response: Value = self.post(Endpoint::GetTax, &TaxRequest { cart_id }).await?;
        check_envelope(&response)?;
        Ok(response)
    }
}
