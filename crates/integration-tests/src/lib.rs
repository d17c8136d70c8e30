//! Integration tests for Giftora.
//!
//! Every test runs the storefront in-process against a `wiremock`
//! marketplace, so no external services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p giftora-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart API over HTTP with a session cookie
//! - `storefront_tracking` - Tracking timelines over HTTP
//! - `reconciler` - Cart reconciler against the marketplace client

use std::sync::Arc;

use giftora_core::CartSessionId;
use giftora_storefront::cart::CartIdGenerator;
use giftora_storefront::config::{MarketplaceConfig, StorefrontConfig};
use giftora_storefront::marketplace::MarketplaceClient;
use giftora_storefront::routes;
use giftora_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Cart id handed out to every new cart in tests.
pub const TEST_CART_ID: &str = "cart-test-0001";

/// Always returns [`TEST_CART_ID`].
#[derive(Debug, Default)]
pub struct FixedCartIds;

impl CartIdGenerator for FixedCartIds {
    fn generate(&self) -> CartSessionId {
        CartSessionId::new(TEST_CART_ID)
    }
}

/// Marketplace settings pointing at a mock server.
#[must_use]
pub fn marketplace_config(server: &MockServer) -> MarketplaceConfig {
    MarketplaceConfig {
        api_url: Url::parse(&format!("{}/", server.uri())).unwrap_or_else(|e| panic!("{e}")),
        client_id: "storefront".to_string(),
        client_secret: SecretString::from("it-Secret-42x"),
        timeout_secs: 5,
    }
}

/// A marketplace client talking to a mock server.
#[must_use]
pub fn marketplace_client(server: &MockServer) -> MarketplaceClient {
    MarketplaceClient::new(&marketplace_config(server)).unwrap_or_else(|e| panic!("{e}"))
}

/// Serve any token request with `token`.
pub async fn mount_token(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/generateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(server)
        .await;
}

/// Serve `product` from the product detail endpoint.
pub async fn mount_product(server: &MockServer, product: Value) {
    Mock::given(method("POST"))
        .and(path("/productDetails"))
        .and(wiremock::matchers::body_partial_json(json!({ "product_id": product["id"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": true, "data": product })),
        )
        .mount(server)
        .await;
}

/// A storefront running on an ephemeral local port.
pub struct TestStorefront {
    /// Base URL without trailing slash.
    pub url: String,
    /// HTTP client that keeps the session cookie.
    pub client: reqwest::Client,
}

impl TestStorefront {
    /// Start a storefront backed by the mock marketplace.
    pub async fn start(marketplace: &MockServer) -> Self {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap_or_else(|e| panic!("{e}")),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            marketplace: marketplace_config(marketplace),
            sentry_dsn: None,
            sentry_environment: "test".to_string(),
        };

        let state = AppState::with_cart_ids(config, Arc::new(FixedCartIds))
            .unwrap_or_else(|e| panic!("{e}"));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("{e}"));
        let addr = listener.local_addr().unwrap_or_else(|e| panic!("{e}"));

        tokio::spawn(async move {
            let _ = axum::serve(listener, routes::app(state)).await;
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| panic!("{e}"));

        Self {
            url: format!("http://{addr}"),
            client,
        }
    }

    /// POST a JSON body to `path`.
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.url))
            .json(body)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {path}: {e}"))
    }

    /// GET `path`.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.url))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {path}: {e}"))
    }
}
