//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::cart::{CartIdGenerator, CartReconciler, UuidCartIdGenerator};
use crate::config::StorefrontConfig;
use crate::marketplace::{MarketplaceClient, MarketplaceError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the marketplace client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    marketplace: MarketplaceClient,
    cart_ids: Arc<dyn CartIdGenerator>,
    reconcilers: Cache<String, Arc<CartReconciler<MarketplaceClient>>>,
}

impl AppState {
    /// Create a new application state with random cart ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, MarketplaceError> {
        Self::with_cart_ids(config, Arc::new(UuidCartIdGenerator))
    }

    /// Create a new application state with a custom cart id source.
    ///
    /// # Errors
    ///
    /// Returns an error if the marketplace client cannot be built.
    pub fn with_cart_ids(
        config: StorefrontConfig,
        cart_ids: Arc<dyn CartIdGenerator>,
    ) -> Result<Self, MarketplaceError> {
        let marketplace = MarketplaceClient::new(&config.marketplace)?;

        let reconcilers = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(Duration::from_secs(1800)) // 30 minutes
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                marketplace,
                cart_ids,
                reconcilers,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the marketplace API client.
    #[must_use]
    pub fn marketplace(&self) -> &MarketplaceClient {
        &self.inner.marketplace
    }

    /// The cart reconciler for a visitor, keyed by session id.
    ///
    /// Requests carrying the same session share one reconciler, so a second
    /// add while the first is still running is rejected as busy. A visitor
    /// without a session yet gets a fresh reconciler.
    pub async fn cart_reconciler(
        &self,
        visitor: Option<String>,
    ) -> Arc<CartReconciler<MarketplaceClient>> {
        let build = || {
            Arc::new(CartReconciler::new(
                self.inner.marketplace.clone(),
                Arc::clone(&self.inner.cart_ids),
            ))
        };

        match visitor {
            Some(key) => self.inner.reconcilers.get_with(key, async { build() }).await,
            None => build(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::config::MarketplaceConfig;

    fn state() -> AppState {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            marketplace: MarketplaceConfig {
                api_url: Url::parse("http://127.0.0.1:9/api/").unwrap(),
                client_id: "storefront".to_string(),
                client_secret: SecretString::from("unused"),
                timeout_secs: 1,
            },
            sentry_dsn: None,
            sentry_environment: "test".to_string(),
        };
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_reconciler_shared_per_visitor() {
        let state = state();

        let a = state.cart_reconciler(Some("visitor-a".to_string())).await;
        let again = state.cart_reconciler(Some("visitor-a".to_string())).await;
        let b = state.cart_reconciler(Some("visitor-b".to_string())).await;
        let anonymous = state.cart_reconciler(None).await;

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &anonymous));
    }
}
