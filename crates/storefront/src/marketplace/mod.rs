//! Marketplace API client.
//!
//! # Architecture
//!
//! - The marketplace backend is the source of truth for products, carts,
//!   taxes, orders and shipment tracking. There is no local sync.
//! - Every request is a JSON `POST` carrying a bearer token obtained with the
//!   storefront's client credentials.
//! - An unauthorized response discards the cached token and retries the same
//!   request exactly once. A second rejection is surfaced to the caller.
//! - Product details are cached in memory via `moka` (5 minute TTL).
//!
//! # Example
//!
//! ```rust,ignore
//! use giftora_storefront::marketplace::MarketplaceClient;
//!
//! let client = MarketplaceClient::new(&config.marketplace)?;
//! let product = client.product(ProductId::new(42)).await?;
//! let tracking = client.order_tracking(OrderId::new(1001)).await?;
//! ```

mod auth;
mod client;
pub mod endpoints;
pub mod types;

pub use auth::TokenCache;
pub use client::MarketplaceClient;
pub use endpoints::Endpoint;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request was still rejected after refreshing the token.
    #[error("Marketplace rejected the access token")]
    Unauthorized,

    /// No access token could be obtained.
    #[error("Could not obtain access token: {0}")]
    TokenUnavailable(String),

    /// Rate limited by the marketplace.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success HTTP status.
    #[error("Upstream returned HTTP {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        message: String,
    },

    /// The response envelope reported a failure.
    #[error("Marketplace error: {0}")]
    Api(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}
