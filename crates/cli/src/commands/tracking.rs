//! Tracking timeline commands.
//!
//! # Environment Variables
//!
//! `fetch` needs `MARKETPLACE_API_URL`, `MARKETPLACE_CLIENT_ID` and
//! `MARKETPLACE_CLIENT_SECRET`.

use std::path::Path;

use giftora_core::OrderId;
use giftora_storefront::config::MarketplaceConfig;
use giftora_storefront::marketplace::MarketplaceClient;
use giftora_storefront::tracking::normalize_value;

use super::{CommandError, print_json, read_json};

/// Normalize a saved tracking response and print the view.
pub fn normalize(path: &Path) -> Result<(), CommandError> {
    let raw = read_json(path)?;
    print_json(&normalize_value(raw))
}

/// Fetch tracking for `order_id` and print the normalized view.
pub async fn fetch(order_id: i64) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let config = MarketplaceConfig::from_env()?;
    let client = MarketplaceClient::new(&config)?;

    tracing::info!(order_id, "Fetching tracking");
    let raw = client.order_tracking(OrderId::new(order_id)).await?;

    print_json(&normalize_value(raw))
}
