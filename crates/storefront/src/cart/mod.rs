//! Cart reconciliation.
//!
//! Turns an add-to-cart click into a priced, stock-checked line in the
//! visitor's local cart mirror, then mirrors it to the marketplace cart and
//! refreshes the tax summary.
//!
//! - [`pricing`]: offer, promotion and variant price precedence
//! - [`stock`]: fail-fast availability checks
//! - [`merge`]: replace vs. increment upsert
//! - [`session`]: stable cart session id
//! - [`reconciler`]: the full add sequence

pub mod merge;
pub mod pricing;
pub mod reconciler;
pub mod session;
pub mod stock;
pub mod types;

pub use merge::{MergeStrategy, upsert_cart_line};
pub use pricing::{PriceResolution, PriceSource, resolve_base_unit_price, resolve_unit_price};
pub use reconciler::{AddToCart, AddToCartOutcome, CartBackend, CartFlow, CartReconciler};
pub use session::{CartIdGenerator, UuidCartIdGenerator, obtain_cart_id};
pub use stock::{available_stock, validate_stock};
pub use types::{CartLineItem, LocalCart, OfferRule, Product, Variant};

use giftora_core::{ProductId, VariantId};
use thiserror::Error;

use crate::marketplace::MarketplaceError;
use crate::storage::StorageError;

/// Errors raised while adding to the cart.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: ProductId },

    #[error("Only {available} in stock, {requested} requested")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Unknown variant {0}")]
    UnknownVariant(VariantId),

    /// Another add is still running.
    #[error("An add to cart is already in progress")]
    Busy,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),
}

impl CartError {
    /// Whether the error is the shopper's to fix, as opposed to a backend
    /// failure.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfStock { .. }
                | Self::InsufficientStock { .. }
                | Self::InvalidQuantity
                | Self::UnknownVariant(_)
                | Self::Busy
        )
    }
}
