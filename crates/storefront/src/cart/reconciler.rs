//! Add-to-cart orchestration.
//!
//! One call to [`CartReconciler::add`] performs, in order:
//!
//! 1. variant selection and stock validation (no side effects on failure)
//! 2. price resolution and the local cart upsert, persisted under `cart`
//! 3. cart session id get-or-create
//! 4. cart sync with the marketplace
//! 5. tax calculation, stored verbatim under `tax_summary`
//!
//! Steps 2 to 5 are sequential and not transactional: a sync failure leaves
//! the local mirror updated. Tax failures are logged and swallowed.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use giftora_core::{CartSessionId, VariantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::CartError;
use super::merge::{MergeStrategy, upsert_cart_line};
use super::pricing::{PriceResolution, resolve_base_unit_price, resolve_unit_price};
use super::session::{CartIdGenerator, obtain_cart_id};
use super::stock::validate_stock;
use super::types::{CartLineItem, LocalCart, Product};
use crate::marketplace::{CartSyncRequest, MarketplaceError};
use crate::storage::{KeyValueStore, get_typed, keys, set_typed};

// =============================================================================
// Backend Seam
// =============================================================================

/// Remote cart operations.
pub trait CartBackend: Send + Sync {
    /// Mirror one cart line to the marketplace cart.
    fn sync_cart(
        &self,
        request: &CartSyncRequest,
    ) -> impl Future<Output = Result<Value, MarketplaceError>> + Send;

    /// Compute taxes for the whole cart. The response is opaque.
    fn calculate_tax(
        &self,
        cart_id: &CartSessionId,
    ) -> impl Future<Output = Result<Value, MarketplaceError>> + Send;
}

// =============================================================================
// Requests and Outcomes
// =============================================================================

/// Which UI flow triggered the add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartFlow {
    /// Product page: choose a quantity, then add.
    #[default]
    ProductDetail,
    /// Product page: add, then go straight to checkout.
    BuyNow,
    /// Shop grid: one click adds one unit.
    QuickAdd,
}

impl CartFlow {
    /// How this flow merges into an existing line.
    #[must_use]
    pub const fn merge_strategy(self) -> MergeStrategy {
        match self {
            Self::ProductDetail | Self::BuyNow => MergeStrategy::Replace,
            Self::QuickAdd => MergeStrategy::IncrementBy(1),
        }
    }

    /// Whether the shopper continues to checkout after the add.
    #[must_use]
    pub const fn goes_to_checkout(self) -> bool {
        matches!(self, Self::BuyNow)
    }
}

/// A single add-to-cart action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddToCart {
    pub variant_id: Option<VariantId>,
    /// Requested quantity. Ignored by quick add, which always adds one.
    pub quantity: u32,
    pub flow: CartFlow,
}

/// Result of a successful add.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCartOutcome {
    pub cart_id: CartSessionId,
    /// The line as stored after the merge.
    pub line: CartLineItem,
    pub cart: LocalCart,
    pub pricing: PriceResolution,
    /// Tax response, absent when the calculation failed.
    pub tax: Option<Value>,
    pub checkout: bool,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Resets the in-flight flag when the add finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs add-to-cart actions against a [`CartBackend`].
///
/// Overlapping calls on the same reconciler are rejected with
/// [`CartError::Busy`]. The flag is not a lock: separate reconcilers sharing
/// a store can still interleave, last write wins.
pub struct CartReconciler<B> {
    backend: B,
    ids: Arc<dyn CartIdGenerator>,
    in_flight: AtomicBool,
}

impl<B: CartBackend> CartReconciler<B> {
    #[must_use]
    pub fn new(backend: B, ids: Arc<dyn CartIdGenerator>) -> Self {
        Self {
            backend,
            ids,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether an add is currently running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Add `product` to the visitor's cart.
    ///
    /// # Errors
    ///
    /// - `CartError::Busy` if another add is running on this reconciler
    /// - `CartError::UnknownVariant`, `OutOfStock`, `InsufficientStock` or
    ///   `InvalidQuantity` before anything is written
    /// - `CartError::Storage` if the store fails
    /// - `CartError::Marketplace` if the cart sync fails
    pub async fn add<S: KeyValueStore>(
        &self,
        store: &S,
        product: &Product,
        request: AddToCart,
    ) -> Result<AddToCartOutcome, CartError> {
        self.add_at(store, product, request, Utc::now()).await
    }

    /// [`add`](Self::add) with an explicit clock for promotion checks.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    #[instrument(
        skip(self, store, product),
        fields(product_id = %product.id, flow = ?request.flow, qty = request.quantity)
    )]
    pub async fn add_at<S: KeyValueStore>(
        &self,
        store: &S,
        product: &Product,
        request: AddToCart,
        now: DateTime<Utc>,
    ) -> Result<AddToCartOutcome, CartError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CartError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        let variant = product
            .select_variant(request.variant_id)
            .map_err(CartError::UnknownVariant)?;

        let mut cart: LocalCart = get_typed(store, keys::CART).await?.unwrap_or_default();
        let strategy = request.flow.merge_strategy();

        // Quick add prices a single unit and checks stock for the total after
        // the increment.
        let (priced_qty, stock_qty) = match strategy {
            MergeStrategy::Replace => (request.quantity, request.quantity),
            MergeStrategy::IncrementBy(n) => {
                let existing = cart.line(product.id).map_or(0, |l| l.qty);
                (n, existing.saturating_add(n))
            }
        };

        validate_stock(product, variant, stock_qty)?;

        // Offers are matched only on an explicit product-detail quantity.
        let pricing = match strategy {
            MergeStrategy::Replace => resolve_unit_price(product, variant, priced_qty, now),
            MergeStrategy::IncrementBy(_) => resolve_base_unit_price(product, variant, now),
        };

        let candidate = CartLineItem {
            id: product.id,
            name: product.name.clone(),
            qty: priced_qty,
            price: pricing.unit_price,
            image: variant
                .and_then(|v| v.image.clone())
                .or_else(|| product.image.clone()),
            variant_id: variant.map(|v| v.id),
            color: variant.and_then(|v| v.color.clone()),
            is_offer: pricing.is_offer(),
            offer_total: pricing.offer_total(),
        };

        let line = upsert_cart_line(&mut cart, candidate, strategy);
        set_typed(store, keys::CART, &cart).await?;

        let cart_id = obtain_cart_id(store, self.ids.as_ref()).await?;

        let sync = CartSyncRequest {
            cart_id: cart_id.clone(),
            product_id: line.id,
            variant_id: line.variant_id,
            quantity: line.qty,
            is_offer: line.is_offer,
            offer_qty: line.is_offer.then_some(line.qty),
            offer_price: line.offer_total.filter(|_| line.is_offer),
        };
        self.backend.sync_cart(&sync).await?;

        let tax = match self.backend.calculate_tax(&cart_id).await {
            Ok(tax) => {
                if let Err(e) = set_typed(store, keys::TAX_SUMMARY, &tax).await {
                    warn!(cart_id = %cart_id, error = %e, "Failed to store tax summary");
                }
                Some(tax)
            }
            Err(e) => {
                warn!(cart_id = %cart_id, error = %e, "Tax calculation failed");
                None
            }
        };

        info!(
            cart_id = %cart_id,
            qty = line.qty,
            unit_price = %line.price,
            offer = line.is_offer,
            "Cart updated"
        );

        Ok(AddToCartOutcome {
            cart_id,
            line,
            cart,
            pricing,
            tax,
            checkout: request.flow.goes_to_checkout(),
        })
    }
}
