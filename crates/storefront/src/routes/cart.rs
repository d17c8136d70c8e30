//! Cart route handlers.
//!
//! The visitor's cart mirror, cart id and tax summary are kept in their
//! session. Adds are priced and stock-checked locally, then mirrored to the
//! marketplace cart.

use axum::{Json, extract::State};
use giftora_core::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{AddToCart, AddToCartOutcome, CartFlow, CartLineItem, LocalCart};
use crate::error::{Result, add_breadcrumb};
use crate::storage::{SessionStore, get_typed, keys};
use crate::state::AppState;

/// Body of `POST /cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Go straight to checkout after adding.
    #[serde(default)]
    pub buy_now: bool,
}

const fn default_quantity() -> u32 {
    1
}

/// Body of `POST /cart/quick-add`.
#[derive(Debug, Deserialize)]
pub struct QuickAddForm {
    pub product_id: ProductId,
}

/// Response of `GET /cart`.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub item_count: u32,
    pub subtotal: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_summary: Option<Value>,
}

/// Show the cart mirror and the last tax summary.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let store = SessionStore::new(session);
    let cart: LocalCart = get_typed(&store, keys::CART).await?.unwrap_or_default();
    let tax_summary = get_typed(&store, keys::TAX_SUMMARY).await?;

    Ok(Json(CartView {
        item_count: cart.item_count(),
        subtotal: cart.subtotal(),
        items: cart.lines().to_vec(),
        tax_summary,
    }))
}

/// Product page add to cart or buy now.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddToCartForm>,
) -> Result<Json<AddToCartOutcome>> {
    let flow = if form.buy_now {
        CartFlow::BuyNow
    } else {
        CartFlow::ProductDetail
    };

    let request = AddToCart {
        variant_id: form.variant_id,
        quantity: form.quantity,
        flow,
    };

    run_add(&state, session, form.product_id, request).await
}

/// Shop grid one-click add.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn quick_add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<QuickAddForm>,
) -> Result<Json<AddToCartOutcome>> {
    let request = AddToCart {
        variant_id: None,
        quantity: 1,
        flow: CartFlow::QuickAdd,
    };

    run_add(&state, session, form.product_id, request).await
}

async fn run_add(
    state: &AppState,
    session: Session,
    product_id: ProductId,
    request: AddToCart,
) -> Result<Json<AddToCartOutcome>> {
    let product = state.marketplace().product(product_id).await?;
    let visitor = session.id().map(|id| id.to_string());
    let store = SessionStore::new(session);

    let outcome = state
        .cart_reconciler(visitor)
        .await
        .add(&store, &product, request)
        .await?;

    let product_key = product_id.to_string();
    let qty = outcome.line.qty.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_key.as_str()), ("qty", qty.as_str())]),
    );

    Ok(Json(outcome))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_add_form_defaults() {
        let form: AddToCartForm = serde_json::from_value(json!({ "product_id": 5 })).unwrap();
        assert_eq!(form.quantity, 1);
        assert!(!form.buy_now);
        assert!(form.variant_id.is_none());
    }
}
