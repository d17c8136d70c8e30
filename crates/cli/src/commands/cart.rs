//! Cart quote command.
//!
//! Runs the same pricing and stock rules as the storefront's add to cart,
//! without touching a session or the marketplace.

use std::path::Path;

use chrono::Utc;
use giftora_core::{ProductId, VariantId};
use giftora_storefront::cart::{
    CartError, PriceResolution, Product, available_stock, resolve_unit_price, validate_stock,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{CommandError, print_json, read_json};

/// A priced quantity of one product.
#[derive(Debug, Serialize)]
pub struct Quote {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub qty: u32,
    pub available: u32,
    pub pricing: PriceResolution,
    pub total: Decimal,
}

/// Build a quote for `qty` units of `product`.
pub fn build_quote(
    product: &Product,
    qty: u32,
    variant: Option<i64>,
) -> Result<Quote, CommandError> {
    let variant = product
        .select_variant(variant.map(VariantId::new))
        .map_err(CartError::UnknownVariant)?;

    validate_stock(product, variant, qty)?;
    let pricing = resolve_unit_price(product, variant, qty, Utc::now());

    Ok(Quote {
        product_id: product.id,
        variant_id: variant.map(|v| v.id),
        qty,
        available: available_stock(product, variant),
        total: pricing.offer_total().unwrap_or(pricing.unit_price * Decimal::from(qty)),
        pricing,
    })
}

/// Print a quote for a saved product.
pub fn quote(path: &Path, qty: u32, variant: Option<i64>) -> Result<(), CommandError> {
    let product: Product = serde_json::from_value(read_json(path)?)?;
    print_json(&build_quote(&product, qty, variant)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": 3,
            "name": "Diya set",
            "price": 200,
            "quantity": 50,
            "variants": [
                { "id": 7, "price": 20, "variant_quantity": 5 },
                { "id": 8, "price": 0, "variant_quantity": 0 }
            ],
            "offers": [{ "offer_qty": 3, "offer_price": 500 }]
        }))
        .unwrap()
    }

    #[test]
    fn test_offer_quote_uses_bundle_total() {
        let quote = build_quote(&product(), 3, None).unwrap();
        assert_eq!(quote.total, Decimal::from(500));
        assert_eq!(quote.variant_id, Some(VariantId::new(7)));
        assert_eq!(quote.available, 5);
    }

    #[test]
    fn test_base_quote_multiplies_unit_price() {
        let quote = build_quote(&product(), 2, Some(7)).unwrap();
        assert_eq!(quote.total, Decimal::from(440));
    }

    #[test]
    fn test_out_of_stock_variant() {
        let err = build_quote(&product(), 1, Some(8)).unwrap_err();
        assert!(matches!(err, CommandError::Cart(CartError::OutOfStock { .. })));
    }

    #[test]
    fn test_unknown_variant() {
        let err = build_quote(&product(), 1, Some(99)).unwrap_err();
        assert!(matches!(err, CommandError::Cart(CartError::UnknownVariant(_))));
    }
}
