//! Stock validation.
//!
//! Runs before any persisted or remote state is touched.

use super::CartError;
use super::types::{Product, Variant};

/// Units available for purchase.
///
/// Products with variants are stocked per variant; otherwise the product's
/// own quantity applies.
#[must_use]
pub fn available_stock(product: &Product, variant: Option<&Variant>) -> u32 {
    match variant {
        Some(variant) => variant.variant_quantity,
        None if product.variants.is_empty() => product.quantity,
        // A product with variants but none selected: use the default variant
        None => product
            .variants
            .first()
            .map_or(0, |v| v.variant_quantity),
    }
}

/// Check that `requested` units can be bought.
///
/// # Errors
///
/// - `CartError::OutOfStock` when nothing is available, whatever the request
/// - `CartError::InvalidQuantity` when `requested` is zero
/// - `CartError::InsufficientStock` when `requested` exceeds availability
pub fn validate_stock(
    product: &Product,
    variant: Option<&Variant>,
    requested: u32,
) -> Result<(), CartError> {
    let available = available_stock(product, variant);

    if available == 0 {
        return Err(CartError::OutOfStock {
            product_id: product.id,
        });
    }

    if requested == 0 {
        return Err(CartError::InvalidQuantity);
    }

    if requested > available {
        return Err(CartError::InsufficientStock {
            requested,
            available,
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_product_uses_own_quantity() {
        let p = product(json!({ "id": 1, "name": "Card", "price": 50, "quantity": 4 }));
        assert_eq!(available_stock(&p, None), 4);
        assert!(validate_stock(&p, None, 4).is_ok());
        assert!(matches!(
            validate_stock(&p, None, 5),
            Err(CartError::InsufficientStock {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn test_variant_stock_overrides_product_quantity() {
        let p = product(json!({
            "id": 1, "name": "Mug", "price": 100, "quantity": 50,
            "variants": [{ "id": 10, "price": 0, "variant_quantity": 2 }, { "id": 11, "price": 0, "variant_quantity": 9 }]
        }));

        assert_eq!(available_stock(&p, p.variants.get(1)), 9);
        // No explicit selection: first variant's stock
        assert_eq!(available_stock(&p, None), 2);
        assert!(validate_stock(&p, p.variants.first(), 3).is_err());
    }

    #[test]
    fn test_zero_stock_always_blocks() {
        let p = product(json!({ "id": 9, "name": "Sold out", "price": 50, "quantity": 0 }));
        for requested in [0, 1, 10] {
            assert!(matches!(
                validate_stock(&p, None, requested),
                Err(CartError::OutOfStock { .. })
            ));
        }
    }

    #[test]
    fn test_missing_quantity_is_out_of_stock() {
        let p = product(json!({ "id": 9, "name": "Unknown stock", "price": 50 }));
        assert!(matches!(
            validate_stock(&p, None, 1),
            Err(CartError::OutOfStock { .. })
        ));
    }

    #[test]
    fn test_zero_request_is_invalid() {
        let p = product(json!({ "id": 1, "name": "Card", "price": 50, "quantity": 4 }));
        assert!(matches!(
            validate_stock(&p, None, 0),
            Err(CartError::InvalidQuantity)
        ));
    }
}
