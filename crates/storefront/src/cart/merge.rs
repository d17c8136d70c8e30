//! Local cart upsert.
//!
//! Product-detail adds overwrite the existing line; seller-shop quick adds
//! increment it. Both go through [`upsert_cart_line`] so the two flows cannot
//! drift apart.

use super::types::{CartLineItem, LocalCart};

/// How a new line merges into an existing line for the same product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Overwrite quantity and price with the new values.
    Replace,
    /// Add `n` units to the existing quantity, keeping the existing price.
    IncrementBy(u32),
}

/// Insert or update the line for `line.id`.
///
/// Offer lines always replace the existing line wholesale: a bundle price is
/// not compatible with a previously accumulated quantity.
///
/// With `IncrementBy`, a product not yet in the cart is inserted with the
/// increment as its quantity. The existing price is not re-evaluated, so an
/// offer threshold crossed by repeated increments does not reprice the line.
/// Incrementing an offer line breaks the bundle: the line drops its offer
/// state and takes the new line's non-offer unit price.
pub fn upsert_cart_line(
    cart: &mut LocalCart,
    line: CartLineItem,
    strategy: MergeStrategy,
) -> CartLineItem {
    let Some(existing) = cart.line_mut(line.id) else {
        let line = match strategy {
            MergeStrategy::IncrementBy(n) if !line.is_offer => CartLineItem { qty: n, ..line },
            _ => line,
        };
        cart.push(line.clone());
        return line;
    };

    if line.is_offer {
        *existing = line;
        return existing.clone();
    }

    match strategy {
        MergeStrategy::Replace => {
            existing.qty = line.qty;
            existing.price = line.price;
            existing.variant_id = line.variant_id;
            existing.color = line.color;
            existing.is_offer = false;
            existing.offer_total = None;
        }
        MergeStrategy::IncrementBy(n) => {
            if existing.is_offer {
                existing.price = line.price;
                existing.is_offer = false;
                existing.offer_total = None;
            }
            existing.qty = existing.qty.saturating_add(n);
        }
    }

    existing.clone()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use giftora_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;

    fn line(id: i64, qty: u32, price: i64) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            qty,
            price: Decimal::from(price),
            image: None,
            variant_id: None,
            color: None,
            is_offer: false,
            offer_total: None,
        }
    }

    fn cart_with(lines: Vec<CartLineItem>) -> LocalCart {
        let mut cart = LocalCart::new();
        for l in lines {
            cart.push(l);
        }
        cart
    }

    #[test]
    fn test_replace_overwrites_quantity() {
        let mut cart = cart_with(vec![line(5, 2, 100)]);

        let result = upsert_cart_line(&mut cart, line(5, 3, 100), MergeStrategy::Replace);

        assert_eq!(result.qty, 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line(ProductId::new(5)).unwrap().qty, 3);
    }

    #[test]
    fn test_increment_adds_one() {
        let mut cart = cart_with(vec![line(5, 2, 100)]);

        let result = upsert_cart_line(&mut cart, line(5, 1, 100), MergeStrategy::IncrementBy(1));

        assert_eq!(result.qty, 3);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_increment_keeps_existing_price() {
        let mut cart = cart_with(vec![line(5, 2, 100)]);

        upsert_cart_line(&mut cart, line(5, 1, 90), MergeStrategy::IncrementBy(1));

        assert_eq!(cart.line(ProductId::new(5)).unwrap().price, Decimal::from(100));
    }

    #[test]
    fn test_replace_updates_price_and_clears_offer() {
        let mut offer_line = line(5, 3, 0);
        offer_line.price = Decimal::from(250) / Decimal::from(3);
        offer_line.is_offer = true;
        offer_line.offer_total = Some(Decimal::from(250));
        let mut cart = cart_with(vec![offer_line]);

        upsert_cart_line(&mut cart, line(5, 2, 100), MergeStrategy::Replace);

        let updated = cart.line(ProductId::new(5)).unwrap();
        assert_eq!(updated.qty, 2);
        assert_eq!(updated.price, Decimal::from(100));
        assert!(!updated.is_offer);
        assert!(updated.offer_total.is_none());
    }

    #[test]
    fn test_offer_line_replaces_wholesale_even_when_incrementing() {
        let mut cart = cart_with(vec![line(5, 2, 100)]);
        let mut offer_line = line(5, 3, 0);
        offer_line.name = "Candle (3 pack)".to_string();
        offer_line.is_offer = true;
        offer_line.offer_total = Some(Decimal::from(250));

        upsert_cart_line(&mut cart, offer_line.clone(), MergeStrategy::IncrementBy(1));

        assert_eq!(cart.line(ProductId::new(5)).unwrap(), &offer_line);
    }

    #[test]
    fn test_increment_on_offer_line_drops_offer_state() {
        let mut offer_line = line(5, 3, 0);
        offer_line.price = Decimal::from(250) / Decimal::from(3);
        offer_line.is_offer = true;
        offer_line.offer_total = Some(Decimal::from(250));
        let mut cart = cart_with(vec![offer_line]);

        let result = upsert_cart_line(&mut cart, line(5, 1, 100), MergeStrategy::IncrementBy(1));

        assert_eq!(result.qty, 4);
        assert_eq!(result.price, Decimal::from(100));
        assert!(!result.is_offer);
        assert!(result.offer_total.is_none());
        assert_eq!(cart.line(ProductId::new(5)).unwrap(), &result);
    }

    #[test]
    fn test_new_product_is_appended() {
        let mut cart = cart_with(vec![line(1, 1, 10)]);

        upsert_cart_line(&mut cart, line(2, 4, 20), MergeStrategy::Replace);
        upsert_cart_line(&mut cart, line(3, 7, 30), MergeStrategy::IncrementBy(1));

        let ids: Vec<i64> = cart.lines().iter().map(|l| l.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(cart.line(ProductId::new(2)).unwrap().qty, 4);
        // Increment on a fresh line starts at the increment
        assert_eq!(cart.line(ProductId::new(3)).unwrap().qty, 1);
    }

    #[test]
    fn test_at_most_one_line_per_product() {
        let mut cart = LocalCart::new();
        for qty in 1..=4 {
            upsert_cart_line(&mut cart, line(8, qty, 10), MergeStrategy::Replace);
            upsert_cart_line(&mut cart, line(8, 1, 10), MergeStrategy::IncrementBy(1));
        }
        assert_eq!(cart.lines().len(), 1);
    }
}
