//! Product and cart types.

use chrono::{DateTime, Utc};
use giftora_core::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::lenient;

// =============================================================================
// Product Types
// =============================================================================

/// A fixed bundle price for buying exactly `offer_qty` units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRule {
    #[serde(deserialize_with = "lenient::count_or_zero")]
    pub offer_qty: u32,
    #[serde(deserialize_with = "lenient::decimal_or_zero")]
    pub offer_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_label: Option<String>,
}

/// A purchasable variant of a product.
///
/// `price` is added to the product's base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default, deserialize_with = "lenient::decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub variant_quantity: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A product as returned by the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(deserialize_with = "lenient::decimal_or_zero")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::opt_decimal")]
    pub promo_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::opt_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::count_or_zero")]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub variants: Vec<Variant>,
    /// Bulk offers; either a JSON-encoded string or an inline array.
    #[serde(default)]
    pub offers: Option<Value>,
    /// Buy-one-get-one offers, in the same shape as `offers`.
    #[serde(default)]
    pub bogo_offer: Option<Value>,
}

impl Product {
    /// Every offer rule for this product: parsed `offers` followed by
    /// `bogo_offer`.
    ///
    /// A malformed field is logged and treated as "no offers".
    #[must_use]
    pub fn offer_rules(&self) -> Vec<OfferRule> {
        let mut rules = parse_offers(self.id, "offers", self.offers.as_ref());
        rules.extend(parse_offers(self.id, "bogo_offer", self.bogo_offer.as_ref()));
        rules
    }

    /// The variant a purchase applies to: the explicitly selected one, or the
    /// first variant by default. `None` for products without variants.
    ///
    /// Returns `Err` with the requested id if it is not one of this
    /// product's variants.
    pub fn select_variant(&self, requested: Option<VariantId>) -> Result<Option<&Variant>, VariantId> {
        match requested {
            Some(id) => self
                .variants
                .iter()
                .find(|v| v.id == id)
                .map(Some)
                .ok_or(id),
            None => Ok(self.variants.first()),
        }
    }
}

/// Parse an offer field, degrading to an empty list on any failure.
fn parse_offers(product_id: ProductId, field: &str, raw: Option<&Value>) -> Vec<OfferRule> {
    let parsed = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::String(s)) if s.trim().is_empty() => return Vec::new(),
        Some(Value::String(s)) => serde_json::from_str::<Vec<OfferRule>>(s),
        Some(other) => serde_json::from_value::<Vec<OfferRule>>(other.clone()),
    };

    parsed.unwrap_or_else(|e| {
        warn!(product_id = %product_id, field, error = %e, "Ignoring malformed offers");
        Vec::new()
    })
}

// =============================================================================
// Cart Types
// =============================================================================

/// One line of the local cart mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub qty: u32,
    /// Effective per-unit price.
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_offer: bool,
    /// Fixed bundle total when the line was priced by an offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_total: Option<Decimal>,
}

impl CartLineItem {
    /// Total for the line: the bundle total for offers, `qty * price`
    /// otherwise.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.offer_total
            .filter(|_| self.is_offer)
            .unwrap_or_else(|| self.price * Decimal::from(self.qty))
    }
}

/// The local cart mirror: at most one line per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalCart {
    lines: Vec<CartLineItem>,
}

impl LocalCart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Find the line for a product.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub(crate) fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    pub(crate) fn push(&mut self, line: CartLineItem) {
        self.lines.push(line);
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.qty).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
