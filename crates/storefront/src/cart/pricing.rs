//! Effective unit price resolution.
//!
//! Precedence, first applicable rule wins:
//!
//! 1. An offer whose `offer_qty` equals the requested quantity prices each
//!    unit at `offer_price / offer_qty`, ignoring promotions and variants.
//! 2. A valid promotion prices each unit at `promo_price + variant_price`.
//! 3. Otherwise each unit costs `price + variant_price`.
//!
//! A promotion is valid only when `promo_price > 0`, `end_date` is set and
//! strictly in the future, and `promo_price < price`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{OfferRule, Product, Variant};

/// Which rule produced the unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceSource {
    Offer {
        offer_qty: u32,
        offer_price: Decimal,
        #[serde(skip_serializing_if = "Option::is_none")]
        offer_label: Option<String>,
    },
    Promotion,
    Base,
}

/// Result of [`resolve_unit_price`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceResolution {
    pub unit_price: Decimal,
    pub source: PriceSource,
}

impl PriceResolution {
    /// Whether the line is an offer bundle.
    #[must_use]
    pub const fn is_offer(&self) -> bool {
        matches!(self.source, PriceSource::Offer { .. })
    }

    /// The bundle total for offer lines.
    #[must_use]
    pub const fn offer_total(&self) -> Option<Decimal> {
        match &self.source {
            PriceSource::Offer { offer_price, .. } => Some(*offer_price),
            _ => None,
        }
    }
}

/// Whether the product's promotion applies at `now`.
#[must_use]
pub fn promotion_is_valid(product: &Product, now: DateTime<Utc>) -> bool {
    let Some(promo_price) = product.promo_price else {
        return false;
    };
    let Some(end_date) = product.end_date else {
        return false;
    };

    promo_price > Decimal::ZERO && end_date > now && promo_price < product.price
}

/// The offer rule matching `qty` exactly, if any.
#[must_use]
pub fn matching_offer(rules: &[OfferRule], qty: u32) -> Option<&OfferRule> {
    rules
        .iter()
        .find(|rule| rule.offer_qty > 0 && rule.offer_qty == qty)
}

/// Resolve the effective per-unit price for buying `qty` units of `product`
/// in `variant`.
#[must_use]
pub fn resolve_unit_price(
    product: &Product,
    variant: Option<&Variant>,
    qty: u32,
    now: DateTime<Utc>,
) -> PriceResolution {
    let rules = product.offer_rules();
    if let Some(rule) = matching_offer(&rules, qty) {
        return PriceResolution {
            unit_price: rule.offer_price / Decimal::from(rule.offer_qty),
            source: PriceSource::Offer {
                offer_qty: rule.offer_qty,
                offer_price: rule.offer_price,
                offer_label: rule.offer_label.clone(),
            },
        };
    }

    resolve_base_unit_price(product, variant, now)
}

/// Resolve the per-unit price with offers out of the picture: the valid
/// promotion or the list price, plus the variant's adjustment.
#[must_use]
pub fn resolve_base_unit_price(
    product: &Product,
    variant: Option<&Variant>,
    now: DateTime<Utc>,
) -> PriceResolution {
    let variant_price = variant.map_or(Decimal::ZERO, |v| v.price);

    if promotion_is_valid(product, now)
        && let Some(promo_price) = product.promo_price
    {
        return PriceResolution {
            unit_price: promo_price + variant_price,
            source: PriceSource::Promotion,
        };
    }

    PriceResolution {
        unit_price: product.price + variant_price,
        source: PriceSource::Base,
    }
}
