//! Wire types for the marketplace API.

use giftora_core::{CartSessionId, OrderId, Pincode, ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::MarketplaceError;

// =============================================================================
// Response Envelope
// =============================================================================

/// The `status` field of a marketplace response.
///
/// Depending on the endpoint it is a boolean, a string such as `"success"`,
/// or a numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ApiStatus {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl ApiStatus {
    /// Whether the status signals success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Bool(ok) => *ok,
            Self::Number(code) => *code == 1 || *code == 200,
            Self::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "true" | "success" | "ok" | "1" | "200"
            ),
        }
    }
}

/// Standard response envelope: `{ status, data }` on success, `error` or
/// `message` on failure.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<ApiStatus>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope, turning a reported failure into an error.
    ///
    /// # Errors
    ///
    /// Returns `MarketplaceError::Api` if the envelope carries an `error`
    /// field or a failing `status`.
    pub fn into_result(self) -> Result<Option<T>, MarketplaceError> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Err(MarketplaceError::Api(error));
        }

        if self.status.as_ref().is_some_and(|s| !s.is_ok()) {
            return Err(MarketplaceError::Api(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }

        Ok(self.data)
    }
}

/// Check a raw JSON response against the envelope conventions without
/// consuming it.
///
/// # Errors
///
/// Returns `MarketplaceError::Api` if the value reports a failure.
pub fn check_envelope(value: &Value) -> Result<(), MarketplaceError> {
    let envelope: ApiEnvelope<Value> = match serde_json::from_value(value.clone()) {
        Ok(envelope) => envelope,
        // Not an object: nothing to check
        Err(_) => return Ok(()),
    };
    envelope.into_result().map(|_| ())
}

// =============================================================================
// Requests
// =============================================================================

/// Product lookup payload sent to `productDetails`.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Cart sync payload sent to `addTOCart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSyncRequest {
    pub cart_id: CartSessionId,
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub is_offer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_qty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_price: Option<Decimal>,
}

/// Tax calculation payload sent to `calculateTax`.
#[derive(Debug, Clone, Serialize)]
pub struct TaxRequest<'a> {
    pub cart_id: &'a CartSessionId,
}

/// Tracking lookup payload sent to `orderTracking`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingRequest {
    pub order_id: OrderId,
}

/// Paged order history lookup sent to `customer_orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerOrdersRequest {
    pub customer_id: i64,
    pub page: u32,
}

/// Enquiry form submission sent to `enquiries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pincode: Pincode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

// =============================================================================
// Responses
// =============================================================================

/// Order history as returned by `customer_orders`: either a bare list or a
/// page object wrapping one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderHistory {
    List(Vec<OrderSummary>),
    Page {
        data: Vec<OrderSummary>,
        #[serde(default)]
        current_page: Option<u32>,
        #[serde(default)]
        last_page: Option<u32>,
    },
}

impl OrderHistory {
    /// The orders, whichever shape they arrived in.
    #[must_use]
    pub fn into_orders(self) -> Vec<OrderSummary> {
        match self {
            Self::List(orders) | Self::Page { data: orders, .. } => orders,
        }
    }
}

/// One row of the customer's order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(alias = "id")]
    pub order_id: OrderId,
    #[serde(default)]
    pub order_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient::opt_decimal")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
}
