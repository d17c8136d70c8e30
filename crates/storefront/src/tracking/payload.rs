//! Raw tracking payloads.
//!
//! The tracking endpoint answers in one of four shapes:
//!
//! - a bare JSON string, shown to the shopper as-is
//! - an object with an `error` field (top level or inside `tracking_data`)
//! - an object with `tracking_data.shipment_track_activities` for a single
//!   courier shipment
//! - an object with `data.warehouses` when the order ships from several
//!   warehouses, each either courier-tracked or self-fulfilled

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::lenient;

// =============================================================================
// Activities
// =============================================================================

/// One courier scan event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingActivity {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub activity: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub location: String,
}

impl TrackingActivity {
    pub fn new(
        activity: impl Into<String>,
        date: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            activity: activity.into(),
            date: date.into(),
            location: location.into(),
        }
    }
}

/// One status change recorded by a self-fulfilling seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnShipmentEvent {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub current_status: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub location: String,
}

impl From<OwnShipmentEvent> for TrackingActivity {
    fn from(event: OwnShipmentEvent) -> Self {
        Self {
            activity: event.current_status,
            date: event.date,
            location: event.location,
        }
    }
}

// =============================================================================
// Shipments
// =============================================================================

/// Courier tracking for one shipment. Activities arrive newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierTracking {
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub shipment_track_activities: Vec<TrackingActivity>,
    #[serde(default, deserialize_with = "opt_message")]
    pub error: Option<String>,
    #[serde(default, alias = "awb_code")]
    pub awb: Option<String>,
    #[serde(default)]
    pub track_url: Option<String>,
}

/// Tracking for the part of an order shipped from one warehouse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseTracking {
    #[serde(default, alias = "name")]
    pub warehouse_name: Option<String>,
    #[serde(default, alias = "awb_code")]
    pub awb: Option<String>,
    /// Shipped by the seller rather than a courier.
    #[serde(default, alias = "own_shipment", deserialize_with = "lenient::flag")]
    pub is_own_shipment: bool,
    /// Own-shipment history, oldest first.
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub own_shipment_tracking: Vec<OwnShipmentEvent>,
    #[serde(default)]
    pub tracking_data: Option<CourierTracking>,
}

/// Error messages arrive as strings, but some carriers send objects or
/// numbers. Empty strings mean "no error".
fn opt_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(message_text(Option::<Value>::deserialize(deserializer)?.as_ref()))
}

fn message_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// Payload
// =============================================================================

/// A classified tracking response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingPayload {
    /// A plain string, e.g. `"Shipment not found"`.
    Status(String),
    /// An explicit error. No timeline is shown.
    Error(String),
    /// A single courier shipment.
    Shipment(CourierTracking),
    /// Per-warehouse tracking.
    Warehouses(Vec<WarehouseTracking>),
    /// Nothing to show.
    NoData,
}

impl TrackingPayload {
    /// Classify a raw response.
    ///
    /// Errors are detected before any activity list is read. Unreadable
    /// sections are logged and treated as absent.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let mut root = match value {
            Value::Object(root) => root,
            Value::String(s) if !s.trim().is_empty() => return Self::Status(s),
            _ => return Self::NoData,
        };

        if let Some(error) = message_text(root.get("error")) {
            return Self::Error(error);
        }

        if let Some(tracking) = root.remove("tracking_data").filter(|t| !t.is_null()) {
            if let Some(error) = message_text(tracking.get("error")) {
                return Self::Error(error);
            }
            return match serde_json::from_value::<CourierTracking>(tracking) {
                Ok(shipment) => Self::Shipment(shipment),
                Err(e) => {
                    warn!(error = %e, "Unreadable tracking_data");
                    Self::NoData
                }
            };
        }

        match root.remove("data") {
            Some(Value::String(s)) if !s.trim().is_empty() => return Self::Status(s),
            Some(Value::Object(mut data)) => {
                if let Some(warehouses) = data.remove("warehouses") {
                    return match serde_json::from_value::<Option<Vec<WarehouseTracking>>>(
                        warehouses,
                    ) {
                        Ok(Some(list)) if !list.is_empty() => Self::Warehouses(list),
                        Ok(_) => Self::NoData,
                        Err(e) => {
                            warn!(error = %e, "Unreadable warehouse tracking");
                            Self::NoData
                        }
                    };
                }
            }
            _ => {}
        }

        // A failed envelope with only a message
        let failed = root
            .get("status")
            .is_some_and(|s| matches!(s, Value::Bool(false)) || s.as_str() == Some("false"));
        if failed && let Some(message) = message_text(root.get("message")) {
            return Self::Error(message);
        }

        Self::NoData
    }
}
