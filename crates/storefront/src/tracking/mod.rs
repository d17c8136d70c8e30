//! Shipment tracking timelines.
//!
//! [`TrackingPayload::from_value`] classifies a raw tracking response and
//! [`normalize_payload`] turns it into a [`TrackingView`]: a message, an
//! error, "no data", or one de-noised step timeline per shipment.

pub mod normalize;
pub mod payload;

pub use normalize::{
    DisplayStep, ShipmentTimeline, StepDate, TrackingView, build_timeline, classify_terminal,
    dedup_activities, format_label, location_lines, normalize_payload, step_date,
};
pub use payload::{
    CourierTracking, OwnShipmentEvent, TrackingActivity, TrackingPayload, WarehouseTracking,
};

/// Classify and normalize a raw tracking response in one step.
#[must_use]
pub fn normalize_value(value: serde_json::Value) -> TrackingView {
    normalize_payload(TrackingPayload::from_value(value))
}
