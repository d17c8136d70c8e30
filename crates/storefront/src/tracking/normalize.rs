//! Tracking timeline normalization.
//!
//! Couriers emit noisy scan histories: the same "In Transit" or "Booked"
//! label can repeat dozens of times. The timeline keeps the most recent
//! occurrence of each noisy label and every occurrence of anything else,
//! then orders steps earliest to latest so the last step is the current
//! status.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use giftora_core::{IconKind, OwnShipmentStatus};
use serde::Serialize;

use super::payload::{CourierTracking, TrackingActivity, TrackingPayload, WarehouseTracking};

/// Carrier labels that repeat without adding information.
pub const NOISY_LABELS: &[&str] = &[
    "In Transit",
    "Booked",
    "Picked Up",
    "Not Picked",
    "Pickup Scheduled",
    "Softdata Upload",
    "Pickup Awaited",
    "Mis Route",
    "Reached At Destination",
];

/// Labels rendered one word per line.
pub const MULTILINE_LABELS: &[&str] = &["Pickup Scheduled", "Pickup Reassigned", "Softdata Upload"];

/// Timestamp layouts seen from carriers, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

// =============================================================================
// Output Types
// =============================================================================

/// Display form of a step timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDate {
    /// e.g. `15 Mar 2024`
    pub day: String,
    /// e.g. `02:22 PM`. Absent for date-only timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// One rendered step of a tracking timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStep {
    pub label: String,
    pub is_completed: bool,
    pub is_terminal: bool,
    pub icon: IconKind,
    /// Only set for own shipments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<StepDate>,
    pub location_lines: Vec<String>,
}

/// The timeline of one shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShipmentTimeline {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awb: Option<String>,
    pub own_shipment: bool,
    /// Courier error for this warehouse. Steps are empty when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub steps: Vec<DisplayStep>,
}

impl ShipmentTimeline {
    /// The current (terminal) step.
    #[must_use]
    pub fn current(&self) -> Option<&DisplayStep> {
        self.steps.last()
    }

    fn is_blank(&self) -> bool {
        self.steps.is_empty() && self.error.is_none()
    }
}

/// What the tracking page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TrackingView {
    /// Show the message alone.
    Status(String),
    /// Show the error alone.
    Error(String),
    /// Nothing has been tracked yet.
    NoData,
    Shipments(Vec<ShipmentTimeline>),
}

// =============================================================================
// Step Rules
// =============================================================================

fn label_key(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

fn in_list(list: &[&str], label: &str) -> bool {
    let label = label.trim();
    list.iter().any(|l| l.eq_ignore_ascii_case(label))
}

/// Whether `label` is one of the repeatable carrier labels.
#[must_use]
pub fn is_noisy(label: &str) -> bool {
    in_list(NOISY_LABELS, label)
}

/// Drop older repeats of noisy labels.
///
/// `activities` must be newest first. The result stays newest first and
/// keeps the first (most recent) occurrence of each noisy label. Other
/// labels are never dropped.
#[must_use]
pub fn dedup_activities(activities: Vec<TrackingActivity>) -> Vec<TrackingActivity> {
    let mut seen = HashSet::new();
    activities
        .into_iter()
        .filter(|a| !is_noisy(&a.activity) || seen.insert(label_key(&a.activity)))
        .collect()
}

/// Icon for the current step of a courier shipment.
///
/// Case-insensitive substring checks, first match wins:
/// "not delivered", "cancelled"/"canceled", "pickup not done", "in transit",
/// "picked successfully", "reached at destination"/"delivered".
#[must_use]
pub fn classify_terminal(status: &str) -> IconKind {
    let status = status.to_lowercase();
    let has = |needle: &str| status.contains(needle);

    if has("not delivered") {
        IconKind::Pending
    } else if has("cancelled") || has("canceled") {
        IconKind::Cancelled
    } else if has("pickup not done") {
        IconKind::Warning
    } else if has("in transit") {
        IconKind::Transit
    } else if has("picked successfully") {
        IconKind::PickedUp
    } else if has("reached at destination") || has("delivered") {
        IconKind::Delivered
    } else {
        IconKind::Unknown
    }
}

/// Step label text; known multi-word labels get one word per line.
#[must_use]
pub fn format_label(label: &str) -> String {
    if in_list(MULTILINE_LABELS, label) {
        label.split_whitespace().collect::<Vec<_>>().join("\n")
    } else {
        label.trim().to_string()
    }
}

/// Location segments, one per line.
#[must_use]
pub fn location_lines(location: &str) -> Vec<String> {
    location
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Split a carrier timestamp into display day and time.
///
/// Times are shown as written by the carrier, with no zone conversion.
/// Unrecognized timestamps yield `None`.
#[must_use]
pub fn step_date(raw: &str) -> Option<StepDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let naive = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        });

    if let Some(dt) = naive {
        return Some(StepDate {
            day: dt.format("%d %b %Y").to_string(),
            time: Some(dt.format("%I:%M %p").to_string()),
        });
    }

    ["%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .map(|d| StepDate {
            day: d.format("%d %b %Y").to_string(),
            time: None,
        })
}

// =============================================================================
// Timelines
// =============================================================================

/// Build display steps from deduplicated, newest-first activities.
///
/// Steps come out earliest first. For courier shipments every step before
/// the last is a completed checkmark and the last is classified with
/// [`classify_terminal`]. Own shipments take their icon and colour from the
/// status table on every step.
#[must_use]
pub fn build_timeline(activities: &[TrackingActivity], own_shipment: bool) -> Vec<DisplayStep> {
    let count = activities.len();

    activities
        .iter()
        .rev()
        .enumerate()
        .map(|(index, activity)| {
            let is_terminal = index + 1 == count;

            let (icon, color, is_completed) = if own_shipment {
                let status = OwnShipmentStatus::parse_lenient(&activity.activity);
                (
                    status.icon(),
                    Some(status.color()),
                    !is_terminal || status == OwnShipmentStatus::Delivered,
                )
            } else if is_terminal {
                let icon = classify_terminal(&activity.activity);
                (
                    icon,
                    None,
                    matches!(icon, IconKind::Delivered | IconKind::PickedUp),
                )
            } else {
                (IconKind::Done, None, true)
            };

            DisplayStep {
                label: format_label(&activity.activity),
                is_completed,
                is_terminal,
                icon,
                color,
                date: step_date(&activity.date),
                location_lines: location_lines(&activity.location),
            }
        })
        .collect()
}

fn courier_timeline(tracking: CourierTracking) -> ShipmentTimeline {
    let activities = dedup_activities(tracking.shipment_track_activities);
    ShipmentTimeline {
        warehouse_name: None,
        awb: tracking.awb,
        own_shipment: false,
        error: None,
        steps: build_timeline(&activities, false),
    }
}

fn warehouse_timeline(warehouse: WarehouseTracking) -> ShipmentTimeline {
    let WarehouseTracking {
        warehouse_name,
        awb,
        is_own_shipment,
        own_shipment_tracking,
        tracking_data,
    } = warehouse;

    if is_own_shipment {
        // Own-shipment history arrives oldest first
        let newest_first: Vec<TrackingActivity> = own_shipment_tracking
            .into_iter()
            .rev()
            .map(TrackingActivity::from)
            .collect();
        let activities = dedup_activities(newest_first);
        return ShipmentTimeline {
            warehouse_name,
            awb,
            own_shipment: true,
            error: None,
            steps: build_timeline(&activities, true),
        };
    }

    let tracking = tracking_data.unwrap_or_default();
    if let Some(error) = tracking.error {
        return ShipmentTimeline {
            warehouse_name,
            awb: awb.or(tracking.awb),
            own_shipment: false,
            error: Some(error),
            steps: Vec::new(),
        };
    }

    let timeline = courier_timeline(tracking);
    ShipmentTimeline {
        warehouse_name,
        awb: awb.or(timeline.awb),
        ..timeline
    }
}

/// Turn a classified payload into the view the tracking page renders.
#[must_use]
pub fn normalize_payload(payload: TrackingPayload) -> TrackingView {
    match payload {
        TrackingPayload::Status(message) => TrackingView::Status(message),
        TrackingPayload::Error(message) => TrackingView::Error(message),
        TrackingPayload::NoData => TrackingView::NoData,
        TrackingPayload::Shipment(tracking) => {
            let timeline = courier_timeline(tracking);
            if timeline.steps.is_empty() {
                TrackingView::NoData
            } else {
                TrackingView::Shipments(vec![timeline])
            }
        }
        TrackingPayload::Warehouses(warehouses) => {
            let timelines: Vec<ShipmentTimeline> =
                warehouses.into_iter().map(warehouse_timeline).collect();
            if timelines.iter().all(ShipmentTimeline::is_blank) {
                TrackingView::NoData
            } else {
                TrackingView::Shipments(timelines)
            }
        }
    }
}
