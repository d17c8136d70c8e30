//! Shipment status vocabulary shared by the tracking timeline.

use serde::{Deserialize, Serialize};

/// Icon displayed next to a tracking step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IconKind {
    /// Generic "done" checkmark for completed intermediate steps.
    Done,
    /// Clock: waiting or not delivered yet.
    Pending,
    Processing,
    Dispatched,
    /// Package with a check: delivered or reached destination.
    Delivered,
    Cancelled,
    /// Truck: in transit.
    Transit,
    /// Check: picked up successfully.
    PickedUp,
    /// Warning: pickup not done.
    Warning,
    /// Empty circle.
    Unknown,
}

/// Status of a self-fulfilled ("own shipment") order.
///
/// Sellers that ship themselves report one of a small set of statuses. Parsing
/// is an exact, case-insensitive match; anything else is [`Self::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OwnShipmentStatus {
    Pending,
    Processing,
    Dispatched,
    Delivered,
    Cancelled,
    #[default]
    Other,
}

impl OwnShipmentStatus {
    /// Classify a raw status string.
    #[must_use]
    pub fn parse_lenient(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "dispatched" => Self::Dispatched,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other,
        }
    }

    /// Icon shown for this status.
    #[must_use]
    pub const fn icon(self) -> IconKind {
        match self {
            Self::Pending => IconKind::Pending,
            Self::Processing => IconKind::Processing,
            Self::Dispatched => IconKind::Dispatched,
            Self::Delivered => IconKind::Delivered,
            Self::Cancelled => IconKind::Cancelled,
            Self::Other => IconKind::Unknown,
        }
    }

    /// Accent colour paired with the icon (hex RGB).
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Pending => "#f59e0b",
            Self::Processing => "#3b82f6",
            Self::Dispatched => "#8b5cf6",
            Self::Delivered => "#16a34a",
            Self::Cancelled => "#dc2626",
            Self::Other => "#9ca3af",
        }
    }
}

impl std::fmt::Display for OwnShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Dispatched => write!(f, "dispatched"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            OwnShipmentStatus::parse_lenient("Delivered"),
            OwnShipmentStatus::Delivered
        );
        assert_eq!(
            OwnShipmentStatus::parse_lenient("DISPATCHED"),
            OwnShipmentStatus::Dispatched
        );
        assert_eq!(
            OwnShipmentStatus::parse_lenient(" processing "),
            OwnShipmentStatus::Processing
        );
    }

    #[test]
    fn test_both_cancel_spellings() {
        assert_eq!(
            OwnShipmentStatus::parse_lenient("Cancelled"),
            OwnShipmentStatus::Cancelled
        );
        assert_eq!(
            OwnShipmentStatus::parse_lenient("canceled"),
            OwnShipmentStatus::Cancelled
        );
    }

    #[test]
    fn test_parse_is_exact_match() {
        // Substrings do not count for own shipments
        assert_eq!(
            OwnShipmentStatus::parse_lenient("Not Delivered"),
            OwnShipmentStatus::Other
        );
        assert_eq!(
            OwnShipmentStatus::parse_lenient("pending pickup"),
            OwnShipmentStatus::Other
        );
    }

    #[test]
    fn test_icons_and_colors_are_distinct() {
        let statuses = [
            OwnShipmentStatus::Pending,
            OwnShipmentStatus::Processing,
            OwnShipmentStatus::Dispatched,
            OwnShipmentStatus::Delivered,
            OwnShipmentStatus::Cancelled,
            OwnShipmentStatus::Other,
        ];
        let icons: std::collections::HashSet<_> = statuses.iter().map(|s| s.icon()).collect();
        let colors: std::collections::HashSet<_> = statuses.iter().map(|s| s.color()).collect();
        assert_eq!(icons.len(), statuses.len());
        assert_eq!(colors.len(), statuses.len());
        assert_eq!(OwnShipmentStatus::Other.icon(), IconKind::Unknown);
    }

    #[test]
    fn test_icon_kind_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&IconKind::PickedUp).unwrap(),
            "\"pickedUp\""
        );
        assert_eq!(
            serde_json::to_string(&IconKind::Transit).unwrap(),
            "\"transit\""
        );
    }
}
