//! Order tracking route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use giftora_core::OrderId;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;
use crate::tracking::{TrackingView, normalize_value};

/// Normalized tracking timeline for an order.
///
/// Upstream messages and errors are part of the view, not HTTP errors.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> Result<Json<TrackingView>> {
    let raw = state.marketplace().order_tracking(OrderId::new(order_id)).await?;
    Ok(Json(normalize_value(raw)))
}
