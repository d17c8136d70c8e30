//! Account route handlers.
//!
//! Sign-in happens elsewhere; it stores the marketplace customer id in the
//! session under `customer_id`.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, set_sentry_user};
use crate::marketplace::OrderSummary;
use crate::storage::{SessionStore, get_typed, keys};
use crate::state::AppState;

/// Query parameters for `GET /account/orders`.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

const fn first_page() -> u32 {
    1
}

/// The signed-in customer's order history.
#[instrument(skip(state, session))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderSummary>>> {
    let store = SessionStore::new(session);
    let customer_id: i64 = get_typed(&store, keys::CUSTOMER_ID)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Please sign in to view your orders".to_string()))?;

    set_sentry_user(&customer_id);

    let orders = state
        .marketplace()
        .customer_orders(customer_id, query.page.max(1))
        .await?;

    Ok(Json(orders))
}
