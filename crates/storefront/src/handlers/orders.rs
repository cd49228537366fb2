//! Order handlers. Orders are not cached; totals and unit-price snapshots
//! are computed inside the repository at creation time.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use storefront_core::commerce::{NewOrder, Order};
use storefront_core::storage::RepositoryError;

use crate::{handlers::AppError, state::AppState};

/// Body for PATCH /api/orders/{id}/status.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: String,
}

/// List all orders (GET /api/orders).
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.order_repo.list_orders().await?))
}

/// Get a single order by ID (GET /api/orders/{id}).
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .order_repo
        .get_order(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Order", id))?;
    Ok(Json(order))
}

/// List the orders of one user (GET /api/orders/user/{user_id}).
pub async fn list_orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.order_repo.list_orders_by_user(user_id).await?))
}

/// Create a new order (POST /api/orders).
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<NewOrder>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.order_repo.create_order(&payload).await?;
    tracing::info!(order_id = order.id, user_id = order.user_id, total = order.total, "Created order");

    Ok((StatusCode::CREATED, Json(order)))
}

/// Replace an order's status label (PATCH /api/orders/{id}/status).
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatus>,
) -> Result<Json<Order>, AppError> {
    if payload.status.trim().is_empty() {
        return Err(RepositoryError::InvalidData("status must not be empty".to_string()).into());
    }

    let order = state
        .order_repo
        .update_order_status(id, &payload.status)
        .await?;
    tracing::info!(order_id = id, status = %order.status, "Updated order status");
    Ok(Json(order))
}

/// Delete an order by ID (DELETE /api/orders/{id}).
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let order = state.order_repo.delete_order(id).await?;
    tracing::info!(order_id = id, "Deleted order");
    Ok(Json(order))
}
