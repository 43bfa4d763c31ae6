//! Order management HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::ApiResponse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{CreateOrderInput, ListOrdersQuery, UpdateStatusInput};
use crate::services::{OrderService, ShipmentService};
use crate::AppState;

/// List orders with optional status and date filters
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.store.clone(), state.transition_policy());
    let orders = service.list_orders(query).await?;

    Ok(Json(ApiResponse::ok("Orders retrieved", orders)))
}

/// Create a new order
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.store.clone(), state.transition_policy());
    let order = service.create_order(input, &user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Order created", order)),
    ))
}

/// Get a single order
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.store.clone(), state.transition_policy());
    let order = service.get_order(order_id).await?;

    Ok(Json(ApiResponse::ok("Order retrieved", order)))
}

/// Change an order's status
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.store.clone(), state.transition_policy());
    let order = service.set_status(order_id, input, &user.user_id).await?;

    Ok(Json(ApiResponse::ok(
        format!("Order status updated to {}", order.status),
        order,
    )))
}

/// Book a carrier shipment for an order
pub async fn create_shipment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = shipment_service(&state);
    let outcome = service.create_shipment(order_id, &user.user_id).await?;

    let message = if outcome.docket_number.is_empty() {
        "Shipment created, docket number pending".to_string()
    } else {
        format!("Shipment created with docket {}", outcome.docket_number)
    };

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message, outcome))))
}

/// Tracking log of an order
pub async fn get_order_tracking(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = OrderService::new(state.store.clone(), state.transition_policy());
    let tracking = service.get_tracking(order_id).await?;

    Ok(Json(ApiResponse::ok("Tracking retrieved", tracking)))
}

pub(crate) fn shipment_service(state: &AppState) -> ShipmentService {
    ShipmentService::new(
        OrderService::new(state.store.clone(), state.transition_policy()),
        state.carrier.clone(),
        state.config.carrier.clone(),
    )
}
