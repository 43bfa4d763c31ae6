//! Route definitions for the jewelry admin API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - order management
        .nest("/orders", order_routes(state.clone()))
        // Protected routes - carrier tracking
        .nest("/shipments", shipment_routes(state))
}

/// Order management routes (protected)
fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", put(handlers::update_order_status))
        .route("/:order_id/shipment", post(handlers::create_shipment))
        .route("/:order_id/tracking", get(handlers::get_order_tracking))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Carrier tracking routes (protected)
fn shipment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/track", post(handlers::track_dockets))
        .route("/track/:docket", get(handlers::track_docket))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
