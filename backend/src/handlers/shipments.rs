//! Carrier tracking HTTP handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::ApiResponse;

use crate::error::AppResult;
use crate::handlers::orders::shipment_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackManyRequest {
    #[serde(default)]
    pub docket_numbers: Vec<String>,
}

/// Track one docket with the carrier
pub async fn track_docket(
    State(state): State<AppState>,
    Path(docket): Path<String>,
) -> AppResult<impl IntoResponse> {
    let tracking = shipment_service(&state).track_docket(&docket).await?;

    Ok(Json(ApiResponse::ok("Tracking retrieved", tracking)))
}

/// Track several dockets in one carrier request
pub async fn track_dockets(
    State(state): State<AppState>,
    Json(request): Json<TrackManyRequest>,
) -> AppResult<impl IntoResponse> {
    let tracking = shipment_service(&state)
        .track_dockets(&request.docket_numbers)
        .await?;

    Ok(Json(ApiResponse::ok("Tracking retrieved", tracking)))
}
