//! Parking lot API handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::application::ParkingService;
use crate::domain::LotAvailability;
use crate::interfaces::http::common::{ApiError, ApiResponse};

/// `GET /api/parking-lots/{id}/availability`
pub async fn lot_availability(
    State(service): State<ParkingService>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LotAvailability>>, ApiError> {
    let summary = service.lot_availability(&id).await?;
    Ok(Json(ApiResponse::success(summary)))
}
