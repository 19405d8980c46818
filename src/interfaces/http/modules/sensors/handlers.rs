//! Sensor API handlers

use axum::{extract::State, Json};

use super::dto::{SensorBatchRequest, SensorBatchResponse};
use crate::application::ParkingService;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

/// `POST /api/sensors/updates`: all readings apply or none do.
pub async fn apply_sensor_updates(
    State(service): State<ParkingService>,
    ValidatedJson(body): ValidatedJson<SensorBatchRequest>,
) -> Result<Json<ApiResponse<SensorBatchResponse>>, ApiError> {
    let spots = service.apply_sensor_updates(body.into_updates()).await?;
    Ok(Json(ApiResponse::success(SensorBatchResponse {
        updated: spots.len(),
        spots,
    })))
}
