//! Report API handlers

use axum::{extract::State, http::StatusCode, Json};

use super::dto::CreateReportRequest;
use crate::application::ParkingService;
use crate::domain::ReportOutcome;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

/// `POST /api/reports`
pub async fn create_report(
    State(service): State<ParkingService>,
    ValidatedJson(body): ValidatedJson<CreateReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportOutcome>>), ApiError> {
    let outcome = service.submit_report(body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}
