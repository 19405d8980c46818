//! Booking API handlers

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{BookingDto, CreateBookingRequest};
use crate::application::ParkingService;
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

/// `POST /api/bookings`
pub async fn create_booking(
    State(service): State<ParkingService>,
    ValidatedJson(body): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDto>>), ApiError> {
    let details = service.book_spot(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BookingDto::from(details))),
    ))
}
