//! Booking DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::BookingRequest;
use crate::domain::{BookingDetails, BookingStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, max = 64, message = "user_id is required"))]
    pub user_id: String,
    #[validate(length(min = 1, max = 64, message = "parking_spot_id is required"))]
    pub parking_spot_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(r: CreateBookingRequest) -> Self {
        Self {
            user_id: r.user_id,
            spot_id: r.parking_spot_id,
            start_time: r.start_time,
            end_time: r.end_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingDto {
    pub id: String,
    pub status: BookingStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: f64,
    pub parking_spot_id: String,
    pub spot_number: String,
    pub parking_lot_id: String,
    pub parking_lot_name: String,
    pub user_id: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<BookingDetails> for BookingDto {
    fn from(d: BookingDetails) -> Self {
        Self {
            id: d.booking.id,
            status: d.booking.status,
            start_time: d.booking.start_time,
            end_time: d.booking.end_time,
            total_price: d.booking.total_price,
            parking_spot_id: d.parking_spot.id,
            spot_number: d.parking_spot.spot_number,
            parking_lot_id: d.parking_lot.id,
            parking_lot_name: d.parking_lot.name,
            user_id: d.user.id,
            user_name: d.user.name,
            created_at: d.booking.created_at,
        }
    }
}
