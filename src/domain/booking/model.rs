//! Booking domain entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::parking::{ParkingLot, ParkingSpot};
use crate::domain::user::UserSummary;
use crate::support::DomainError;

/// Longest booking window accepted by the API.
pub const MAX_BOOKING_HOURS: i64 = 72;

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Active,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "CONFIRMED" => Self::Confirmed,
            "ACTIVE" => Self::Active,
            "COMPLETED" => Self::Completed,
            "NO_SHOW" => Self::NoShow,
            _ => Self::Cancelled,
        }
    }

    /// Whether this booking still holds its spot.
    pub fn holds_spot(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Active)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reservation of one spot for a time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub parking_spot_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    /// Total price in INR
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

/// Input of the booking transaction
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub spot_id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: f64,
}

impl NewBooking {
    /// The window must be non-empty. Length limits are enforced at the API edge.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.end_time <= self.start_time {
            return Err(DomainError::Validation(
                "end_time must be after start_time".to_string(),
            ));
        }
        if self.total_price < 0.0 || !self.total_price.is_finite() {
            return Err(DomainError::Validation(format!(
                "invalid total_price {}",
                self.total_price
            )));
        }
        Ok(())
    }
}

/// Booking enriched with its spot, lot and a minimal user projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub parking_spot: ParkingSpot,
    pub parking_lot: ParkingLot,
    pub user: UserSummary,
}

/// Price for a window at an hourly rate. Every started hour is charged.
pub fn quote_price(price_per_hour: f64, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let minutes = (end - start).num_minutes().max(0);
    let hours = (minutes + 59) / 60;
    (price_per_hour * hours as f64 * 100.0).round() / 100.0
}

/// Checks the API-level window rules: positive and at most [`MAX_BOOKING_HOURS`].
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), DomainError> {
    if end <= start {
        return Err(DomainError::Validation(
            "end_time must be after start_time".to_string(),
        ));
    }
    if end - start > Duration::hours(MAX_BOOKING_HOURS) {
        return Err(DomainError::Validation(format!(
            "booking duration cannot exceed {} hours",
            MAX_BOOKING_HOURS
        )));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        use chrono::TimeZone;
        Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn status_roundtrip() {
        for status in [
            BookingStatus::Confirmed,
            BookingStatus::Active,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::NoShow,
        ] {
            assert_eq!(BookingStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn only_confirmed_and_active_hold_spot() {
        assert!(BookingStatus::Confirmed.holds_spot());
        assert!(BookingStatus::Active.holds_spot());
        assert!(!BookingStatus::Completed.holds_spot());
        assert!(!BookingStatus::NoShow.holds_spot());
    }

    #[test]
    fn started_hours_are_charged() {
        assert_eq!(quote_price(60.0, at(10, 0), at(12, 0)), 120.0);
        assert_eq!(quote_price(60.0, at(10, 0), at(12, 1)), 180.0);
        assert_eq!(quote_price(45.5, at(10, 0), at(10, 20)), 45.5);
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(validate_window(at(12, 0), at(10, 0)).is_err());
        assert!(validate_window(at(10, 0), at(10, 0)).is_err());
        assert!(validate_window(at(10, 0), at(11, 0)).is_ok());
    }

    #[test]
    fn window_longer_than_limit_is_rejected() {
        let start = at(10, 0);
        assert!(validate_window(start, start + Duration::hours(72)).is_ok());
        assert!(validate_window(start, start + Duration::hours(73)).is_err());
    }

    #[test]
    fn new_booking_rejects_negative_price() {
        let b = NewBooking {
            spot_id: "s".into(),
            user_id: "u".into(),
            start_time: at(10, 0),
            end_time: at(11, 0),
            total_price: -1.0,
        };
        assert!(matches!(b.validate(), Err(DomainError::Validation(_))));
    }
}
