//! Application services

mod parking;

pub use parking::{BookingRequest, ParkingService, ServiceError};
