//! Application layer: the booking core's units of work and the service
//! that fronts them.

pub mod services;
pub mod transactions;

pub use services::{BookingRequest, ParkingService, ServiceError};
pub use transactions::{
    create_booking_transaction, create_report_transaction, update_spots_from_sensors,
};
