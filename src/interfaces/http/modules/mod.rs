pub mod bookings;
pub mod health;
pub mod metrics;
pub mod parking_lots;
pub mod reports;
pub mod sensors;
