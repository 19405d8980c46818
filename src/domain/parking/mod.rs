//! Parking aggregate
//!
//! Parking lots, their spots and the availability summary derived from them.

pub mod model;

pub use model::{LotAvailability, ParkingLot, ParkingSpot, SpotStatus, VehicleType};
