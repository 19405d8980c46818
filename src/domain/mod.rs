pub mod booking;
pub mod parking;
pub mod report;
pub mod sensor;
pub mod user;

// Re-export commonly used types
pub use booking::{Booking, BookingDetails, BookingStatus, NewBooking};
pub use parking::{LotAvailability, ParkingLot, ParkingSpot, SpotStatus, VehicleType};
pub use report::{NewReport, Report, ReportOutcome, ReportPolicy, ReportType};
pub use sensor::{Sensor, SensorType, SensorUpdate};
pub use user::{UserRole, UserSummary};

pub use crate::support::errors::DomainError;
