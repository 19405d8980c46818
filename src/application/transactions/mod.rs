//! Multi-row writes of the booking core
//!
//! Each function here is one unit of work for the
//! [`TransactionExecutor`](crate::infrastructure::database::TransactionExecutor).
//! None of them retries on its own: they fail on the first bad read and the
//! executor decides what happens next.

pub mod booking;
pub mod reports;
pub mod sensors;

pub use booking::create_booking_transaction;
pub use reports::create_report_transaction;
pub use sensors::{update_spots_from_sensors, SENSOR_CHUNK_SIZE};
