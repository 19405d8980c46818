//! Sensors module: batched occupancy updates from IoT devices

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
