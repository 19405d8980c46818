//! Bookings module: reserve a spot for a time window

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
