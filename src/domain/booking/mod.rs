//! Booking aggregate

pub mod model;

pub use model::{
    quote_price, validate_window, Booking, BookingDetails, BookingStatus, NewBooking,
    MAX_BOOKING_HOURS,
};
