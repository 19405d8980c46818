//! Parking lots module: read-side views served through the cache

pub mod handlers;

pub use handlers::*;
