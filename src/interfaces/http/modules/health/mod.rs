//! Health module: liveness of the service and its stores

pub mod handlers;

pub use handlers::*;
