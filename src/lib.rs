//! # ParkPulse
//!
//! Booking core of a parking availability service: retried database
//! transactions for bookings, sensor batches and crowd reports, fronted by a
//! cache-aside layer.
//!
//! ## Architecture
//!
//! - **domain**: parking lots, spots, bookings, sensors, reports
//! - **application**: transactional units of work and the parking service
//! - **infrastructure**: SeaORM store, transaction executor, redis cache
//! - **interfaces**: REST API (axum)
//! - **server**: process lifecycle

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, Cache, DatabaseConfig, TransactionExecutor, TransactionOptions};

pub use interfaces::http::create_api_router;
