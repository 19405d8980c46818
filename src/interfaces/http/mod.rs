//! HTTP interface
//!
//! - `common`: response envelope, error mapping, validated JSON extractor
//! - `modules`: one directory per resource (dto + handlers)
//! - `router`: assembles the routes and the tower layers

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
