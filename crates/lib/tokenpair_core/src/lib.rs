//! # tokenpair_core
//!
//! Signed access/refresh credential pairs with single-use refresh rotation.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod notify;
pub mod store;
pub mod token;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
