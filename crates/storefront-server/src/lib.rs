//! Storefront Server - HTTP API and cache layer for the Storefront backend
//!
//! Every list and detail read goes through [`cache::ReadThrough`]; every write
//! commits to the document store first and then drops the affected keys through
//! [`cache::InvalidationRouter`].

pub mod cache;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod payments;
pub mod server;
pub mod settings;
pub mod state;

pub use error::AppError;
pub use server::{API_PREFIX, create_router, create_router_with_settings, run_server};
pub use settings::Settings;
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
