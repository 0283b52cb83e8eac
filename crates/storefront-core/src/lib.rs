//! Storefront Core - Domain documents and rules
//!
//! This crate provides the foundational types for the Storefront backend:
//! the persisted documents, the validation applied to write bodies, and the
//! pure computations behind the admin dashboard.

pub mod analytics;
pub mod document;
pub mod error;
pub mod model;

pub use document::{Document, new_id};
pub use error::{Result, StorefrontError};
pub use model::*;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
