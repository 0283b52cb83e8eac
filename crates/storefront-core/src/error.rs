//! Error types for Storefront.
//!
//! This module defines the domain error hierarchy shared by the store
//! and the HTTP layer. All errors implement `std::error::Error` via
//! `thiserror`.
//!
//! # Example
//!
//! ```
//! use storefront_core::{Result, StorefrontError};
//!
//! fn require_name(name: &str) -> Result<&str> {
//!     if name.trim().is_empty() {
//!         return Err(StorefrontError::validation("name", "Please enter name"));
//!     }
//!     Ok(name)
//! }
//!
//! assert!(require_name("").unwrap_err().is_validation_error());
//! ```

use thiserror::Error;

/// Main error type for domain operations.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// An entity looked up by id does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity ("Product", "Order", ...)
        entity: &'static str,
        /// The id that was requested
        id: String,
    },

    /// A write body is missing fields or carries invalid values.
    #[error("{message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Client-facing description
        message: String,
    },

    /// The caller could not be identified.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is known but not allowed to perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorefrontError {
    /// Creates a NotFound error.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_core::StorefrontError;
    ///
    /// let error = StorefrontError::not_found("Product", "p-1");
    /// assert!(error.is_not_found());
    /// assert_eq!(error.to_string(), "Product not found: p-1");
    /// ```
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a Validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates a Forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error indicates a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Type alias for Results with StorefrontError.
pub type Result<T> = std::result::Result<T, StorefrontError>;
