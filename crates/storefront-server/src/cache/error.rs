//! Cache error types.

use thiserror::Error;

/// Errors raised by a key store backend.
///
/// These never reach HTTP clients: the read-through and invalidation paths
/// log them and carry on.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend rejected or failed a command.
    #[error("{backend} backend error: {reason}")]
    Backend {
        backend: &'static str,
        reason: String,
    },

    /// No connection could be obtained from the pool.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// The backend could not be configured.
    #[error("invalid cache configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Creates a new backend error.
    pub fn backend(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::Backend {
            backend,
            reason: reason.into(),
        }
    }

    /// Returns true if the error came from connection handling rather than a command.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Pool(_))
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        Self::backend("redis", e.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        Self::Pool(e.to_string())
    }
}
