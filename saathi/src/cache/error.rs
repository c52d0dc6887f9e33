//! Cache-related errors.

use thiserror::Error;

/// Errors a cache operation can surface.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache's interior lock was poisoned by a panic in another holder. Cached
    /// data can no longer be trusted, so writes are refused instead of recovered.
    #[error("cache lock poisoned")]
    Poisoned,
}
