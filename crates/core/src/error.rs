//! Error types for the packing engine.

use thiserror::Error;

/// Errors that can occur while solving a packing instance.
#[derive(Debug, Error)]
pub enum Error {
    /// One of the pallet or box dimensions is not a positive integer.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Every memoization backing failed to allocate.
    #[error("memory allocation failed: {0}")]
    Allocation(String),

    /// An internal consistency check failed.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
