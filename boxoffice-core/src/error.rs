//! Error types for boxoffice.
//!
//! Only caller misuse at construction time is an error. Blocking conditions
//! (pool full, pool empty) and cancelled waits are normal outcomes of the
//! pool contract and are reported through return values, never through
//! `Err`.

use std::io;

use thiserror::Error;

/// Result type for boxoffice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing boxoffice values.
#[derive(Debug, Error)]
pub enum Error {
    /// Pool capacity must be a positive integer.
    #[error("invalid pool capacity: {0} (must be positive)")]
    InvalidCapacity(usize),

    /// Ticket prices must be finite and non-negative.
    #[error("invalid ticket price: {0} (must be finite and non-negative)")]
    InvalidPrice(f64),

    /// Role rates must be positive (operations per second).
    #[error("invalid role rate: {0} (must be positive)")]
    InvalidRate(u32),

    /// The OS refused to spawn a role thread.
    #[error("failed to spawn role thread: {0}")]
    Spawn(#[from] io::Error),
}
