//! `NewType` wrappers for core primitives.
//!
//! # Types
//!
//! - [`Timestamp`] - Unix millisecond timestamps

mod timestamp;

pub use timestamp::Timestamp;

/// Validation error for `NewType` construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Timestamp is invalid (negative)
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}
