//! # Guardian Core
//!
//! Core types, traits, and interfaces for the Cluster Guardian dashboard client.
//!
//! This crate provides:
//! - Error types and handling framework with severity classification
//! - The [`Timestamp`](types::Timestamp) millisecond newtype
//! - Wire message and event data structures for the realtime channel
//! - The [`ReadModelCache`](traits::ReadModelCache) collaborator trait

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

/// Core type definitions and `NewType` wrappers
pub mod types;

/// Channel data structures
pub mod data;

/// Error types and handling
pub mod error;

/// Core trait definitions
pub mod traits;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::*;
    pub use crate::traits::*;
    pub use crate::types::*;
}
