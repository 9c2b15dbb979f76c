//! Core trait definitions.
//!
//! This module provides the collaborator seams consumed by the realtime
//! channel. The read-model cache itself lives outside this repository;
//! the channel only ever signals staleness through [`ReadModelCache`].

mod cache;

pub use cache::{NullCache, ReadModelCache};
