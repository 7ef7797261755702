//! Glint Core
//!
//! Shared utilities for the Glint crates: fast hash collections, logging
//! setup, math re-exports and puffin profiling scopes.

pub mod alloc;
pub mod logging;
pub mod math;
pub mod profiling;
