//! Storage layer
//!
//! Typed store errors and the atomic write primitive the store builds on.

pub mod error;
pub mod persistence;

pub use error::{StoreError, StoreResult};
pub use persistence::{atomic_write, temp_path_for};
