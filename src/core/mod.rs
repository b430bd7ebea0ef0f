//! Core module containing fundamental types for the page cache
//!
//! This module provides the foundational building blocks used throughout
//! the crate, including address handling, element kinds, decoded values,
//! and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{Address, ElementKind, MemValue, ReadError, ReadResult, PAGE_SIZE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
