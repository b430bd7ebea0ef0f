//! Core type definitions for the page cache
//!
//! This module contains the fundamental types used throughout the crate:
//! address wrappers, element kinds, decoded values, and error types.

mod address;
mod error;
mod value;

// Re-export all public types
pub use address::{Address, PAGE_SIZE};
pub use error::{ReadError, ReadResult};
pub use value::{ElementKind, MemValue};
