//! Page-granularity read-through cache between typed readers and a slow
//! asynchronous remote memory primitive.
//!
//! Whole 4096-byte pages are fetched at most once per stopped session,
//! concurrent requests for one page coalesce into a single fetch, and
//! reads against pages that are not hot enough fall back transparently to
//! direct uncached reads against the source. The cache is invalidated
//! wholesale on every debuggee execution-state change.

pub mod cache;
pub mod config;
pub mod core;
pub mod source;

// Re-export main types for convenience
pub use crate::cache::{MemoryCache, PageBytes, TypedView};
pub use crate::config::{CacheConfig, ConfigError, ConfigLoader, ConfigResult};
pub use crate::core::types::{Address, ElementKind, MemValue, ReadError, ReadResult, PAGE_SIZE};
pub use crate::source::{ExecutionStateEvents, RemoteMemorySource};
