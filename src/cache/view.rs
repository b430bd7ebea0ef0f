//! Typed, read-only views over cached page buffers

use crate::core::types::{ElementKind, MemValue};
use std::sync::Arc;

/// Immutable shared page contents. A buffer is filled exactly once by a
/// page fetch and never mutated afterwards, so any number of views may
/// alias it.
pub type PageBytes = Arc<[u8]>;

/// Reinterprets a page buffer as a sequence of one element kind
#[derive(Debug, Clone)]
pub struct TypedView {
    bytes: PageBytes,
    kind: ElementKind,
}

impl TypedView {
    /// Creates a view of `bytes` as a sequence of `kind` elements
    pub fn new(bytes: PageBytes, kind: ElementKind) -> Self {
        TypedView { bytes, kind }
    }

    /// The element kind this view decodes
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Length of the underlying buffer in bytes
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Number of whole elements the buffer holds
    pub fn len(&self) -> usize {
        self.bytes.len() / self.kind.size()
    }

    /// Whether the buffer holds no whole element
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the element at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<MemValue> {
        let size = self.kind.size();
        let start = index.checked_mul(size)?;
        let end = start.checked_add(size)?;
        let chunk = self.bytes.get(start..end)?;
        MemValue::from_le_bytes(self.kind, chunk)
    }

    /// Iterates the whole elements in order
    pub fn iter(&self) -> impl Iterator<Item = MemValue> + '_ {
        self.bytes
            .chunks_exact(self.kind.size())
            .filter_map(move |chunk| MemValue::from_le_bytes(self.kind, chunk))
    }
}
