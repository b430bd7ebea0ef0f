//! Page store: cache entries keyed by page base address

use super::view::PageBytes;
use crate::core::types::{ReadError, ReadResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// A queued continuation awaiting an in-flight page fetch
pub(crate) type WaiterTx = oneshot::Sender<ReadResult<PageBytes>>;

/// Waiter queue shared between a pending entry and the fetch task that will
/// drain it. The fetch keeps the queue alive even if invalidation discards
/// the entry, so waiters always hear the result.
pub(crate) type SharedWaiters = Arc<Mutex<Vec<WaiterTx>>>;

/// Fill state of one page. `Ready` and `Failed` are terminal until the
/// whole store is cleared; waiters exist only while `Pending`.
pub(crate) enum PageState {
    Cold,
    Pending(SharedWaiters),
    Ready(PageBytes),
    Failed(ReadError),
}

/// One cache entry per page touched in the current stopped session
pub(crate) struct PageEntry {
    /// Touches recorded for this page, saturating
    pub(crate) hits: u32,
    pub(crate) state: PageState,
}

impl PageEntry {
    fn new() -> Self {
        PageEntry {
            hits: 0,
            state: PageState::Cold,
        }
    }
}

/// Maps page base addresses to their cache entries.
///
/// Entries are created lazily on first touch and only ever removed
/// wholesale by [`PageStore::clear`]; there is no per-page eviction.
#[derive(Default)]
pub(crate) struct PageStore {
    pages: HashMap<u64, PageEntry>,
}

impl PageStore {
    pub(crate) fn new() -> Self {
        PageStore::default()
    }

    /// Returns the entry for `page_base`, creating a zeroed one on first
    /// access
    pub(crate) fn get_or_create(&mut self, page_base: u64) -> &mut PageEntry {
        self.pages.entry(page_base).or_insert_with(PageEntry::new)
    }

    pub(crate) fn get_mut(&mut self, page_base: u64) -> Option<&mut PageEntry> {
        self.pages.get_mut(&page_base)
    }

    /// Discards every entry
    pub(crate) fn clear(&mut self) {
        self.pages.clear();
    }

    /// Number of pages with an entry
    pub(crate) fn len(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_start_cold_and_unhit() {
        let mut store = PageStore::new();
        let entry = store.get_or_create(0x1000);
        assert_eq!(entry.hits, 0);
        assert!(matches!(entry.state, PageState::Cold));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_or_create_reuses_entries() {
        let mut store = PageStore::new();
        store.get_or_create(0x1000).hits = 3;
        assert_eq!(store.get_or_create(0x1000).hits, 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut store = PageStore::new();
        store.get_or_create(0x1000);
        store.get_or_create(0x2000);
        assert_eq!(store.len(), 2);

        store.clear();
        assert_eq!(store.len(), 0);
        assert!(store.get_mut(0x1000).is_none());

        // A fresh touch after clearing starts from scratch.
        assert_eq!(store.get_or_create(0x1000).hits, 0);
    }
}
