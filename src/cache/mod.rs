//! Read-through page cache over a remote memory source
//!
//! Serves typed single-value and array reads out of whole cached pages.
//! Concurrent requests for one page coalesce into a single fetch, and
//! reads against pages that have not crossed the admission threshold fall
//! back to direct uncached reads against the source.

mod store;
mod view;

pub use view::{PageBytes, TypedView};

use crate::config::CacheConfig;
use crate::core::types::{Address, ElementKind, MemValue, ReadError, ReadResult, PAGE_SIZE};
use crate::source::{ExecutionStateEvents, RemoteMemorySource};
use std::sync::{Arc, Mutex, Weak};
use store::{PageState, PageStore, SharedWaiters};
use tokio::sync::oneshot;
use tracing::{debug, trace};

/// Element size of the bulk page fetch, independent of the element size a
/// caller asked for.
const FETCH_ITEM_SIZE: usize = 4;

/// Elements retrieved by one full-page fetch
const FETCH_ITEMS_PER_PAGE: usize = PAGE_SIZE / FETCH_ITEM_SIZE;

// The byte-for-byte copy into the page buffer relies on this.
const _: () = assert!(PAGE_SIZE % FETCH_ITEM_SIZE == 0);

/// Outcome of admitting one page: a result that is already settled, or a
/// queue slot behind the page's single in-flight fetch.
enum PageClaim {
    Settled(ReadResult<PageBytes>),
    Queued(oneshot::Receiver<ReadResult<PageBytes>>),
}

impl PageClaim {
    async fn resolve(self) -> ReadResult<PageBytes> {
        match self {
            PageClaim::Settled(result) => result,
            PageClaim::Queued(rx) => rx.await.unwrap_or(Err(ReadError::Interrupted)),
        }
    }
}

struct Inner<S> {
    source: S,
    config: CacheConfig,
    store: Mutex<PageStore>,
    /// Pointer width in bytes, resolved once per process lifetime.
    /// Invalidation does not reset it.
    pointer_width: Mutex<Option<usize>>,
}

impl<S> Inner<S> {
    fn invalidate(&self) {
        let mut store = self.store.lock().unwrap();
        let dropped = store.len();
        store.clear();
        debug!(dropped, "cache invalidated");
    }
}

/// Page-granularity read-through cache for one debuggee process.
///
/// Cloning yields another handle to the same cache; the shared state lives
/// for as long as any handle (or in-flight fetch) does.
pub struct MemoryCache<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for MemoryCache<S> {
    fn clone(&self) -> Self {
        MemoryCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RemoteMemorySource> MemoryCache<S> {
    /// Creates a cache reading through `source`
    pub fn new(source: S, config: CacheConfig) -> Self {
        MemoryCache {
            inner: Arc::new(Inner {
                source,
                config,
                store: Mutex::new(PageStore::new()),
                pointer_width: Mutex::new(None),
            }),
        }
    }

    /// The underlying remote source
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Number of pages with a cache entry in the current session
    pub fn page_count(&self) -> usize {
        self.inner.store.lock().unwrap().len()
    }

    /// Discards every cached page.
    ///
    /// Fetches already in flight still deliver to the waiters they had;
    /// later reads of the same pages start from a cold store.
    pub fn invalidate(&self) {
        self.inner.invalidate();
    }

    /// Registers the single execution-state handler that clears this cache.
    ///
    /// The handler holds only a weak reference; dropping every cache handle
    /// turns it into a no-op.
    pub fn subscribe(&self, events: &impl ExecutionStateEvents) {
        let weak: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        events.on_execution_state_change(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.invalidate();
            }
        }));
    }

    /// Reads the debuggee pointer stored at `address`.
    ///
    /// The pointer width is queried from the source on first use and kept
    /// for the process lifetime.
    pub async fn read_pointer(&self, address: impl Into<Address>) -> ReadResult<Address> {
        let width = self.pointer_width().await?;
        let value = self.read_number(address, width, true, false).await?;
        match value.as_u64() {
            Some(raw) => Ok(Address::new(raw)),
            None => Err(ReadError::UnexpectedKind(value.kind().to_string())),
        }
    }

    /// Reads one `item_size`-byte value at `address`.
    ///
    /// Addresses must be naturally aligned to `item_size` for the cached
    /// path's intra-page offset to be meaningful. Unsupported element
    /// kinds, and pages below the trigger threshold, are read directly
    /// from the source instead.
    pub async fn read_number(
        &self,
        address: impl Into<Address>,
        item_size: usize,
        is_unsigned: bool,
        is_float: bool,
    ) -> ReadResult<MemValue> {
        let address = address.into();
        let Some(kind) = ElementKind::from_flags(item_size, is_unsigned, is_float) else {
            // Unsupported kinds never touch the store.
            trace!(%address, item_size, "unsupported element kind, reading uncached");
            return self
                .inner
                .source
                .read_number(address, item_size, is_unsigned, is_float)
                .await;
        };
        match self.admit(address.page_base().as_u64()) {
            Some(claim) => {
                let bytes = claim.resolve().await?;
                let view = TypedView::new(bytes, kind);
                let index = address.page_offset() / kind.size();
                view.get(index).ok_or(ReadError::ShortRead {
                    expected: (index + 1) * kind.size(),
                    actual: view.byte_len(),
                })
            }
            None => {
                trace!(%address, "page below trigger threshold, reading uncached");
                self.inner
                    .source
                    .read_number(address, item_size, is_unsigned, is_float)
                    .await
            }
        }
    }

    /// Reads `count` elements of `item_size` bytes starting at `address`,
    /// assembled in address order across however many pages the range
    /// spans.
    ///
    /// If any page of the range is declined, the whole request is served by
    /// one direct uncached read; there is never a mixed cached/uncached
    /// result. If any page resolves to an error, the first error in page
    /// order is reported and no partial array is produced.
    pub async fn read_array(
        &self,
        address: impl Into<Address>,
        item_size: usize,
        is_unsigned: bool,
        is_float: bool,
        count: usize,
    ) -> ReadResult<Vec<MemValue>> {
        let address = address.into();
        let Some(kind) = ElementKind::from_flags(item_size, is_unsigned, is_float) else {
            trace!(%address, item_size, count, "unsupported element kind, reading uncached");
            return self
                .inner
                .source
                .read_array(address, item_size, is_unsigned, is_float, count)
                .await;
        };
        if count == 0 {
            return Ok(Vec::new());
        }
        let span = (kind.size() as u64).checked_mul(count as u64);
        let Some(last_byte) = span.and_then(|span| address.as_u64().checked_add(span - 1)) else {
            // A range overflowing the address space cannot be paged.
            return self
                .inner
                .source
                .read_array(address, item_size, is_unsigned, is_float, count)
                .await;
        };
        let first_page = address.page_base().as_u64();
        let last_page = Address::new(last_byte).page_base().as_u64();

        // Admit every page before deciding: each admission records a touch
        // even when another page forces the whole read onto the uncached
        // path.
        let mut claims = Vec::with_capacity((last_page - first_page) as usize / PAGE_SIZE + 1);
        let mut declined = false;
        let mut page = first_page;
        loop {
            match self.admit(page) {
                Some(claim) => claims.push(claim),
                None => declined = true,
            }
            if page == last_page {
                break;
            }
            page += PAGE_SIZE as u64;
        }
        if declined {
            trace!(%address, count, "range not fully admitted, reading uncached");
            return self
                .inner
                .source
                .read_array(address, item_size, is_unsigned, is_float, count)
                .await;
        }

        let mut out = Vec::with_capacity(count);
        let mut start = address.page_offset() / kind.size();
        for claim in claims {
            let bytes = claim.resolve().await?;
            let view = TypedView::new(bytes, kind);
            let needed = count - out.len();
            out.extend(view.iter().skip(start).take(needed));
            start = 0;
        }
        Ok(out)
    }

    /// Admission decision for one page. `None` declines the cached path;
    /// the touch is still recorded for future decisions.
    fn admit(&self, page_base: u64) -> Option<PageClaim> {
        let mut store = self.inner.store.lock().unwrap();
        let entry = store.get_or_create(page_base);
        entry.hits = entry.hits.saturating_add(1);
        match &entry.state {
            PageState::Ready(bytes) => Some(PageClaim::Settled(Ok(Arc::clone(bytes)))),
            PageState::Failed(error) => Some(PageClaim::Settled(Err(error.clone()))),
            PageState::Pending(waiters) => {
                // Queue behind the in-flight fetch; no second fetch.
                let (tx, rx) = oneshot::channel();
                waiters.lock().unwrap().push(tx);
                Some(PageClaim::Queued(rx))
            }
            PageState::Cold => {
                if entry.hits < self.inner.config.trigger_threshold {
                    trace!(page = %Address::new(page_base), hits = entry.hits, "declined");
                    return None;
                }
                let waiters: SharedWaiters = Arc::new(Mutex::new(Vec::new()));
                let (tx, rx) = oneshot::channel();
                waiters.lock().unwrap().push(tx);
                entry.state = PageState::Pending(Arc::clone(&waiters));
                drop(store);
                self.spawn_fetch(page_base, waiters);
                Some(PageClaim::Queued(rx))
            }
        }
    }

    /// Issues the one full-page fetch for `page_base` as a detached task,
    /// so it runs to completion even if every requester goes away
    fn spawn_fetch(&self, page_base: u64, waiters: SharedWaiters) {
        debug!(page = %Address::new(page_base), "fetching page");
        let cache = self.clone();
        tokio::spawn(async move {
            let result = cache.fetch_page(page_base).await;
            cache.settle_page(page_base, waiters, result);
        });
    }

    /// One whole-page bulk read at the fixed retrieval granularity
    async fn fetch_page(&self, page_base: u64) -> ReadResult<PageBytes> {
        let values = self
            .inner
            .source
            .read_array(
                Address::new(page_base),
                FETCH_ITEM_SIZE,
                true,
                false,
                FETCH_ITEMS_PER_PAGE,
            )
            .await?;
        let mut buf = Vec::with_capacity(PAGE_SIZE);
        for value in &values {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        if buf.len() != PAGE_SIZE {
            return Err(ReadError::short_read(PAGE_SIZE, buf.len()));
        }
        Ok(PageBytes::from(buf))
    }

    /// Stores the terminal page state and notifies the queued waiters in
    /// enqueue order. If the store was invalidated while the fetch was in
    /// flight, the result is still delivered but not re-cached.
    fn settle_page(&self, page_base: u64, waiters: SharedWaiters, result: ReadResult<PageBytes>) {
        let mut store = self.inner.store.lock().unwrap();
        if let Some(entry) = store.get_mut(page_base) {
            if let PageState::Pending(current) = &entry.state {
                if Arc::ptr_eq(current, &waiters) {
                    entry.state = match &result {
                        Ok(bytes) => PageState::Ready(Arc::clone(bytes)),
                        Err(error) => PageState::Failed(error.clone()),
                    };
                }
            }
        }
        // Drain under the store lock so no waiter can slip in after the
        // terminal state becomes visible.
        let queued: Vec<_> = waiters.lock().unwrap().drain(..).collect();
        drop(store);

        if let Err(error) = &result {
            debug!(page = %Address::new(page_base), %error, waiters = queued.len(), "page fetch failed");
        }
        for tx in queued {
            // A waiter that gave up on receiving is fine to skip.
            let _ = tx.send(result.clone());
        }
    }

    async fn pointer_width(&self) -> ReadResult<usize> {
        if let Some(width) = *self.inner.pointer_width.lock().unwrap() {
            return Ok(width);
        }
        let width = self.inner.source.pointer_size().await?;
        *self.inner.pointer_width.lock().unwrap() = Some(width);
        debug!(width, "resolved pointer width");
        Ok(width)
    }
}
