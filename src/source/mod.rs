//! External collaborator seams: the remote read primitive and the
//! execution-state change hook

use crate::core::types::{Address, MemValue, ReadResult};
use std::future::Future;

/// Asynchronous byte-range read primitive into the debuggee's memory.
///
/// Failures are reported through the opaque [`ReadError::Remote`] payload;
/// the cache stores and forwards it without inspecting or classifying it.
/// Values travel in little-endian byte order.
///
/// [`ReadError::Remote`]: crate::core::types::ReadError::Remote
pub trait RemoteMemorySource: Send + Sync + 'static {
    /// Reads `count` elements of `item_size` bytes starting at `address`
    fn read_array(
        &self,
        address: Address,
        item_size: usize,
        is_unsigned: bool,
        is_float: bool,
        count: usize,
    ) -> impl Future<Output = ReadResult<Vec<MemValue>>> + Send;

    /// Reads a single `item_size`-byte value at `address`
    fn read_number(
        &self,
        address: Address,
        item_size: usize,
        is_unsigned: bool,
        is_float: bool,
    ) -> impl Future<Output = ReadResult<MemValue>> + Send;

    /// Reports the debuggee's pointer width in bytes
    fn pointer_size(&self) -> impl Future<Output = ReadResult<usize>> + Send;
}

/// Source of debuggee execution-state transitions (resume/stop/detach).
///
/// The cache registers exactly one handler, which discards every cached
/// page; nothing else listens here.
pub trait ExecutionStateEvents {
    /// Registers a handler invoked on every execution-state transition
    fn on_execution_state_change(&self, handler: Box<dyn Fn() + Send + Sync + 'static>);
}
