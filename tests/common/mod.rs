//! Shared scripted remote source for the integration tests

#![allow(dead_code)]

use memory_pagecache::{
    Address, ElementKind, ExecutionStateEvents, MemValue, ReadError, ReadResult,
    RemoteMemorySource,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;

/// One observed call against the scripted source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Array {
        address: u64,
        item_size: usize,
        count: usize,
    },
    Number {
        address: u64,
        item_size: usize,
    },
    PointerSize,
}

/// Deterministic fake debuggee memory with a call log.
///
/// The byte at `addr` is a function of the address and the current salt,
/// so invalidation tests can "change memory" between generations. Gated
/// sources additionally hold every array read until the test releases it,
/// which makes coalescing windows observable.
pub struct ScriptedSource {
    calls: Mutex<Vec<Call>>,
    salt: AtomicU8,
    pointer_width: usize,
    failing: Mutex<HashSet<u64>>,
    gate: Option<FetchGate>,
}

struct FetchGate {
    started: UnboundedSender<u64>,
    permits: Arc<Semaphore>,
}

/// Test-side handle observing and releasing gated fetches
pub struct GateControl {
    started: UnboundedReceiver<u64>,
    permits: Arc<Semaphore>,
}

impl GateControl {
    /// Waits until the source has received an array read, returning its
    /// start address
    pub async fn fetch_started(&mut self) -> u64 {
        self.started.recv().await.expect("source dropped")
    }

    /// Lets `n` held reads proceed
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }
}

pub fn byte_with_salt(addr: u64, salt: u8) -> u8 {
    ((addr % 251) as u8).wrapping_add(salt)
}

/// Installs a subscriber once so `RUST_LOG=debug cargo test` shows cache
/// activity
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl ScriptedSource {
    pub fn new() -> Self {
        ScriptedSource {
            calls: Mutex::new(Vec::new()),
            salt: AtomicU8::new(0),
            pointer_width: 8,
            failing: Mutex::new(HashSet::new()),
            gate: None,
        }
    }

    /// A source whose array reads block until released through the control
    pub fn gated() -> (Self, GateControl) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let permits = Arc::new(Semaphore::new(0));
        let source = ScriptedSource {
            gate: Some(FetchGate {
                started: started_tx,
                permits: Arc::clone(&permits),
            }),
            ..ScriptedSource::new()
        };
        let control = GateControl {
            started: started_rx,
            permits,
        };
        (source, control)
    }

    pub fn with_pointer_width(mut self, width: usize) -> Self {
        self.pointer_width = width;
        self
    }

    /// Array reads starting exactly at `address` will fail
    pub fn fail_reads_at(&self, address: u64) {
        self.failing.lock().unwrap().insert(address);
    }

    /// Changes the backing bytes, as if the debuggee ran in between
    pub fn set_salt(&self, salt: u8) {
        self.salt.store(salt, Ordering::SeqCst);
    }

    pub fn byte_at(&self, addr: u64) -> u8 {
        byte_with_salt(addr, self.salt.load(Ordering::SeqCst))
    }

    /// The value a read of `kind` at `addr` should produce
    pub fn value_at(&self, kind: ElementKind, addr: u64) -> MemValue {
        let bytes: Vec<u8> = (0..kind.size() as u64).map(|i| self.byte_at(addr + i)).collect();
        MemValue::from_le_bytes(kind, &bytes).expect("chunk is kind-sized")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn array_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Array { .. }))
            .count()
    }

    pub fn number_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Number { .. }))
            .count()
    }

    pub fn pointer_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::PointerSize))
            .count()
    }
}

impl RemoteMemorySource for ScriptedSource {
    async fn read_array(
        &self,
        address: Address,
        item_size: usize,
        is_unsigned: bool,
        is_float: bool,
        count: usize,
    ) -> ReadResult<Vec<MemValue>> {
        self.calls.lock().unwrap().push(Call::Array {
            address: address.as_u64(),
            item_size,
            count,
        });
        if let Some(gate) = &self.gate {
            let _ = gate.started.send(address.as_u64());
            let permit = gate
                .permits
                .acquire()
                .await
                .map_err(|_| ReadError::remote("gate closed"))?;
            permit.forget();
        }
        if self.failing.lock().unwrap().contains(&address.as_u64()) {
            return Err(ReadError::remote(format!(
                "scripted read failure at 0x{:x}",
                address.as_u64()
            )));
        }
        let Some(kind) = ElementKind::from_flags(item_size, is_unsigned, is_float) else {
            return Err(ReadError::remote(format!(
                "unsupported element size {item_size}"
            )));
        };
        Ok((0..count)
            .map(|i| self.value_at(kind, address.as_u64() + (i * item_size) as u64))
            .collect())
    }

    async fn read_number(
        &self,
        address: Address,
        item_size: usize,
        is_unsigned: bool,
        is_float: bool,
    ) -> ReadResult<MemValue> {
        self.calls.lock().unwrap().push(Call::Number {
            address: address.as_u64(),
            item_size,
        });
        if self.failing.lock().unwrap().contains(&address.as_u64()) {
            return Err(ReadError::remote(format!(
                "scripted read failure at 0x{:x}",
                address.as_u64()
            )));
        }
        let Some(kind) = ElementKind::from_flags(item_size, is_unsigned, is_float) else {
            return Err(ReadError::remote(format!(
                "unsupported element size {item_size}"
            )));
        };
        Ok(self.value_at(kind, address.as_u64()))
    }

    async fn pointer_size(&self) -> ReadResult<usize> {
        self.calls.lock().unwrap().push(Call::PointerSize);
        Ok(self.pointer_width)
    }
}

/// Minimal execution-state event hub firing registered handlers in order
#[derive(Default)]
pub struct DebugEventHub {
    handlers: Mutex<Vec<Box<dyn Fn() + Send + Sync>>>,
}

impl DebugEventHub {
    pub fn new() -> Self {
        DebugEventHub::default()
    }

    /// Simulates one execution-state transition
    pub fn fire(&self) {
        for handler in self.handlers.lock().unwrap().iter() {
            handler();
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }
}

impl ExecutionStateEvents for DebugEventHub {
    fn on_execution_state_change(&self, handler: Box<dyn Fn() + Send + Sync + 'static>) {
        self.handlers.lock().unwrap().push(handler);
    }
}
