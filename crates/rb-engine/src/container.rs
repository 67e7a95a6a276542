//! Pending in-memory containers and the registry that queues them.
//!
//! The capture side pushes containers as they are recorded; the conversion side
//! takes them one at a time. Both sides go through the same
//! [`ReentrantLock`], so an engine helper that already holds the lock (for
//! example while trimming the pool during capture) can call back into the
//! registry without deadlocking itself.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use rb_core::{ContainerId, ReentrantLock};

/// One raw frame buffer held by a pending container.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// Sensor timestamp in nanoseconds.
    pub timestamp_ns: i64,
    pub width: u32,
    pub height: u32,
    /// Raw sensor data as delivered by the capture pipeline.
    pub data: Vec<u8>,
}

/// An engine-owned set of buffers awaiting conversion.
#[derive(Debug, Clone)]
pub struct PendingContainer {
    id: ContainerId,
    /// Capture metadata (camera characteristics, exposure, etc.) as JSON.
    pub metadata: serde_json::Value,
    pub frames: Vec<RawFrame>,
}

impl PendingContainer {
    pub fn new(metadata: serde_json::Value, frames: Vec<RawFrame>) -> Self {
        Self {
            id: ContainerId::new(),
            metadata,
            frames,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total bytes of raw frame data held.
    pub fn byte_len(&self) -> usize {
        self.frames.iter().map(|f| f.data.len()).sum()
    }
}

/// FIFO of pending containers shared between capture and conversion.
#[derive(Debug)]
pub struct ContainerRegistry {
    pending: ReentrantLock<RefCell<VecDeque<PendingContainer>>>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self {
            pending: ReentrantLock::new("pending-containers", RefCell::new(VecDeque::new())),
        }
    }

    /// The process-wide registry used by the exported boundary functions.
    pub fn global() -> Arc<ContainerRegistry> {
        static GLOBAL: OnceLock<Arc<ContainerRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ContainerRegistry::new())))
    }

    /// Queue a container for conversion.
    pub fn push(&self, container: PendingContainer) -> ContainerId {
        let id = container.id();
        let guard = self.pending.lock();
        guard.borrow_mut().push_back(container);
        tracing::debug!(container = %id, pending = guard.borrow().len(), "Container queued");
        id
    }

    /// Take the oldest pending container, if any. Ownership moves to the
    /// caller.
    pub fn take(&self) -> Option<PendingContainer> {
        let guard = self.pending.lock();
        let container = guard.borrow_mut().pop_front();
        if let Some(ref c) = container {
            tracing::debug!(container = %c.id(), pending = guard.borrow().len(), "Container taken");
        }
        container
    }

    pub fn len(&self) -> usize {
        self.pending.lock().borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pending container and return how many were released.
    pub fn clear(&self) -> usize {
        let guard = self.pending.lock();
        let released = guard.borrow().len();
        guard.borrow_mut().clear();
        released
    }

    /// Run `f` while holding the registry lock.
    ///
    /// Calls to [`push`](Self::push), [`take`](Self::take) and friends made from
    /// inside `f` on the same thread re-enter the lock instead of blocking, and
    /// no other thread can observe the registry until `f` returns.
    pub fn with_locked<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let _guard = self.pending.lock();
        f(self)
    }
}

impl Default for ContainerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
