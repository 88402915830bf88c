/// Signal - registered callbacks with RAII deregistration
///
/// Hosts use this to implement `HostWindow::connect_before_rendering` and
/// `connect_screen_changed`. Each `connect` returns a `SignalConnection`;
/// dropping it removes the slot, so a destroyed node can never be called.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use rustc_hash::FxHashMap;

/// Callback invoked on every emission
pub type Slot = Arc<dyn Fn() + Send + Sync>;

struct SignalInner {
    slots: Mutex<FxHashMap<u64, Slot>>,
    next_id: AtomicU64,
}

/// Multi-slot notification hub
#[derive(Clone)]
pub struct Signal {
    inner: Arc<SignalInner>,
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                slots: Mutex::new(FxHashMap::default()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register `slot`; it stays registered until the returned connection is dropped
    pub fn connect(&self, slot: Slot) -> SignalConnection {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut slots) = self.inner.slots.lock() {
            slots.insert(id, slot);
        }
        let weak: Weak<SignalInner> = Arc::downgrade(&self.inner);
        SignalConnection::new(move || {
            if let Some(inner) = weak.upgrade() {
                if let Ok(mut slots) = inner.slots.lock() {
                    slots.remove(&id);
                }
            }
        })
    }

    /// Call every connected slot once, in connection order
    ///
    /// Slots run outside the internal lock, so a slot may connect or
    /// disconnect without deadlocking.
    pub fn emit(&self) {
        let mut slots: Vec<(u64, Slot)> = match self.inner.slots.lock() {
            Ok(slots) => slots.iter().map(|(id, slot)| (*id, slot.clone())).collect(),
            Err(_) => return,
        };
        slots.sort_by_key(|(id, _)| *id);
        for (_, slot) in slots {
            slot();
        }
    }

    pub fn slot_count(&self) -> usize {
        self.inner.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }
}

/// Handle to a connected slot; disconnects on drop
pub struct SignalConnection {
    disconnect: Option<Box<dyn FnOnce() + Send>>,
}

impl SignalConnection {
    /// Connection whose teardown runs `disconnect`
    pub fn new<F: FnOnce() + Send + 'static>(disconnect: F) -> Self {
        Self {
            disconnect: Some(Box::new(disconnect)),
        }
    }

    /// Connection to nothing (host has no such signal)
    pub fn empty() -> Self {
        Self { disconnect: None }
    }

    /// Disconnect now instead of on drop
    pub fn disconnect(mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl Drop for SignalConnection {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
