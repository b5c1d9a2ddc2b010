/*!
 * Completion Listener Registry
 * Ordered, slot-addressed callbacks fired once when a process completes
 */

use log::{debug, trace};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Listener slot identifier, unique within one registry
pub type ListenerId = u64;

/// Completion callback
///
/// Runs on the tick thread inside `Process::work`, so it must not block.
pub type CompletionFn = Box<dyn FnOnce() + Send + 'static>;

/// Registry of completion callbacks
///
/// Listeners are kept in registration order. Firing drains the registry, so
/// every listener runs at most once and later removals are no-ops.
pub struct CompletionListeners {
    slots: Mutex<Vec<(ListenerId, CompletionFn)>>,
    next_id: AtomicU64,
}

impl CompletionListeners {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new listener, returning its slot id
    pub fn register<F>(&self, listener: F) -> ListenerId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().push((id, Box::new(listener)));
        trace!("Registered completion listener {}", id);
        id
    }

    /// Unregister a listener
    ///
    /// Returns false for unknown, already removed, or already fired slots.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.lock();
        match slots.iter().position(|(slot, _)| *slot == id) {
            Some(pos) => {
                slots.remove(pos);
                trace!("Unregistered completion listener {}", id);
                true
            }
            None => false,
        }
    }

    /// Number of listeners still waiting to fire
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered listener in registration order
    ///
    /// The list is taken out of the lock before any callback runs, so a
    /// callback may touch the registry (or the owning process) freely.
    pub(crate) fn fire(&self) -> usize {
        let snapshot = std::mem::take(&mut *self.slots.lock());
        let count = snapshot.len();
        for (id, listener) in snapshot {
            debug!("Firing completion listener {}", id);
            listener();
        }
        count
    }
}

impl Default for CompletionListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompletionListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionListeners")
            .field("registered", &self.len())
            .finish()
    }
}
