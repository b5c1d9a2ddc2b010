/*!
 * Simulation Lifecycle Events
 * Publish/subscribe for run start and finish
 */

use crate::core::types::Tick;
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Event kinds listeners subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    Finished,
}

/// Lifecycle event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// Fired once, before tick 0
    Started {
        run_id: Uuid,
        processes: usize,
        processors: usize,
    },
    /// Fired once, after the last process completes
    Finished { run_id: Uuid, elapsed: Tick },
}

impl SchedulerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SchedulerEvent::Started { .. } => EventKind::Started,
            SchedulerEvent::Finished { .. } => EventKind::Finished,
        }
    }
}

/// Subscription handle
pub type SubscriptionId = u64;

/// Event listener callback
pub type EventListener = Arc<dyn Fn(&SchedulerEvent) + Send + Sync>;

/// Ordered event bus
///
/// Listeners of a kind run synchronously, in registration order, at the
/// firing point. Emission works on a snapshot, so listeners may subscribe
/// or unsubscribe from inside a callback.
pub struct EventBus {
    listeners: RwLock<Vec<(SubscriptionId, EventKind, EventListener)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to one event kind
    pub fn subscribe<F>(&self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: Fn(&SchedulerEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, kind, Arc::new(listener)));
        debug!("Subscribed listener {} to {:?}", id, kind);
        id
    }

    /// Remove a subscription; unknown ids are ignored
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(sub, _, _)| *sub != id);
        before != listeners.len()
    }

    /// Invoke every listener subscribed to the event's kind
    pub fn emit(&self, event: &SchedulerEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<EventListener> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, listener)| Arc::clone(listener))
            .collect();

        info!("Emitting {:?} to {} listener(s)", kind, snapshot.len());
        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("started", &self.listener_count(EventKind::Started))
            .field("finished", &self.listener_count(EventKind::Finished))
            .finish()
    }
}
