use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::trace;

/// Type-erased listener stored by the [`EventBus`].
pub type Listener = Arc<dyn Fn(&dyn Any) + Send + Sync>;

/// Identifies one registration on an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Untyped publish/subscribe bus keyed by event name.
///
/// Payloads travel as `&dyn Any`; the bus never checks that a listener and an
/// emitter agree on the payload type. [`TypedEvents`](crate::TypedEvents)
/// layers the compile-time contract on top.
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<HashMap<&'static str, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `name`. Listeners run in registration order.
    pub fn on(&self, name: &'static str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().entry(name).or_default().push((id, listener));
        trace!(event = name, listener = id.0, "Listener registered");
        id
    }

    /// Removes a registration. Returns `false` if it was not registered.
    pub fn off(&self, name: &'static str, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(registered) = listeners.get_mut(name) else {
            return false;
        };

        let before = registered.len();
        registered.retain(|(existing, _)| *existing != id);
        let removed = registered.len() != before;

        if registered.is_empty() {
            listeners.remove(name);
        }

        removed
    }

    /// Invokes every listener registered for `name` with `payload`.
    ///
    /// The listener list is snapshotted before dispatch, so listeners may
    /// subscribe or unsubscribe re-entrantly. Panics raised by a listener
    /// propagate to the caller and skip the remaining listeners.
    pub fn trigger(&self, name: &'static str, payload: &dyn Any) {
        let snapshot: Vec<Listener> = match self.lock().get(name) {
            Some(registered) => registered
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect(),
            None => return,
        };

        for listener in snapshot {
            listener(payload);
        }
    }

    /// Number of listeners currently registered for `name`.
    pub fn listener_count(&self, name: &'static str) -> usize {
        self.lock().get(name).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, Vec<(ListenerId, Listener)>>> {
        // Listeners never run under this lock.
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        let mut names: Vec<_> = listeners
            .iter()
            .map(|(name, registered)| (*name, registered.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("EventBus").field("listeners", &names).finish()
    }
}
