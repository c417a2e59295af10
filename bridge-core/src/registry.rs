//! Module Registration and Safe Event Delivery
//!
//! The host runtime can tear down and recreate its bridge module instance at
//! arbitrary times (hot reload, backgrounding). The registry tracks the
//! instance currently considered live, delivers outbound events to it on a
//! best-effort basis, and buffers events that could not be delivered so that
//! purchase/restore requests are not silently dropped while no module is
//! live.

use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace, warn};

use bridge_types::{Clock, EventSink, SystemClock};

use crate::queue::{EventQueue, QueuePolicy};

struct RegistryState {
    current: Option<Arc<dyn EventSink>>,
    queue: EventQueue,
}

/// Process-wide shared delivery state, explicitly constructed and injected
/// into whichever component wires the bridge together.
pub struct ModuleRegistry {
    state: Mutex<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl ModuleRegistry {
    pub fn new(policy: QueuePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: QueuePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                current: None,
                queue: EventQueue::new(policy),
            }),
            clock,
        }
    }

    /// Mark a module instance as the live delivery target. Last write wins;
    /// called on every lifecycle hook and every public entry point.
    pub fn register(&self, sink: Arc<dyn EventSink>) {
        let mut state = self.lock_state();
        state.current = Some(sink);
    }

    /// Whether any module is currently registered.
    pub fn has_module(&self) -> bool {
        self.lock_state().current.is_some()
    }

    /// Number of events currently buffered.
    pub fn queued_len(&self) -> usize {
        self.lock_state().queue.len()
    }

    /// Best-effort delivery: try the current module, then `backup` if it is
    /// a different instance, then buffer the event. Never errors.
    ///
    /// Purchase/restore requests must eventually reach the host or the
    /// suspended native caller hangs; buffering is the mitigation when no
    /// delivery target works.
    pub fn safe_send(&self, name: &str, payload: Value, backup: Option<&Arc<dyn EventSink>>) {
        let current = self.lock_state().current.clone();

        // Delivery happens outside the state lock: a synchronous sink may
        // re-enter the registry through a bridge entry point.
        if let Some(sink) = &current {
            match sink.send_event(name, payload.clone()) {
                Ok(()) => return,
                Err(err) => {
                    debug!(event = name, error = %err, "Delivery to current module failed");
                }
            }
        }

        if let Some(backup_sink) = backup {
            let differs = current
                .as_ref()
                .map_or(true, |sink| !Arc::ptr_eq(sink, backup_sink));
            if differs {
                match backup_sink.send_event(name, payload.clone()) {
                    Ok(()) => return,
                    Err(err) => {
                        debug!(event = name, error = %err, "Delivery to backup module failed");
                    }
                }
            }
        }

        let now_ms = self.clock.unix_timestamp_millis();
        let mut state = self.lock_state();
        state.queue.push(name, payload, now_ms);
        debug!(event = name, queued = state.queue.len(), "Buffered event for later delivery");
    }

    /// Delivery path for high-volume event classes (log lines): try the
    /// current module and drop on failure, never buffering, so telemetry
    /// cannot evict queued purchase/restore requests.
    pub fn send_or_drop(&self, name: &str, payload: Value) {
        let current = self.lock_state().current.clone();
        match current {
            Some(sink) => {
                if let Err(err) = sink.send_event(name, payload) {
                    trace!(event = name, error = %err, "Dropped undeliverable event");
                }
            }
            None => trace!(event = name, "Dropped event; no live module"),
        }
    }

    /// Drain buffered events to a newly available module in FIFO order.
    ///
    /// Expired entries are dropped. Entries whose delivery fails are dropped
    /// rather than re-queued; a flush is already the last-resort attempt and
    /// re-queueing against a permanently broken target would defeat the
    /// queue's bounded-memory purpose.
    pub fn flush(&self, sink: &Arc<dyn EventSink>) {
        let (drained, policy) = {
            let mut state = self.lock_state();
            let policy = *state.queue.policy();
            (state.queue.drain(), policy)
        };
        if drained.is_empty() {
            return;
        }

        let now_ms = self.clock.unix_timestamp_millis();
        for entry in drained {
            if entry.is_expired(&policy, now_ms) {
                warn!(event = %entry.name, "Dropping expired queued event");
                continue;
            }
            if let Err(err) = sink.send_event(&entry.name, entry.payload) {
                warn!(event = %entry.name, error = %err, "Dropping queued event after failed flush delivery");
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RegistryState> {
        // A poisoned registry lock only ever means a panic mid-mutation of
        // plain data; continuing with that data is safe.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
