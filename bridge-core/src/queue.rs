//! Bounded Event Buffer
//!
//! Holds outbound events while no live module is registered. Bounded by
//! capacity with FIFO eviction, and entries past the expiration age are
//! dropped at flush time rather than delivered late.

use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::warn;

/// Capacity and expiration policy for the event queue.
#[derive(Debug, Clone, Copy)]
pub struct QueuePolicy {
    /// Maximum number of buffered events; insertion at capacity evicts the
    /// oldest entry.
    pub capacity: usize,
    /// Entries older than this at flush time are dropped undelivered.
    pub max_age: Duration,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_age: Duration::from_secs(10),
        }
    }
}

/// A buffered outbound event.
#[derive(Debug, Clone)]
pub(crate) struct QueuedEvent {
    pub name: String,
    pub payload: Value,
    pub enqueued_at_ms: i64,
}

impl QueuedEvent {
    pub fn is_expired(&self, policy: &QueuePolicy, now_ms: i64) -> bool {
        now_ms.saturating_sub(self.enqueued_at_ms) > policy.max_age.as_millis() as i64
    }
}

#[derive(Debug)]
pub(crate) struct EventQueue {
    entries: VecDeque<QueuedEvent>,
    policy: QueuePolicy,
}

impl EventQueue {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            entries: VecDeque::with_capacity(policy.capacity),
            policy,
        }
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.policy
    }

    /// Insert an event, evicting the oldest entry at capacity. Never fails.
    pub fn push(&mut self, name: &str, payload: Value, now_ms: i64) {
        if self.entries.len() >= self.policy.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                warn!(event = %evicted.name, "Event queue full; evicting oldest entry");
            }
        }
        self.entries.push_back(QueuedEvent {
            name: name.to_string(),
            payload,
            enqueued_at_ms: now_ms,
        });
    }

    /// Remove and return all buffered events in FIFO order.
    pub fn drain(&mut self) -> VecDeque<QueuedEvent> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
