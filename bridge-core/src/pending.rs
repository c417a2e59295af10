//! Pending Operation Slots
//!
//! A single-slot holder for one suspended caller per operation kind. The
//! native delegate parks on the receiver half of a one-shot channel while the
//! host fulfils the request; answering completes the channel exactly once.
//!
//! Invariants:
//! - At most one pending operation per kind. Starting a new one resolves the
//!   stale one first; nothing is discarded unresolved.
//! - The slot is cleared before the suspended caller is resumed, so a
//!   re-entrant or duplicate resume takes the absent-slot no-op branch.
//! - Host-driven cancellation of the suspended caller clears the slot as a
//!   side effect (via [`SlotGuard`]) without clobbering a successor
//!   operation.

use std::sync::Mutex;
use tokio::sync::oneshot;

struct SlotEntry<T> {
    tx: oneshot::Sender<T>,
    generation: u64,
}

struct SlotState<T> {
    entry: Option<SlotEntry<T>>,
    next_generation: u64,
}

pub struct PendingSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T: Send> PendingSlot<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                entry: None,
                next_generation: 0,
            }),
        }
    }

    /// Install a new pending operation.
    ///
    /// An existing operation is resolved with `preempt_with` before the new
    /// sender is installed, so two live operations of the same kind never
    /// coexist. Returns the receiver the caller suspends on and the
    /// generation identifying this operation.
    pub fn begin(&self, preempt_with: T) -> (oneshot::Receiver<T>, u64) {
        let mut state = self.lock_state();
        if let Some(stale) = state.entry.take() {
            // Receiver may already be gone; the stale caller was cancelled.
            let _ = stale.tx.send(preempt_with);
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        let (tx, rx) = oneshot::channel();
        state.entry = Some(SlotEntry { tx, generation });
        (rx, generation)
    }

    /// Answer the pending operation, if any.
    ///
    /// The slot is cleared before the caller is resumed. Returns `false`
    /// when no operation was pending (late or duplicate resume).
    pub fn complete(&self, value: T) -> bool {
        let entry = {
            let mut state = self.lock_state();
            state.entry.take()
        };
        match entry {
            Some(entry) => {
                let _ = entry.tx.send(value);
                true
            }
            None => false,
        }
    }

    /// Clear the slot if it still holds the operation identified by
    /// `generation`. Used for cancellation cleanup; a successor operation's
    /// entry is left untouched.
    pub fn clear_if_current(&self, generation: u64) {
        let mut state = self.lock_state();
        if state
            .entry
            .as_ref()
            .is_some_and(|entry| entry.generation == generation)
        {
            state.entry = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_state().entry.is_some()
    }

    /// Cleanup guard for the operation identified by `generation`.
    pub fn guard(&self, generation: u64) -> SlotGuard<'_, T> {
        SlotGuard {
            slot: self,
            generation,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Send> Default for PendingSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the owning slot on drop unless a newer operation replaced it.
///
/// Held across the suspension point so that host-runtime cancellation of the
/// suspended caller cleans the slot up symmetrically with a normal resume.
pub struct SlotGuard<'a, T: Send> {
    slot: &'a PendingSlot<T>,
    generation: u64,
}

impl<T: Send> Drop for SlotGuard<'_, T> {
    fn drop(&mut self) {
        self.slot.clear_if_current(self.generation);
    }
}
