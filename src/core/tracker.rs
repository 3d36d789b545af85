//! Pending-key accuracy state machine.
//!
//! Classifies raw key-down events into correct/incorrect keypresses:
//! a keypress counts as correct when the next key is anything other than
//! backspace, and incorrect when the user backspaces over it.
//!
//! The classifier has two states, Idle and Pending(key):
//!
//! - non-correction key K: a pending key (if any) is marked correct,
//!   then K becomes pending
//! - correction key while Pending(J): J is marked incorrect, back to Idle
//! - correction key while Idle: no-op
//!
//! Consecutive corrections therefore blame only the single most recently
//! pending key, not a chain. The tool guesses one causal key per
//! correction rather than attempting edit-distance attribution; this is a
//! heuristic, not a guaranteed-correct error model.

use std::collections::HashSet;

use tracing::debug;

use crate::core::types::KeyLabel;
use crate::stats::{StatsError, StatsStore};

/// Tracks keypress accuracy to help users learn touch typing.
pub struct AccuracyTracker {
    store: StatsStore,
    /// Most recent keypress awaiting classification by the next event.
    pending: Option<KeyLabel>,
    /// Whether any classification happened since the last flush.
    dirty: bool,
}

impl AccuracyTracker {
    /// Wraps a stats store with the pending-key classifier.
    pub fn new(store: StatsStore) -> Self {
        Self {
            store,
            pending: None,
            dirty: false,
        }
    }

    /// Feed one key-down event.
    ///
    /// Correction keys classify the pending key but are never tracked as
    /// learning keys themselves.
    pub fn on_key_press(&mut self, key: &KeyLabel) {
        if key.is_correction() {
            if let Some(pending) = self.pending.take() {
                let stat = self.store.record(&pending, false);
                debug!(
                    "Key '{pending}' marked incorrect ({}/{} correct)",
                    stat.correct, stat.attempts
                );
                self.dirty = true;
            }
            return;
        }

        if let Some(pending) = self.pending.take() {
            let stat = self.store.record(&pending, true);
            debug!(
                "Key '{pending}' marked correct ({}/{} correct)",
                stat.correct, stat.attempts
            );
            self.dirty = true;
        }

        self.pending = Some(key.clone());
    }

    /// Whether `key` has crossed the mastery threshold.
    pub fn is_learned(&self, key: &KeyLabel) -> bool {
        self.store.is_learned(key)
    }

    /// All keys currently past the mastery threshold.
    pub fn learned_keys(&self) -> HashSet<KeyLabel> {
        self.store.learned_keys()
    }

    /// Read access to the underlying counters.
    pub fn store(&self) -> &StatsStore {
        &self.store
    }

    /// Persists the store if anything changed since the last flush.
    pub fn flush(&mut self) -> Result<(), StatsError> {
        if self.dirty {
            self.store.save()?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Human-readable progress line.
    pub fn summary(&self) -> String {
        self.store.summary()
    }
}
