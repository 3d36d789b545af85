//! src/core/types.rs
//!
//! Core type definitions for key tracking
//!
//! This module defines the fundamental types used throughout the application:
//! - `KeyLabel`: A normalized key identifier matching keymap-drawer legends
//! - `KeyState`: Press/release direction of an input event
//! - `KeyEvent`: A normalized event as produced by the input monitor
//!
//! Labels are normalized (lowercased, trimmed) on construction so the same
//! key hashes identically whether it arrives from evdev ("LEFTSHIFT"), an
//! SVG legend ("Shift") or the stats file ("shift").

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized key identifier.
///
/// Wraps the label string keymap-drawer prints on the key (e.g. "a",
/// "Shift", "Bckspc"), lowercased for consistent hashing. Used as the
/// stats-file key and for matching key groups in rendered SVGs.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct KeyLabel(String);

impl KeyLabel {
    /// Create a new KeyLabel, trimming whitespace and lowercasing.
    pub fn new(label: &str) -> Self {
        Self(label.trim().to_lowercase())
    }

    /// The normalized label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key corrects previous input.
    ///
    /// A correction key pressed while another key is pending marks that
    /// key incorrect. Covers the labels the input backends produce for
    /// backspace and delete.
    pub fn is_correction(&self) -> bool {
        matches!(self.0.as_str(), "backspace" | "bckspc" | "delete")
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KeyLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Direction of a key event.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyState {
    /// Key went down.
    Pressed,
    /// Key went up.
    Released,
}

/// A normalized key event as produced by the input monitor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyEvent {
    /// Which key, normalized.
    pub label: KeyLabel,
    /// Press or release.
    pub state: KeyState,
}

impl KeyEvent {
    /// Convenience constructor used throughout the tests.
    pub fn new(label: &str, state: KeyState) -> Self {
        Self {
            label: KeyLabel::new(label),
            state,
        }
    }
}
