// Copyright 2026 zmk-overlay contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! ZMK Overlay
//!
//! A live keymap overlay for ZMK keyboards with per-key
//! typing-accuracy tracking and a GTK4 display.
//!
//! # Features
//!
//! - **Accuracy Tracking:** A press followed by a backspace marks the
//!   key incorrect, another key marks it correct
//! - **Learned Keys:** Keys you type reliably fade out of the overlay
//! - **Live Rendering:** Layers drawn by the external keymap-drawer
//!   tool, held keys highlighted in real time
//! - **Layer Following:** Layer changes arrive over the ZMK status
//!   advertisement protocol
//! - **Atomic Persistence:** Key statistics saved safely as JSON
//!
//! # Architecture
//!
//! - **`core`:** Key event types and the accuracy tracker
//! - **`stats`:** Per-key statistics and their JSON store
//! - **`input`:** Keyboard capture via evdev
//! - **`keymap`:** Keymap YAML loading, rendering, SVG decoration
//! - **`zmk`:** ZMK status advertisement protocol
//! - **`ui`:** GTK4 overlay window (MVC pattern)
//!
//! # Examples
//!
//! ## Tracking accuracy
//!
//! ```no_run
//! use zmk_overlay::core::{AccuracyTracker, KeyLabel};
//! use zmk_overlay::stats::StatsStore;
//!
//! let store = StatsStore::load(StatsStore::default_path()?);
//! let mut tracker = AccuracyTracker::new(store);
//!
//! tracker.on_key_press(&KeyLabel::new("a"));
//! tracker.on_key_press(&KeyLabel::new("backspace"));  // "a" was a miss
//! tracker.flush()?;
//! # Ok::<(), zmk_overlay::stats::StatsError>(())
//! ```
//!
//! ## Parsing a status advertisement
//!
//! ```
//! use zmk_overlay::zmk::StatusAdvertisement;
//!
//! # let payload = [0xFF, 0xFF, 0xAB, 0xCD, 1, 90, 2, 0, 1, 0, 0, 0, 0,
//! #                0, 0, b'N', b'a', b'v', 0, 0, 0, 0, 0, 0, 40, 0];
//! if let Some(adv) = StatusAdvertisement::parse(&payload) {
//!     println!("layer {} ({})", adv.active_layer, adv.layer_name);
//! }
//! ```

pub mod core;
pub mod input;
pub mod keymap;
pub mod stats;
pub mod ui;
pub mod zmk;

pub use crate::core::{AccuracyTracker, KeyEvent, KeyLabel, KeyState};
pub use crate::stats::{StatsError, StatsStore};
