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

//! GTK4 user interface with MVC architecture
//!
//! # Architecture
//!
//! - **Model**: AccuracyTracker, Keymap, KeymapRenderer (in `core`, `keymap` and `stats` modules)
//! - **View**: GTK4 overlay window (in `overlay.rs`)
//! - **Controller**: Mediates between Model and View (in `controller.rs`)
//!
//! # Module Structure
//!
//! ```text
//! ui/
//! ├── mod.rs          // This file - exports
//! ├── app.rs          // GTK4 Application setup
//! ├── controller.rs   // MVC Controller
//! ├── overlay.rs      // Overlay window and event wiring
//! └── file_watcher.rs // Keymap file change detection
//! ```

pub mod app;
pub mod controller;
pub mod file_watcher;
pub mod overlay;

pub use {
    app::{App, Session},
    controller::{Controller, OverlayOptions, ViewCommand},
};

#[cfg(test)]
mod tests;
