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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the fundamental data structures and algorithms for
//! keypress tracking:
//! - Type definitions for key labels and events
//! - The pending-key accuracy classifier
//!
//! Business logic is isolated from UI and I/O concerns so it can be unit
//! tested without a display server or input devices.

pub mod tracker;
pub mod types;

pub use tracker::AccuracyTracker;
pub use types::*;

#[cfg(test)]
mod tests;
