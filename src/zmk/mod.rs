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

//! ZMK keyboard status protocol.
//!
//! Types for the Prospector status advertisement format and sources
//! that deliver layer changes to the overlay.

pub mod advertisement;
pub mod scanner;

pub use advertisement::{
    DeviceRole, ModifierFlags, StatusAdvertisement, StatusFlags, MANUFACTURER_ID, PAYLOAD_LEN,
    SERVICE_UUID,
};
pub use scanner::{LayerSource, SimScanner};
