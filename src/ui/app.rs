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

//! GTK4 Application wrapper
//!
//! This module sets up the GTK4 application lifecycle and creates
//! the overlay window. It uses the Controller for all non-widget state.
//!
//! # Architecture
//!
//! ```text
//! App (GTK4 Application)
//!   ├─ Holds Controller
//!   ├─ Builds overlay window on activate
//!   └─ Hands event channels to the overlay
//! ```

use gtk4::prelude::*;
use gtk4::{gdk, Application, CssProvider};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::Receiver;

use crate::core::KeyEvent;
use crate::input::KeyboardMonitor;
use crate::ui::{overlay, Controller};
use crate::zmk::{LayerSource, StatusAdvertisement};

/// Runtime channels the overlay consumes.
///
/// Owned by value because receivers are not `Clone`; the GTK activate
/// handler takes them out of an `Rc<RefCell<Option<_>>>` exactly once.
pub struct Session {
    /// Key presses and releases from the evdev monitor.
    pub key_events: Receiver<KeyEvent>,
    /// The monitor itself, stopped when the window closes.
    pub monitor: KeyboardMonitor,
    /// Layer changes from the keyboard, if a source is running.
    pub layer_events: Option<Receiver<StatusAdvertisement>>,
    /// The producer behind `layer_events`, stopped on close.
    pub layer_source: Option<Box<dyn LayerSource>>,
}

/// GTK4 Application for the keymap overlay
pub struct App {
    /// GTK4 Application instance
    app: Application,
    /// MVC Controller
    controller: Rc<Controller>,
}

impl App {
    /// Creates a new App wrapping an existing Controller
    pub fn new(controller: Controller) -> Self {
        let app = Application::builder()
            .application_id("org.zmkoverlay.Overlay")
            .build();

        Self {
            app,
            controller: Rc::new(controller),
        }
    }

    /// Runs the GTK4 main loop until the overlay exits.
    ///
    /// Blocks the calling thread. The `Session` channels are moved
    /// into the window when GTK activates.
    pub fn run(self, session: Session) {
        let controller = self.controller.clone();
        let session = Rc::new(RefCell::new(Some(session)));

        self.app.connect_activate(move |app| {
            Self::load_css();
            // activate fires once for this application id
            if let Some(session) = session.borrow_mut().take() {
                overlay::build(app, controller.clone(), session);
            }
        });

        // Empty argv so GTK doesn't consume our CLI flags
        self.app.run_with_args::<&str>(&[]);
    }

    /// Loads custom CSS styling for the application
    ///
    /// Applies the CSS from `style.css` to the default display
    /// at APPLICATION priority level.
    fn load_css() {
        let provider = CssProvider::new();
        let css = include_str!("style.css");
        provider.load_from_string(css);

        gtk4::style_context_add_provider_for_display(
            &gdk::Display::default().expect("Could not connect to a display"),
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
