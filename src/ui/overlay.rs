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

//! Overlay window construction
//!
//! Builds the undecorated always-available overlay window and wires
//! the event channels into the GTK main loop via polling timers.
//! Receivers from the input threads cannot be awaited on the GTK
//! thread, so short `timeout_add_local` ticks drain them instead.

use gtk4::prelude::*;
use gtk4::{gdk, glib, Application, ApplicationWindow, Picture, WindowHandle};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{info, warn};

use crate::ui::app::Session;
use crate::ui::file_watcher::FileWatcher;
use crate::ui::{Controller, ViewCommand};

/// How long the overlay stays visible after the last key release.
const HIDE_DELAY: Duration = Duration::from_millis(2500);

/// Key event drain interval. Short enough to feel immediate.
const INPUT_TICK: Duration = Duration::from_millis(16);

/// Layer update drain interval.
const LAYER_TICK: Duration = Duration::from_millis(200);

/// Keymap file watcher poll interval.
const WATCH_TICK: Duration = Duration::from_millis(500);

/// Periodic stats save interval.
const FLUSH_TICK: Duration = Duration::from_secs(30);

/// Builds the overlay window and starts all polling timers.
pub fn build(app: &Application, controller: Rc<Controller>, session: Session) {
    let picture = Picture::new();
    picture.set_can_shrink(true);

    // WindowHandle makes the whole undecorated window draggable.
    let handle = WindowHandle::builder().child(&picture).build();

    let window = ApplicationWindow::builder()
        .application(app)
        .title("ZMK Overlay")
        .default_width(600)
        .default_height(400)
        .decorated(false)
        .build();
    window.set_child(Some(&handle));

    // Repaint closure shared by every timer that changes what's shown.
    let repaint: Rc<dyn Fn()> = {
        let controller = controller.clone();
        let picture = picture.clone();
        Rc::new(move || match controller.current_svg() {
            Ok(svg) => {
                let bytes = glib::Bytes::from_owned(svg.into_bytes());
                match gdk::Texture::from_bytes(&bytes) {
                    Ok(texture) => picture.set_paintable(Some(&texture)),
                    Err(e) => warn!("failed to decode rendered SVG: {e}"),
                }
            }
            Err(e) => warn!("failed to render overlay: {e:#}"),
        })
    };

    // Pending hide countdown, cancelled whenever the overlay shows.
    let hide_timer: Rc<RefCell<Option<glib::SourceId>>> = Rc::new(RefCell::new(None));

    let show_temporarily = {
        let window = window.clone();
        let hide_timer = hide_timer.clone();
        Rc::new(move || {
            if let Some(source) = hide_timer.borrow_mut().take() {
                source.remove();
            }
            window.set_opacity(1.0);
            window.present();
        })
    };

    let arm_hide = {
        let window = window.clone();
        let hide_timer = hide_timer.clone();
        Rc::new(move || {
            if let Some(source) = hide_timer.borrow_mut().take() {
                source.remove();
            }
            let window = window.clone();
            let hide_timer_inner = hide_timer.clone();
            let source = glib::timeout_add_local_once(HIDE_DELAY, move || {
                hide_timer_inner.borrow_mut().take();
                window.set_opacity(0.0);
            });
            *hide_timer.borrow_mut() = Some(source);
        })
    };

    // Drain key events from the evdev threads.
    {
        let controller = controller.clone();
        let window = window.clone();
        let repaint = repaint.clone();
        let show_temporarily = show_temporarily.clone();
        let arm_hide = arm_hide.clone();
        let key_events = session.key_events;
        glib::timeout_add_local(INPUT_TICK, move || {
            while let Ok(event) = key_events.try_recv() {
                match controller.on_key_event(&event) {
                    ViewCommand::Show => {
                        repaint();
                        show_temporarily();
                    }
                    ViewCommand::Repaint => repaint(),
                    ViewCommand::RepaintThenArmHide => {
                        repaint();
                        arm_hide();
                    }
                    ViewCommand::Quit => {
                        window.close();
                        return glib::ControlFlow::Break;
                    }
                    ViewCommand::Ignore => {}
                }
            }
            glib::ControlFlow::Continue
        });
    }

    // Drain layer changes from the keyboard, when a source is running.
    if let Some(layer_events) = session.layer_events {
        let controller = controller.clone();
        let repaint = repaint.clone();
        let show_temporarily = show_temporarily.clone();
        let arm_hide = arm_hide.clone();
        glib::timeout_add_local(LAYER_TICK, move || {
            let mut changed = false;
            while let Ok(adv) = layer_events.try_recv() {
                if controller.set_layer_by_name(&adv.layer_name) {
                    changed = true;
                }
            }
            if changed {
                repaint();
                show_temporarily();
                if !controller.has_held_keys() {
                    arm_hide();
                }
            }
            glib::ControlFlow::Continue
        });
    }

    // Reload the keymap when its file changes on disk.
    if let Some(path) = controller.watched_keymap_path() {
        match FileWatcher::new(path.clone()) {
            Ok(watcher) => {
                let controller = controller.clone();
                let repaint = repaint.clone();
                glib::timeout_add_local(WATCH_TICK, move || {
                    if watcher.check_for_changes() {
                        match controller.reload_keymap() {
                            Ok(()) => repaint(),
                            Err(e) => warn!("keymap reload failed: {e:#}"),
                        }
                    }
                    glib::ControlFlow::Continue
                });
            }
            Err(e) => warn!("could not watch keymap file: {e}"),
        }
    }

    // Periodic stats save, so a crash loses little progress.
    {
        let controller = controller.clone();
        glib::timeout_add_local(FLUSH_TICK, move || {
            controller.flush_stats();
            glib::ControlFlow::Continue
        });
    }

    // Final save and input shutdown on close.
    {
        let controller = controller.clone();
        let monitor = session.monitor;
        let layer_source = RefCell::new(session.layer_source);
        window.connect_close_request(move |_| {
            monitor.stop();
            if let Some(mut source) = layer_source.borrow_mut().take() {
                source.stop();
            }
            controller.flush_stats();
            info!("{}", controller.summary());
            glib::Propagation::Proceed
        });
    }

    repaint();
    window.present();
    arm_hide();

    info!("Press 'y' to cycle layers, 'x' to exit.");
}
