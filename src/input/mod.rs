//! Global keyboard monitoring via evdev.
//!
//! Reads key events straight from `/dev/input/event*`, which works on
//! both X11 and Wayland without compositor cooperation. Each
//! keyboard-capable device gets one blocking reader thread; normalized
//! events are forwarded over an mpsc channel that the GTK side drains on
//! its own main loop.
//!
//! Reading input devices requires membership in the `input` group on
//! most distributions; a missing device list at startup is treated as a
//! permission problem and reported with remediation steps.

pub mod labels;

pub use labels::label_for_key;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::{bail, Result};
use evdev::{Device, InputEventKind, Key};
use tracing::{debug, info, warn};

use crate::core::{KeyEvent, KeyState};

/// Finds input devices that look like keyboards.
///
/// A device qualifies when it advertises letter-key capabilities; this
/// skips mice, power buttons and the like that also live in /dev/input.
fn find_keyboard_devices() -> Vec<(PathBuf, Device)> {
    let mut keyboards = Vec::new();

    for (path, device) in evdev::enumerate() {
        let Some(keys) = device.supported_keys() else {
            continue;
        };
        if keys.contains(Key::KEY_A) || keys.contains(Key::KEY_B) || keys.contains(Key::KEY_C) {
            keyboards.push((path, device));
        }
    }

    keyboards
}

/// Global keyboard listener.
///
/// Owns one reader thread per keyboard device. Threads end on their own
/// when the receiver is dropped or a device read fails; `stop()` only
/// prevents further event delivery.
pub struct KeyboardMonitor {
    stop: Arc<AtomicBool>,
    _handles: Vec<thread::JoinHandle<()>>,
}

impl KeyboardMonitor {
    /// Starts monitoring every keyboard-capable device.
    ///
    /// Fails when no device can be opened, which on most systems means
    /// the user is not in the `input` group.
    pub fn start() -> Result<(Self, Receiver<KeyEvent>)> {
        let devices = find_keyboard_devices();

        if devices.is_empty() {
            bail!(
                "No readable keyboard device found under /dev/input.\n\
                 Global key monitoring needs read access to /dev/input/event*.\n\
                 Add your user to the 'input' group and log in again:\n\
                 \n\
                     sudo usermod -aG input $USER"
            );
        }

        let (tx, rx) = channel();
        let stop = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::new();

        for (path, device) in devices {
            info!(
                "Monitoring keyboard: {} ({})",
                device.name().unwrap_or("unnamed"),
                path.display()
            );

            let tx = tx.clone();
            let stop = stop.clone();
            handles.push(thread::spawn(move || read_loop(device, tx, stop)));
        }

        Ok((
            Self {
                stop,
                _handles: handles,
            },
            rx,
        ))
    }

    /// Stops delivering events.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn read_loop(mut device: Device, tx: Sender<KeyEvent>, stop: Arc<AtomicBool>) {
    loop {
        if stop.load(Ordering::Relaxed) {
            return;
        }

        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("Keyboard read failed ({e}); stopping monitor thread");
                return;
            }
        };

        for event in events {
            let InputEventKind::Key(key) = event.kind() else {
                continue;
            };

            let state = match event.value() {
                1 => KeyState::Pressed,
                0 => KeyState::Released,
                // 2 is autorepeat; the classifier only wants real presses
                _ => continue,
            };

            let Some(label) = labels::label_for_key(key) else {
                continue;
            };

            debug!("{state:?}: {label}");

            if tx.send(KeyEvent { label, state }).is_err() {
                // Receiver gone, nothing left to do
                return;
            }
        }
    }
}
