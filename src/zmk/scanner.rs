//! Layer change sources.
//!
//! The overlay tracks the keyboard's active layer through a
//! [`LayerSource`]: a background producer of [`StatusAdvertisement`]s.
//! In testing mode a [`SimScanner`] stands in for a real keyboard and
//! cycles through the keymap's layers on a timer.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use super::advertisement::{DeviceRole, ModifierFlags, StatusAdvertisement, StatusFlags};

/// A background source of keyboard status updates.
pub trait LayerSource {
    /// Starts producing advertisements and returns the receiving end.
    fn start(&mut self) -> Receiver<StatusAdvertisement>;

    /// Stops the background producer.
    fn stop(&mut self);
}

/// Simulated scanner that cycles through the given layers on a timer.
pub struct SimScanner {
    layer_names: Vec<String>,
    interval: Duration,
    /// Dropping this wakes and ends the producer thread.
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SimScanner {
    pub fn new(layer_names: Vec<String>, interval: Duration) -> Self {
        Self {
            layer_names,
            interval,
            stop_tx: None,
            handle: None,
        }
    }

    fn advertisement(layer: u8, name: &str) -> StatusAdvertisement {
        StatusAdvertisement {
            version: 1,
            battery_level: 100,
            active_layer: layer,
            profile_slot: 0,
            connection_count: 1,
            status: StatusFlags(StatusFlags::BLE_CONNECTED),
            role: DeviceRole::Standalone,
            device_index: 0,
            peripheral_batteries: [0; 3],
            layer_name: name.to_string(),
            keyboard_id: 0,
            modifiers: ModifierFlags::default(),
            wpm: 0,
            channel: 0,
        }
    }
}

impl LayerSource for SimScanner {
    fn start(&mut self) -> Receiver<StatusAdvertisement> {
        let (tx, rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        self.stop_tx = Some(stop_tx);

        let layer_names = self.layer_names.clone();
        let interval = self.interval;

        self.handle = Some(thread::spawn(move || {
            let mut index = 0usize;

            loop {
                // Waiting on the stop channel doubles as the interval
                // timer, so stop() is never blocked on a full sleep.
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => return,
                }
                if layer_names.is_empty() {
                    continue;
                }

                index = (index + 1) % layer_names.len();
                let adv = Self::advertisement(index as u8, &layer_names[index]);

                // Encode and re-parse so simulated updates travel the
                // same wire path a real transport would deliver.
                let Some(parsed) = StatusAdvertisement::parse(&adv.encode()) else {
                    continue;
                };

                debug!(layer = parsed.active_layer, name = %parsed.layer_name, "simulated layer change");
                if tx.send(parsed).is_err() {
                    return;
                }
            }
        }));

        rx
    }

    fn stop(&mut self) {
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SimScanner {
    fn drop(&mut self) {
        self.stop_tx.take();
    }
}
