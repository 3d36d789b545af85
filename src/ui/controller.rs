//! MVC Controller - Mediates between Model (tracker, keymap, renderer) and View (GTK4 overlay)
//!
//! # Responsibilities
//!
//! - Route key events to the accuracy tracker
//! - Track the active keymap layer and held keys
//! - Render layer SVGs through keymap-drawer and cache them
//! - Decorate rendered SVGs with learned/held key styling
//! - Tell the View what to do next via [`ViewCommand`]
//!
//! # Architecture
//!
//! The Controller holds the Model state but doesn't know about GTK4
//! widgets. This keeps the accuracy and rendering logic separate from
//! presentation, and makes it testable without a display.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::core::{AccuracyTracker, KeyEvent, KeyLabel, KeyState};
use crate::keymap::{svg, Keymap, KeymapRenderer};
use crate::stats::StatsStore;

/// Startup options collected from the command line.
#[derive(Clone, Debug, Default)]
pub struct OverlayOptions {
    /// Keymap YAML path; `None` uses the embedded default.
    pub keymap_path: Option<PathBuf>,
    /// Treat every key as learned and skip persistence.
    pub testing: bool,
    /// Dump decorated SVGs to a temp directory on every repaint.
    pub debug: bool,
}

/// What the View should do after the Controller handles an event.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ViewCommand {
    /// Repaint and make the overlay visible.
    Show,
    /// Repaint in place without changing visibility.
    Repaint,
    /// Repaint, then start the hide countdown.
    RepaintThenArmHide,
    /// Close the window and exit.
    Quit,
    /// Nothing to do.
    Ignore,
}

/// MVC Controller coordinating the tracker, keymap and renderer.
pub struct Controller {
    tracker: RefCell<AccuracyTracker>,
    keymap: RefCell<Keymap>,
    renderer: KeymapRenderer,
    /// Index into the keymap's layer list.
    layer_index: Cell<usize>,
    /// Keys currently held down, by label.
    held: RefCell<HashSet<KeyLabel>>,
    /// Rendered (undecorated) SVG per layer index.
    svg_cache: RefCell<HashMap<usize, String>>,
    keymap_path: Option<PathBuf>,
    debug: bool,
}

impl Controller {
    /// Creates a Controller from startup options.
    ///
    /// Loads the keymap (file or embedded default) and the stats store.
    pub fn new(options: OverlayOptions) -> anyhow::Result<Self> {
        Self::with_renderer(options, KeymapRenderer::new())
    }

    /// Like [`Controller::new`] with an explicit renderer.
    pub fn with_renderer(
        options: OverlayOptions,
        renderer: KeymapRenderer,
    ) -> anyhow::Result<Self> {
        let keymap = match &options.keymap_path {
            Some(path) => Keymap::from_file(path)
                .with_context(|| format!("failed to load keymap {}", path.display()))?,
            None => Keymap::embedded_default(),
        };
        info!(
            layers = keymap.layer_count(),
            "keymap loaded: {}",
            keymap.layer_names().join(", ")
        );

        let stats_path = StatsStore::default_path().context("no user data directory")?;
        let store = if options.testing {
            info!("testing mode: all keys treated as learned, stats will not be saved");
            StatsStore::testing(stats_path)
        } else {
            StatsStore::load(stats_path)
        };

        Ok(Self {
            tracker: RefCell::new(AccuracyTracker::new(store)),
            keymap: RefCell::new(keymap),
            renderer,
            layer_index: Cell::new(0),
            held: RefCell::new(HashSet::new()),
            svg_cache: RefCell::new(HashMap::new()),
            keymap_path: options.keymap_path,
            debug: options.debug,
        })
    }

    /// Handles one key event and returns what the View should do.
    ///
    /// Hotkeys: `x` quits, `y` cycles to the next layer. Everything
    /// else feeds the accuracy tracker and the held-key set.
    pub fn on_key_event(&self, event: &KeyEvent) -> ViewCommand {
        match event.state {
            KeyState::Pressed => match event.label.as_str() {
                "x" => ViewCommand::Quit,
                "y" => {
                    self.cycle_layer();
                    ViewCommand::Show
                }
                _ => {
                    self.tracker.borrow_mut().on_key_press(&event.label);
                    self.held.borrow_mut().insert(event.label.clone());
                    ViewCommand::Show
                }
            },
            KeyState::Released => {
                if event.label.as_str() == "y" {
                    return ViewCommand::Ignore;
                }
                self.held.borrow_mut().remove(&event.label);
                if self.held.borrow().is_empty() {
                    ViewCommand::RepaintThenArmHide
                } else {
                    ViewCommand::Repaint
                }
            }
        }
    }

    /// Advances to the next layer, wrapping around.
    pub fn cycle_layer(&self) {
        let count = self.keymap.borrow().layer_count();
        if count == 0 {
            return;
        }
        let next = (self.layer_index.get() + 1) % count;
        self.layer_index.set(next);
        debug!(layer = next, "cycled to layer {}", self.layer_name(next));
    }

    /// Switches to the named layer, if the keymap has it.
    ///
    /// Returns `true` when the active layer changed.
    pub fn set_layer_by_name(&self, name: &str) -> bool {
        let Some(index) = self.keymap.borrow().layer_index_by_name(name) else {
            warn!("keyboard reported unknown layer {name:?}");
            return false;
        };
        if index == self.layer_index.get() {
            return false;
        }
        self.layer_index.set(index);
        debug!(layer = index, "keyboard switched to layer {name}");
        true
    }

    pub fn layer_index(&self) -> usize {
        self.layer_index.get()
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.keymap.borrow().layer_names().to_vec()
    }

    fn layer_name(&self, index: usize) -> String {
        self.keymap
            .borrow()
            .layer_names()
            .get(index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_held_keys(&self) -> bool {
        !self.held.borrow().is_empty()
    }

    /// Renders the current layer and applies learned/held decorations.
    ///
    /// The undecorated render is cached per layer; decorations are
    /// applied fresh on every call since held keys change constantly.
    pub fn current_svg(&self) -> anyhow::Result<String> {
        let index = self.layer_index.get();

        // Release the cache borrow before the miss path re-borrows mutably
        let cached = self.svg_cache.borrow().get(&index).cloned();
        let base = match cached {
            Some(svg) => svg,
            None => {
                let keymap = self.keymap.borrow();
                let layer = keymap
                    .layer_names()
                    .get(index)
                    .cloned()
                    .context("no layers in keymap")?;
                drop(keymap);

                let rendered = self
                    .renderer
                    .render_layer(&self.keymap.borrow(), &layer)
                    .with_context(|| format!("failed to render layer {layer:?}"))?;
                self.svg_cache
                    .borrow_mut()
                    .insert(index, rendered.clone());
                rendered
            }
        };

        let tracker = self.tracker.borrow();
        let learned = tracker.learned_keys();
        let held = self.held.borrow();
        let decorated = svg::decorate(
            &base,
            &svg::Decorations {
                learned: &learned,
                held: &held,
            },
        );

        if self.debug {
            self.dump_debug_svg(&decorated);
        }

        Ok(decorated)
    }

    /// Writes the decorated SVG to a temp directory, keeping the
    /// newest four dumps for inspection.
    fn dump_debug_svg(&self, svg: &str) {
        let dir = env::temp_dir().join("zmk-overlay-svg");
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!("failed to create debug SVG dir: {e}");
            return;
        }

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.3f");
        let path = dir.join(format!("overlay_{stamp}.svg"));
        if let Err(e) = fs::write(&path, svg) {
            warn!("failed to write debug SVG: {e}");
            return;
        }
        debug!("debug SVG written to {}", path.display());

        // Prune older dumps, newest four stay.
        let Ok(entries) = fs::read_dir(&dir) else {
            return;
        };
        let mut dumps: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "svg"))
            .collect();
        dumps.sort();
        while dumps.len() > 4 {
            let oldest = dumps.remove(0);
            let _ = fs::remove_file(oldest);
        }
    }

    /// Reloads the keymap file after an on-disk change.
    ///
    /// Clears the render cache and clamps the layer index in case the
    /// new file has fewer layers.
    pub fn reload_keymap(&self) -> anyhow::Result<()> {
        let Some(path) = &self.keymap_path else {
            return Ok(());
        };
        let keymap = Keymap::from_file(path)
            .with_context(|| format!("failed to reload keymap {}", path.display()))?;

        if self.layer_index.get() >= keymap.layer_count() {
            self.layer_index.set(0);
        }
        info!(
            layers = keymap.layer_count(),
            "keymap reloaded from {}",
            path.display()
        );
        *self.keymap.borrow_mut() = keymap;
        self.svg_cache.borrow_mut().clear();
        Ok(())
    }

    pub fn watched_keymap_path(&self) -> Option<&PathBuf> {
        self.keymap_path.as_ref()
    }

    /// Saves accumulated stats if anything changed since the last save.
    pub fn flush_stats(&self) {
        if let Err(e) = self.tracker.borrow_mut().flush() {
            warn!("failed to save key stats: {e}");
        }
    }

    /// One-line accuracy summary for the exit log.
    pub fn summary(&self) -> String {
        self.tracker.borrow().summary()
    }
}
