//! Keymap document loading and layer bookkeeping.
//!
//! Layout parsing and SVG generation are owned by the external
//! keymap-drawer tool; this module only validates the YAML document
//! enough to know the ordered layer names, and hands the source through
//! to the renderer untouched.

pub mod renderer;
pub mod svg;

pub use renderer::KeymapRenderer;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Embedded fallback keymap, a miryoku-style 3x5+3 split layout.
pub const DEFAULT_KEYMAP: &str = include_str!("../../assets/miryoku.yaml");

/// Errors that can occur while loading or rendering a keymap.
#[derive(Debug, Error)]
pub enum KeymapError {
    /// Keymap file does not exist.
    #[error("Keymap YAML file not found: {0}")]
    NotFound(PathBuf),

    /// Keymap file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Keymap YAML is malformed.
    #[error("Invalid keymap YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A layout section is required for keymap-drawer to place keys.
    #[error("Keymap has no layout section")]
    MissingLayout,

    /// At least one layer is required.
    #[error("Keymap defines no layers")]
    NoLayers,

    /// The external keymap-drawer CLI is not installed.
    #[error("keymap-drawer not found on PATH (install with: pipx install keymap-drawer)")]
    DrawerMissing,

    /// keymap-drawer ran but failed to produce an SVG.
    #[error("keymap draw failed: {0}")]
    RenderFailed(String),
}

/// Minimal view of a keymap-drawer YAML document.
///
/// Only the parts this application inspects; everything else passes
/// through to the renderer opaquely.
#[derive(Debug, Deserialize)]
struct KeymapDoc {
    #[serde(default)]
    layout: serde_yaml::Value,
    #[serde(default)]
    layers: serde_yaml::Mapping,
}

/// A loaded keymap: the raw YAML source plus the ordered layer names.
#[derive(Clone, Debug)]
pub struct Keymap {
    source: String,
    layer_names: Vec<String>,
}

impl Keymap {
    /// Validates `source` and extracts the layer names in document order.
    pub fn from_source(source: String) -> Result<Self, KeymapError> {
        let doc: KeymapDoc = serde_yaml::from_str(&source)?;

        if doc.layout.is_null() {
            return Err(KeymapError::MissingLayout);
        }

        let layer_names: Vec<String> = doc
            .layers
            .keys()
            .filter_map(|key| key.as_str().map(str::to_owned))
            .collect();

        if layer_names.is_empty() {
            return Err(KeymapError::NoLayers);
        }

        Ok(Self {
            source,
            layer_names,
        })
    }

    /// Loads a keymap YAML file from disk.
    pub fn from_file(path: &Path) -> Result<Self, KeymapError> {
        if !path.exists() {
            return Err(KeymapError::NotFound(path.to_path_buf()));
        }
        info!("Loading keymap from: {}", path.display());
        Self::from_source(std::fs::read_to_string(path)?)
    }

    /// The built-in miryoku-style keymap shipped with the binary.
    pub fn embedded_default() -> Self {
        info!("Loading built-in miryoku keymap");
        // Validated by tests; failing to parse our own asset is a packaging bug
        Self::from_source(DEFAULT_KEYMAP.to_string()).expect("embedded keymap should be valid")
    }

    /// The raw YAML, as handed to keymap-drawer.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Layer names in document order.
    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layer_names.len()
    }

    /// Case-insensitive layer lookup.
    ///
    /// ZMK status advertisements carry at most four characters of the
    /// layer name, so a 4-character query also matches by prefix.
    pub fn layer_index_by_name(&self, name: &str) -> Option<usize> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        if let Some(index) = self
            .layer_names
            .iter()
            .position(|n| n.to_lowercase() == query)
        {
            return Some(index);
        }

        if query.len() == 4 {
            return self
                .layer_names
                .iter()
                .position(|n| n.to_lowercase().starts_with(&query));
        }

        None
    }
}
