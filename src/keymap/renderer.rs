//! SVG rendering via the external keymap-drawer CLI.
//!
//! Layout rendering is deliberately not reimplemented here: the keymap
//! YAML is piped to `keymap draw - -s <layer>` and the SVG is read back
//! from stdout. The only contract this module owns is process plumbing
//! and error surfacing.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{Keymap, KeymapError};

/// Invokes the `keymap` executable (keymap-drawer) to render layers.
#[derive(Clone, Debug)]
pub struct KeymapRenderer {
    program: String,
}

impl Default for KeymapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeymapRenderer {
    /// Renderer using `keymap` from PATH.
    pub fn new() -> Self {
        Self::with_program("keymap")
    }

    /// Renderer using an explicit executable.
    ///
    /// Tests point this at a stub script so the render pipeline runs
    /// without keymap-drawer installed.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Verifies the external renderer is invocable.
    ///
    /// Run once at startup so a missing installation surfaces as a clear
    /// message before any window opens.
    pub fn preflight(&self) -> Result<(), KeymapError> {
        let status = Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(KeymapError::RenderFailed(format!(
                "`{} --version` exited with {status}",
                self.program
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(KeymapError::DrawerMissing),
            Err(e) => Err(KeymapError::Io(e)),
        }
    }

    /// Renders a single layer of `keymap` to SVG.
    pub fn render_layer(&self, keymap: &Keymap, layer: &str) -> Result<String, KeymapError> {
        debug!("Rendering layer '{layer}' via {}", self.program);

        let mut child = Command::new(&self.program)
            .args(["draw", "-", "-s", layer])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KeymapError::DrawerMissing
                } else {
                    KeymapError::Io(e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(keymap.source().as_bytes())?;
            // Dropping stdin closes the pipe so keymap-drawer sees EOF
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KeymapError::RenderFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
