//! User settings for backsort.
//!
//! Settings are stored as TOML:
//! ```toml
//! sort_descending = true
//! sort_in_document = true
//! sort_in_sidebar = true
//! debug_mode = false
//! daily_notes_folder = "Daily Notes"
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Folder searched when a label names no document at the vault root.
pub const DEFAULT_DAILY_NOTES_FOLDER: &str = "Daily Notes";

/// Presentation surfaces the host may show backlinks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// Backlinks panel rendered at the bottom of the open document.
    Document,
    /// Backlinks pane in the sidebar.
    Sidebar,
}

/// Persistent user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Newest first when true, oldest first otherwise.
    pub sort_descending: bool,
    /// Reorder the in-document backlinks panel.
    pub sort_in_document: bool,
    /// Reorder the sidebar backlinks pane.
    pub sort_in_sidebar: bool,
    /// Emit per-entry resolution traces. Never affects ordering.
    pub debug_mode: bool,
    /// Vault-relative folder holding daily notes.
    pub daily_notes_folder: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sort_descending: true,
            sort_in_document: true,
            sort_in_sidebar: true,
            debug_mode: false,
            daily_notes_folder: DEFAULT_DAILY_NOTES_FOLDER.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the TOML is malformed or a key
    /// has the wrong type. `origin` only labels the error.
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Invalid`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: origin.clone(),
            source,
        })?;
        Self::from_toml(&content, &origin)
    }

    /// Load settings from `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::load`] for a file that exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Whether the caller should reorder backlinks on the given surface.
    #[must_use]
    pub fn enabled_for(&self, kind: SurfaceKind) -> bool {
        match kind {
            SurfaceKind::Document => self.sort_in_document,
            SurfaceKind::Sidebar => self.sort_in_sidebar,
        }
    }
}
