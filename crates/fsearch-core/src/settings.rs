//! Persisted overlay settings: the remembered search state plus the UI
//! preferences surfaced in the options panel.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use fsearch_types::{SearchState, ViewKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// The remembered search state restored on the next open.
    #[serde(default)]
    pub search: SearchState,

    #[serde(default = "default_true")]
    pub show_file_path: bool,

    #[serde(default = "default_true")]
    pub show_instructions: bool,

    /// Where search opens when no explicit target is given.
    #[serde(default)]
    pub default_view_kind: ViewKind,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search: SearchState::default(),
            show_file_path: true,
            show_instructions: true,
            default_view_kind: ViewKind::default(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults for a missing file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadSettings {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && let Err(err) = std::fs::create_dir_all(parent)
        {
            warn!("could not create {}: {err}", parent.display());
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| Error::WriteSettings {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Overlay directories following the XDG spec.
#[derive(Debug, Clone)]
pub struct Directories {
    pub config: PathBuf,
    pub settings_file: PathBuf,
}

impl Directories {
    pub fn new() -> Result<Self> {
        let project = ProjectDirs::from("", "", "fsearch").ok_or(Error::NoConfigDir)?;
        Ok(Self::with_base(project.config_dir().to_path_buf()))
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            settings_file: base.join("settings.json"),
            config: base,
        }
    }
}
