//! Configuration management
//!
//! Compatible with the desktop app's settings.json format:
//! ```json
//! {
//!   "app": { ... },
//!   "mappingTemplates": {
//!     "Date,Description,Amount": { "date": "Date", ... }
//!   }
//! }
//! ```
//! Fields the core library does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::ColumnMapping;

/// Raw settings.json structure (matching the app format)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: serde_json::Value,
    #[serde(default)]
    mapping_templates: HashMap<String, ColumnMapping>,
}

/// Inlet configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Saved column mappings keyed by header signature
    pub mapping_templates: HashMap<String, ColumnMapping>,
    // Raw settings kept for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the inlet directory.
    ///
    /// A missing or unparsable settings file yields the defaults; templates
    /// are a cache, not critical state.
    pub fn load(inlet_dir: &Path) -> Result<Self> {
        let settings_path = inlet_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            mapping_templates: raw.mapping_templates.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the inlet directory.
    /// Preserves settings fields that the core library doesn't manage.
    pub fn save(&self, inlet_dir: &Path) -> Result<()> {
        let settings_path = inlet_dir.join("settings.json");

        // Re-read existing settings so concurrent edits to unmanaged fields
        // are not clobbered
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.mapping_templates = self.mapping_templates.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
