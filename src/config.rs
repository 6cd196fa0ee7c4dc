//! Helper configuration
//!
//! Loaded from a YAML file; every field has a built-in default so a missing
//! file (the common case) just yields the defaults. Host field identifiers
//! live here so host-page markup changes stay out of the form filler.

use crate::infobox::DEFAULT_SOURCE_URL_TEMPLATE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".settei_helper")
}

/// Identifiers of the host page's form controls
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostFields {
    pub name: String,
    pub summary: String,
    pub upload: String,
    pub infobox: String,
}

impl Default for HostFields {
    fn default() -> Self {
        Self {
            name: "crt_name".to_string(),
            summary: "crt_summary".to_string(),
            upload: "picfile".to_string(),
            infobox: "subject_infobox".to_string(),
        }
    }
}

/// Full helper configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Primary catalog path (the bundled dataset)
    pub catalog_path: PathBuf,
    /// Fallback catalog path (the operator-selected file)
    pub fallback_catalog_path: PathBuf,
    /// Avatar image cache
    pub image_store_path: PathBuf,
    /// Completed-id set
    pub completion_store_path: PathBuf,
    /// Host form control identifiers
    pub host_fields: HostFields,
    /// Source page URL template with an `{id}` placeholder
    pub source_url_template: String,
    /// Delay after switching the host editor to raw-markup mode
    pub markup_mode_delay_ms: u64,
}

impl Default for HelperConfig {
    fn default() -> Self {
        let dir = data_dir();
        Self {
            catalog_path: dir.join("characters.json"),
            fallback_catalog_path: dir.join("characters.local.json"),
            image_store_path: dir.join("image_store.json"),
            completion_store_path: dir.join("completed.json"),
            host_fields: HostFields::default(),
            source_url_template: DEFAULT_SOURCE_URL_TEMPLATE.to_string(),
            markup_mode_delay_ms: 100,
        }
    }
}

impl HelperConfig {
    /// Load configuration from a YAML file; a missing file yields defaults,
    /// a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let config: HelperConfig = serde_yaml::from_str(&content)
            .context(format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Default on-disk location of the config file
    pub fn default_path() -> PathBuf {
        data_dir().join("config.yaml")
    }
}
