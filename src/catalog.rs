//! Character catalog loading
//!
//! The catalog is a JSON object mapping identifier strings to character
//! records, produced externally and read-only here. Loading tries a primary
//! path first and falls back to an operator-supplied path, mirroring the
//! bundled-resource / manual-file split.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One catalog entry describing a character to be created on the host site
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-text description as an HTML fragment
    #[serde(default)]
    pub description: String,
    /// Alternate names
    #[serde(default, rename = "nickName")]
    pub nick_name: Vec<String>,
    /// Key into the image store, if an avatar exists
    #[serde(default)]
    pub avatar: Option<String>,
}

/// In-memory character catalog keyed by identifier
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: HashMap<String, CharacterRecord>,
}

impl Catalog {
    /// Load a catalog from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .context(format!("Failed to read catalog file: {:?}", path))?;

        let records: HashMap<String, CharacterRecord> = serde_json::from_str(&content)
            .context(format!("Failed to parse catalog file: {:?}", path))?;

        Ok(Self { records })
    }

    /// Load from the primary path, falling back to a second path on any
    /// failure. Both failing returns the fallback error with the primary
    /// failure in its context chain.
    pub fn load_with_fallback(
        primary: impl AsRef<Path>,
        fallback: impl AsRef<Path>,
    ) -> Result<Self> {
        match Self::load_from_file(primary.as_ref()) {
            Ok(catalog) => Ok(catalog),
            Err(primary_err) => Self::load_from_file(fallback.as_ref())
                .context(format!("Primary catalog failed: {:#}", primary_err)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&CharacterRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CharacterRecord)> {
        self.records.iter()
    }

    /// Identifiers in numeric-aware order
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.keys().map(|s| s.as_str()).collect();
        ids.sort_by(|a, b| compare_ids(a, b));
        ids
    }
}

/// Order ids numerically when both parse as integers, lexically otherwise.
/// Catalog ids are typically decimal strings ("7" before "12").
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
