//! Persistent avatar image cache
//! Stores to: ~/.settei_helper/image_store.json (payloads base64-encoded)
//!
//! Keys are avatar file names from the catalog. Saving an existing key
//! overwrites its payload; entries are never deleted. A failing write aborts
//! the whole batch with no partial success.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Default store location
fn get_store_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
        .join(".settei_helper")
        .join("image_store.json")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ImageFile {
    /// key -> base64 payload
    images: BTreeMap<String, String>,
}

/// Image store with thread-safe access
pub struct ImageStore {
    store_path: PathBuf,
    // Mutex for safe concurrent access in async context
    _lock: Mutex<()>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self {
            store_path: get_store_path(),
            _lock: Mutex::new(()),
        }
    }

    /// Create a store with a custom path (useful for testing)
    pub fn new_with_path(path: PathBuf) -> Self {
        Self {
            store_path: path,
            _lock: Mutex::new(()),
        }
    }

    /// Ensure store directory and file exist
    async fn ensure_store(&self) -> Result<()> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create image store directory")?;
        }

        if !self.store_path.exists() {
            let empty_store = ImageFile::default();
            let json = serde_json::to_string_pretty(&empty_store)?;
            fs::write(&self.store_path, json)
                .await
                .context("Failed to initialize image store")?;
        }

        Ok(())
    }

    async fn load_file(&self) -> Result<ImageFile> {
        self.ensure_store().await?;

        let content = fs::read_to_string(&self.store_path)
            .await
            .context("Failed to read image store")?;

        let store: ImageFile =
            serde_json::from_str(&content).context("Failed to parse image store")?;

        Ok(store)
    }

    async fn save_file(&self, store: &ImageFile) -> Result<()> {
        self.ensure_store().await?;

        let json = serde_json::to_string_pretty(store).context("Failed to serialize image store")?;

        fs::write(&self.store_path, json)
            .await
            .context("Failed to write image store")?;

        Ok(())
    }

    /// Save a batch of images. Existing keys are overwritten; a write
    /// failure aborts the whole batch.
    pub async fn save(&self, entries: &HashMap<String, Vec<u8>>) -> Result<()> {
        let _guard = self._lock.lock().await;

        let mut store = self.load_file().await?;
        for (key, bytes) in entries {
            store.images.insert(key.clone(), BASE64.encode(bytes));
        }

        self.save_file(&store).await
    }

    /// Load every cached image
    pub async fn load_all(&self) -> Result<HashMap<String, Vec<u8>>> {
        let _guard = self._lock.lock().await;

        let store = self.load_file().await?;
        let mut images = HashMap::new();
        for (key, payload) in store.images {
            let bytes = BASE64
                .decode(payload.as_bytes())
                .context(format!("Corrupt image payload for key: {}", key))?;
            images.insert(key, bytes);
        }

        Ok(images)
    }

    /// Load one cached image by key
    pub async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let _guard = self._lock.lock().await;

        let store = self.load_file().await?;
        match store.images.get(key) {
            Some(payload) => {
                let bytes = BASE64
                    .decode(payload.as_bytes())
                    .context(format!("Corrupt image payload for key: {}", key))?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Keys of every cached image (for avatar-present indicators)
    pub async fn keys(&self) -> Result<HashSet<String>> {
        let _guard = self._lock.lock().await;

        let store = self.load_file().await?;
        Ok(store.images.keys().cloned().collect())
    }

    /// Import every image file from a directory, keyed by file name.
    /// Returns the number of images saved.
    pub async fn import_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut entries = HashMap::new();

        let mut read_dir = fs::read_dir(dir)
            .await
            .context(format!("Failed to read image directory: {:?}", dir))?;

        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if !path.is_file() || !is_image_file(&path) {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let bytes = fs::read(&path)
                .await
                .context(format!("Failed to read image file: {:?}", path))?;
            entries.insert(name.to_string(), bytes);
        }

        let count = entries.len();
        if count > 0 {
            self.save(&entries).await?;
        }
        Ok(count)
    }

    /// Get the path to the image store file
    pub fn get_store_path(&self) -> String {
        self.store_path.display().to_string()
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"
            )
        })
        .unwrap_or(false)
}
