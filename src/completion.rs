//! Completion tracking for catalog entries
//! Stores to: ~/.settei_helper/completed.json (JSON array of ids)
//!
//! Every mutation re-serializes and overwrites the whole set. Ids with no
//! matching catalog entry are harmless and never reconciled.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// Default store location
fn get_store_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
        .join(".settei_helper")
        .join("completed.json")
}

/// Completion tracker with thread-safe access
pub struct CompletionTracker {
    store_path: PathBuf,
    // Mutex for safe concurrent access in async context
    _lock: Mutex<()>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self {
            store_path: get_store_path(),
            _lock: Mutex::new(()),
        }
    }

    /// Create a tracker with a custom path (useful for testing)
    pub fn new_with_path(path: PathBuf) -> Self {
        Self {
            store_path: path,
            _lock: Mutex::new(()),
        }
    }

    async fn ensure_store(&self) -> Result<()> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create completion store directory")?;
        }

        if !self.store_path.exists() {
            fs::write(&self.store_path, "[]")
                .await
                .context("Failed to initialize completion store")?;
        }

        Ok(())
    }

    async fn load_set(&self) -> Result<BTreeSet<String>> {
        self.ensure_store().await?;

        let content = fs::read_to_string(&self.store_path)
            .await
            .context("Failed to read completion store")?;

        let ids: Vec<String> =
            serde_json::from_str(&content).context("Failed to parse completion store")?;

        Ok(ids.into_iter().collect())
    }

    async fn save_set(&self, set: &BTreeSet<String>) -> Result<()> {
        self.ensure_store().await?;

        let ids: Vec<&String> = set.iter().collect();
        let json =
            serde_json::to_string_pretty(&ids).context("Failed to serialize completion store")?;

        fs::write(&self.store_path, json)
            .await
            .context("Failed to write completion store")?;

        Ok(())
    }

    pub async fn is_completed(&self, id: &str) -> Result<bool> {
        let _guard = self._lock.lock().await;
        Ok(self.load_set().await?.contains(id))
    }

    pub async fn mark_completed(&self, id: &str) -> Result<()> {
        let _guard = self._lock.lock().await;

        let mut set = self.load_set().await?;
        set.insert(id.to_string());
        self.save_set(&set).await
    }

    pub async fn unmark_completed(&self, id: &str) -> Result<()> {
        let _guard = self._lock.lock().await;

        let mut set = self.load_set().await?;
        set.remove(id);
        self.save_set(&set).await
    }

    /// Snapshot of the full completed set
    pub async fn completed_set(&self) -> Result<BTreeSet<String>> {
        let _guard = self._lock.lock().await;
        self.load_set().await
    }

    /// Get the path to the completion store file
    pub fn get_store_path(&self) -> String {
        self.store_path.display().to_string()
    }
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_tracker() -> CompletionTracker {
        let path = env::temp_dir().join(format!("settei_completed_{}.json", uuid::Uuid::new_v4()));
        CompletionTracker::new_with_path(path)
    }

    #[tokio::test]
    async fn test_mark_and_check() {
        let tracker = temp_tracker();

        assert!(!tracker.is_completed("12").await.unwrap());
        tracker.mark_completed("12").await.unwrap();
        assert!(tracker.is_completed("12").await.unwrap());

        let _ = std::fs::remove_file(tracker.get_store_path());
    }

    #[tokio::test]
    async fn test_unmark_round_trip() {
        let tracker = temp_tracker();

        tracker.mark_completed("7").await.unwrap();
        tracker.unmark_completed("7").await.unwrap();
        assert!(!tracker.is_completed("7").await.unwrap());

        let _ = std::fs::remove_file(tracker.get_store_path());
    }

    #[tokio::test]
    async fn test_persists_as_json_array() {
        let tracker = temp_tracker();

        tracker.mark_completed("3").await.unwrap();
        tracker.mark_completed("1").await.unwrap();

        let content = std::fs::read_to_string(tracker.get_store_path()).unwrap();
        let ids: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(ids, vec!["1", "3"]);

        let _ = std::fs::remove_file(tracker.get_store_path());
    }

    #[tokio::test]
    async fn test_mark_is_idempotent() {
        let tracker = temp_tracker();

        tracker.mark_completed("5").await.unwrap();
        tracker.mark_completed("5").await.unwrap();

        let set = tracker.completed_set().await.unwrap();
        assert_eq!(set.len(), 1);

        let _ = std::fs::remove_file(tracker.get_store_path());
    }
}
