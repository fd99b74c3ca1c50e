//! Durable store for pending (offline) edits
//!
//! Persists at most one [`PendingChange`] per list id until the edit is
//! successfully committed to the server. Each entry is a small JSON file
//! under `<data_dir>/pending/`, named by the URL-safe base64 of the list id
//! so opaque ids map cleanly onto file names. Writes are atomic (write to
//! temp file, then rename).
//!
//! The public contract is infallible: storage failures (missing directory,
//! full disk, unreadable or corrupt entries) degrade to "no data" for reads
//! and "no-op" for writes and deletes. The worst case is a lost or delayed
//! edit, never a crash.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::PendingChange;

/// Errors of the underlying storage layer.
///
/// Never escapes this module: the public methods log and degrade instead.
#[derive(Debug, Error)]
enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed entry: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Per-list pending-change store
#[derive(Debug, Clone)]
pub struct PendingStore {
    dir: PathBuf,
}

impl PendingStore {
    /// Create a store rooted at the given directory
    ///
    /// The directory is created lazily on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store at the configured pending directory
    pub fn open(config: &Config) -> Self {
        Self::new(config.pending_dir())
    }

    /// Return the pending change for a list, or `None` if none exists
    ///
    /// Unreadable or corrupt entries read as absent.
    pub fn get(&self, list_id: &str) -> Option<PendingChange> {
        match self.try_get(list_id) {
            Ok(change) => change,
            Err(err) => {
                debug!(list_id, error = %err, "pending entry unreadable, treating as absent");
                None
            }
        }
    }

    /// Persist a pending change for a list, overwriting any prior entry
    ///
    /// The change is stamped with the current time. If storage is
    /// unavailable the edit is not persisted and a warning is logged.
    pub fn put(&self, list_id: &str, markdown: &str) {
        let change = PendingChange::new(markdown);
        if let Err(err) = self.try_put(list_id, &change) {
            warn!(list_id, error = %err, "could not persist pending change, edit kept in memory only");
        }
    }

    /// Remove the pending entry for a list; no-op if none exists
    pub fn remove(&self, list_id: &str) {
        if let Err(err) = self.try_remove(list_id) {
            warn!(list_id, error = %err, "could not remove pending entry");
        }
    }

    /// Remove the entry for a list only if it is not newer than the change
    /// that was just committed.
    ///
    /// Used by the drain: if a fresh local edit for the same list arrived
    /// while its older pending change was in flight, the fresh entry stays
    /// queued for the next sync instead of being wiped by the stale success.
    pub fn remove_synced(&self, list_id: &str, synced_saved_at: DateTime<Utc>) {
        match self.get(list_id) {
            Some(current) if current.saved_at > synced_saved_at => {
                debug!(list_id, "newer local edit arrived during sync, keeping it queued");
            }
            Some(_) => self.remove(list_id),
            None => {}
        }
    }

    /// Enumerate every pending entry as `(list_id, change)` pairs
    ///
    /// Order is unspecified. Entries that cannot be decoded are skipped.
    pub fn list_all(&self) -> Vec<(String, PendingChange)> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // A missing directory just means nothing is pending yet
            Err(_) => return Vec::new(),
        };

        let mut results = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(list_id) = decode_entry_name(&path) else {
                continue;
            };
            if let Some(change) = self.get(&list_id) {
                results.push((list_id, change));
            }
        }
        results
    }

    /// Number of lists with pending edits
    pub fn len(&self) -> usize {
        self.list_all().len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.list_all().is_empty()
    }

    fn try_get(&self, list_id: &str) -> Result<Option<PendingChange>, StoreError> {
        let path = self.entry_path(list_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn try_put(&self, list_id: &str, change: &PendingChange) -> Result<(), StoreError> {
        let json = serde_json::to_string(change)?;
        atomic_write(&self.entry_path(list_id), json.as_bytes())?;
        Ok(())
    }

    fn try_remove(&self, list_id: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.entry_path(list_id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn entry_path(&self, list_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", URL_SAFE_NO_PAD.encode(list_id)))
    }
}

/// Recover the list id from an entry file name
fn decode_entry_name(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> PendingStore {
        PendingStore::new(temp_dir.path().join("pending"))
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "- [ ] milk");

        let change = store.get("list-1").unwrap();
        assert_eq!(change.markdown, "- [ ] milk");
        assert!(change.saved_at <= Utc::now());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(store.get("nope").is_none());
    }

    #[test]
    fn test_put_overwrites_not_accumulates() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "first");
        store.put("list-1", "second");

        let all = store.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "list-1");
        assert_eq!(all[0].1.markdown, "second");
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "- [ ] milk");
        store.remove("list-1");
        assert!(store.get("list-1").is_none());

        // Removing again is a no-op
        store.remove("list-1");
    }

    #[test]
    fn test_list_all_enumerates_every_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("a", "one");
        store.put("b", "two");
        store.put("c", "three");

        let mut ids: Vec<String> = store.list_all().into_iter().map(|(id, _)| id).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_opaque_ids_survive_filename_encoding() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        // Ids with separators and non-filename characters
        let id = "lists/2024?id=a b#frag";
        store.put(id, "body");

        let all = store.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, id);
        assert_eq!(store.get(id).unwrap().markdown, "body");
    }

    #[test]
    fn test_corrupt_entry_reads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "fine");
        fs::write(store.entry_path("list-1"), b"{not json").unwrap();

        assert!(store.get("list-1").is_none());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn test_unrelated_files_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "fine");
        fs::write(temp_dir.path().join("pending").join("README.txt"), b"hi").unwrap();
        fs::write(
            temp_dir.path().join("pending").join("!!not-base64!!.json"),
            b"{}",
        )
        .unwrap();

        let all = store.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "list-1");
    }

    #[test]
    fn test_unavailable_storage_degrades_silently() {
        let temp_dir = TempDir::new().unwrap();
        // Point the store at a path whose parent is a regular file, so every
        // directory operation fails
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let store = PendingStore::new(blocker.join("pending"));

        store.put("list-1", "- [ ] milk");
        assert!(store.get("list-1").is_none());
        assert!(store.list_all().is_empty());
        store.remove("list-1");
    }

    #[test]
    fn test_remove_synced_drops_entry_at_same_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "drained");
        let drained = store.get("list-1").unwrap();

        store.remove_synced("list-1", drained.saved_at);
        assert!(store.get("list-1").is_none());
    }

    #[test]
    fn test_remove_synced_keeps_newer_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.put("list-1", "drained");
        let drained = store.get("list-1").unwrap();

        // A fresh edit lands while the drained change is in flight
        std::thread::sleep(std::time::Duration::from_millis(10));
        store.put("list-1", "fresher");

        store.remove_synced("list-1", drained.saved_at);
        let kept = store.get("list-1").unwrap();
        assert_eq!(kept.markdown, "fresher");
    }

    #[test]
    fn test_remove_synced_missing_entry_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        store.remove_synced("list-1", Utc::now());
    }
}
