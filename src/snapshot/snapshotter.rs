//! Snapshot Save/Load Orchestration
//!
//! The [`Snapshotter`] sits between the command layer and the codec. It
//! owns the policy that keeps persistence off the command path:
//!
//! - `save` deep-copies the key space under one brief lock acquisition
//!   ([`StorageEngine::snapshot`]), then encodes and writes the file with
//!   the lock released. Commands keep executing while the bytes hit disk.
//! - `load` reads and decodes the whole file first, then swaps it in with
//!   a single [`StorageEngine::replace_all`] call. A malformed file aborts
//!   before any mutation; the live store is untouched.

use std::sync::Arc;

use tracing::{info, warn};

use crate::snapshot::codec::{self, SnapshotError, SnapshotFormat};
use crate::storage::StorageEngine;

/// Saves and restores point-in-time copies of the store.
#[derive(Clone)]
pub struct Snapshotter {
    /// The storage engine
    storage: Arc<StorageEngine>,
}

impl Snapshotter {
    /// Creates a new snapshotter over the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Writes a snapshot of the current store contents to `path`.
    ///
    /// Only [`SnapshotFormat::Custom`] is implemented. The store lock is
    /// held only while the key space is copied; the disk write happens
    /// afterwards, lock-free.
    pub async fn save(&self, path: &str, format: SnapshotFormat) -> Result<(), SnapshotError> {
        if format != SnapshotFormat::Custom {
            return Err(SnapshotError::NotImplemented(format.name()));
        }

        let records = self.storage.snapshot();
        let record_count = records.len();
        let bytes = codec::encode(&records);

        if let Err(e) = tokio::fs::write(path, bytes).await {
            warn!(path, error = %e, "snapshot save failed");
            return Err(e.into());
        }

        info!(path, records = record_count, "snapshot saved");
        Ok(())
    }

    /// Replaces the entire store contents with a snapshot read from `path`.
    ///
    /// The file is read and fully decoded before anything is applied;
    /// exclusive access is taken only for the final swap. On any error the
    /// store keeps its previous contents.
    pub async fn load(&self, path: &str, format: SnapshotFormat) -> Result<(), SnapshotError> {
        if format != SnapshotFormat::Custom {
            return Err(SnapshotError::NotImplemented(format.name()));
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path, error = %e, "snapshot load failed");
                return Err(e.into());
            }
        };

        let records = match codec::decode(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(path, error = %e, "snapshot is corrupt, store left untouched");
                return Err(e);
            }
        };

        let record_count = records.len();
        self.storage.replace_all(records);

        info!(path, records = record_count, "snapshot loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_save_load_roundtrip_across_engines() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "dump.db");

        let source = Arc::new(StorageEngine::new());
        source.set("user", "ariel");
        source.hset("prefs", "tz", "UTC");
        source.hset("prefs", "lang", "en");
        source.ladd("tags", "a");
        source.ladd("tags", "b");

        Snapshotter::new(Arc::clone(&source))
            .save(&path, SnapshotFormat::Custom)
            .await
            .unwrap();

        // A fresh engine, as after a process restart.
        let restored = Arc::new(StorageEngine::new());
        Snapshotter::new(Arc::clone(&restored))
            .load(&path, SnapshotFormat::Custom)
            .await
            .unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.get("user"), Some("ariel".to_string()));
        assert_eq!(restored.hget("prefs", "tz"), Some("UTC".to_string()));
        assert_eq!(restored.hget("prefs", "lang"), Some("en".to_string()));
        assert_eq!(restored.lget("tags", 0), Some("a".to_string()));
        assert_eq!(restored.lget("tags", 1), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_load_replaces_rather_than_merges() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "dump.db");

        let engine = Arc::new(StorageEngine::new());
        let snapshotter = Snapshotter::new(Arc::clone(&engine));

        engine.set("saved", "1");
        snapshotter.save(&path, SnapshotFormat::Custom).await.unwrap();

        engine.set("added-later", "2");
        snapshotter.load(&path, SnapshotFormat::Custom).await.unwrap();

        assert_eq!(engine.get("saved"), Some("1".to_string()));
        assert_eq!(engine.get("added-later"), None);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "corrupt.db");

        // record count promises more than the file holds
        tokio::fs::write(&path, [5, 0, 0, 0, 0]).await.unwrap();

        let engine = Arc::new(StorageEngine::new());
        engine.set("existing", "value");

        let result = Snapshotter::new(Arc::clone(&engine))
            .load(&path, SnapshotFormat::Custom)
            .await;

        assert!(matches!(result, Err(SnapshotError::Corrupt(_))));
        assert_eq!(engine.get("existing"), Some("value".to_string()));
        assert_eq!(engine.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "does-not-exist.db");

        let engine = Arc::new(StorageEngine::new());
        engine.set("existing", "value");

        let result = Snapshotter::new(Arc::clone(&engine))
            .load(&path, SnapshotFormat::Custom)
            .await;

        assert!(matches!(result, Err(SnapshotError::Io(_))));
        assert_eq!(engine.len(), 1);
    }

    #[tokio::test]
    async fn test_save_to_unwritable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "missing-dir/dump.db");

        let engine = Arc::new(StorageEngine::new());
        engine.set("key", "value");

        let result = Snapshotter::new(Arc::clone(&engine))
            .save(&path, SnapshotFormat::Custom)
            .await;

        assert!(matches!(result, Err(SnapshotError::Io(_))));
        // The live store is never touched by save.
        assert_eq!(engine.get("key"), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_unimplemented_formats_fail_explicitly() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "dump.json");

        let engine = Arc::new(StorageEngine::new());
        let snapshotter = Snapshotter::new(Arc::clone(&engine));

        for format in [SnapshotFormat::Json, SnapshotFormat::Csv] {
            let saved = snapshotter.save(&path, format).await;
            assert!(matches!(saved, Err(SnapshotError::NotImplemented(_))));

            let loaded = snapshotter.load(&path, format).await;
            assert!(matches!(loaded, Err(SnapshotError::NotImplemented(_))));
        }

        // Nothing was ever written.
        assert!(tokio::fs::metadata(&path).await.is_err());
    }
}
