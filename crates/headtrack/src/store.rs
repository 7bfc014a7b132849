//! Record store for headtrack.
//!
//! This module persists the full machine inventory as a single
//! pretty-printed JSON array. There is no indexing and no partial write:
//! every operation reads the whole file and mutating operations write the
//! whole file back. Loads are fail-open (a missing or malformed file is an
//! empty inventory); saves go through a temp file renamed over the target,
//! and mutations serialize on an internal lock so overlapping requests
//! cannot silently drop each other's writes.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::MachineRecord;

/// Flat-file store holding the full machine inventory.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Serializes load-mutate-save cycles across mutating callers.
    write_lock: Mutex<()>,
}

impl Store {
    /// Open a store backed by the given database file.
    ///
    /// Creates the parent directories if they don't exist. The database
    /// file itself is created lazily on the first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opened record store at {}", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full inventory.
    ///
    /// A missing file or malformed content yields an empty inventory
    /// rather than an error; corruption is logged at warn level.
    #[must_use]
    pub fn load(&self) -> Vec<MachineRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "Malformed database at {}, treating as empty: {}",
                    self.path.display(),
                    err
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the persisted inventory with the given records.
    ///
    /// The records are serialized as pretty JSON to a temp file beside the
    /// target and renamed over it, so readers never observe a half-written
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, records: &[MachineRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| Error::StoreWrite {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| Error::StoreWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            "Saved {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Run a mutating operation over the full inventory.
    ///
    /// Holds the store's write lock across load, closure, and save, so
    /// concurrent mutations serialize instead of last-writer-wins. The
    /// save is skipped when the closure fails, leaving the persisted file
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a save error.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut Vec<MachineRecord>) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock();

        let mut records = self.load();
        let out = f(&mut records)?;
        self.save(&records)?;
        Ok(out)
    }

    /// Number of records currently persisted.
    #[must_use]
    pub fn count(&self) -> usize {
        self.load().len()
    }

    /// Log a one-line summary of the store, for startup diagnostics.
    pub fn log_summary(&self) {
        info!(
            "Record store at {} holds {} records",
            self.path.display(),
            self.count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MachineFields;

    fn test_store(name: &str) -> Store {
        let path = std::env::temp_dir().join(format!(
            "headtrack_store_{}_{}.json",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        Store::open(&path).expect("failed to create test store")
    }

    fn record(head_number: &str) -> MachineRecord {
        MachineRecord::create(
            MachineFields {
                head_number: head_number.to_string(),
                ..MachineFields::default()
            },
            "1".to_string(),
        )
    }

    fn cleanup(store: &Store) {
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = test_store("missing");
        assert!(store.load().is_empty());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let store = test_store("malformed");
        fs::write(store.path(), "this is not json").unwrap();

        assert!(store.load().is_empty());
        cleanup(&store);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = test_store("round_trip");
        let records = vec![record("H1"), record("H2")];

        store.save(&records).unwrap();
        let loaded = store.load();

        assert_eq!(loaded, records);
        cleanup(&store);
    }

    #[test]
    fn test_save_writes_pretty_json() {
        let store = test_store("pretty");
        store.save(&[record("H1")]).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains('\n'));
        assert!(contents.contains("\"Head Number\": \"H1\""));
        cleanup(&store);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let store = test_store("tmp");
        store.save(&[record("H1")]).unwrap();

        assert!(!store.path().with_extension("json.tmp").exists());
        cleanup(&store);
    }

    #[test]
    fn test_update_applies_and_persists() {
        let store = test_store("update");
        store.save(&[record("H1")]).unwrap();

        store
            .update(|records| {
                records.push(record("H2"));
                Ok(())
            })
            .unwrap();

        assert_eq!(store.count(), 2);
        cleanup(&store);
    }

    #[test]
    fn test_update_failure_does_not_save() {
        let store = test_store("update_failure");
        store.save(&[record("H1")]).unwrap();

        let result: Result<()> = store.update(|records| {
            records.clear();
            Err(Error::machine_not_found("H9"))
        });

        assert!(result.is_err());
        assert_eq!(store.count(), 1);
        cleanup(&store);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let nested = std::env::temp_dir().join(format!(
            "headtrack_store_nested_{}/deep/database.json",
            std::process::id()
        ));
        if let Some(parent) = nested.parent() {
            let _ = fs::remove_dir_all(parent);
        }

        let store = Store::open(&nested).unwrap();
        store.save(&[record("H1")]).unwrap();
        assert!(nested.exists());

        if let Some(parent) = nested.parent() {
            let _ = fs::remove_dir_all(parent.parent().unwrap());
        }
    }

    #[test]
    fn test_concurrent_updates_serialize() {
        let store = std::sync::Arc::new(test_store("concurrent"));
        store.save(&[]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .update(|records| {
                            records.push(record(&format!("H{i}")));
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.count(), 8);
        cleanup(&store);
    }
}
