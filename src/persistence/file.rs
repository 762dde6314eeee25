use super::{PersistenceError, SnapshotGateway, decode_snapshot, encode_snapshot};
use crate::models::Store;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::ErrorKind;

/// Stores the snapshot as a single JSON file.
///
/// Saves write a sibling `.tmp` file and rename it over the target, so a crash
/// mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: Utf8PathBuf,
}

impl JsonFileGateway {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn temp_path(&self) -> Utf8PathBuf {
        let mut name = self.path.file_name().unwrap_or("snapshot").to_string();
        name.push_str(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotGateway for JsonFileGateway {
    fn load(&self) -> Result<Option<Store>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No snapshot at {}", self.path);
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let store = decode_snapshot(&contents)?;
        tracing::info!(
            "Loaded snapshot from {} ({} subjects)",
            self.path,
            store.subjects.len()
        );
        Ok(Some(store))
    }

    fn save(&self, store: &Store) -> Result<(), PersistenceError> {
        let json = encode_snapshot(store)?;
        let write_error = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(write_error)?;
            }
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).map_err(write_error)?;
        fs::rename(&temp_path, &self.path).map_err(write_error)?;

        tracing::debug!("Saved snapshot to {}", self.path);
        Ok(())
    }
}
