use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use courtwatch_core::errors::{WatchError, WatchResult};
use courtwatch_core::models::{Slot, SlotRecord, SlotSet, Snapshot, SnapshotMeta};
use courtwatch_core::traits::SnapshotStore;

/// Snapshot kept as two JSON files: the slot list and a metadata sidecar.
///
/// The slot file is a plain list of `["YYYY-MM-DD", "HHMM", court]` records.
/// Both files are replaced by write-then-rename, so readers never observe a
/// half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    slots_path: PathBuf,
    meta_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(slots_path: impl Into<PathBuf>, meta_path: impl Into<PathBuf>) -> Self {
        Self {
            slots_path: slots_path.into(),
            meta_path: meta_path.into(),
        }
    }

    pub fn slots_path(&self) -> &Path {
        &self.slots_path
    }

    pub fn meta_path(&self) -> &Path {
        &self.meta_path
    }

    /// `None` when the slot file is missing or cannot be decoded.
    fn load_slots(&self) -> Option<SlotSet> {
        let records = read_json::<Vec<SlotRecord>>(&self.slots_path)?;

        let slots: SlotSet = records
            .into_iter()
            .filter_map(|record| match Slot::try_from(record) {
                Ok(slot) => Some(slot),
                Err(e) => {
                    warn!("Skipping unreadable cached slot: {e}");
                    None
                }
            })
            .collect();
        Some(slots)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, today: NaiveDate) -> Snapshot {
        // Metadata without its slot set would make an empty baseline look fresh
        let Some(mut available) = self.load_slots() else {
            if self.meta_path.exists() {
                warn!("Discarding snapshot metadata at {} because the slot file is unusable", self.meta_path.display());
            }
            return Snapshot::default();
        };
        let pruned = available.prune_before(today);
        if pruned > 0 {
            debug!(pruned, "Dropped cached slots dated before {today}");
        }

        let meta = read_json::<SnapshotMeta>(&self.meta_path).unwrap_or_default();
        Snapshot::new(available, meta)
    }

    fn save(&self, snapshot: &Snapshot) -> WatchResult<()> {
        write_json_atomic(&self.slots_path, &snapshot.available)?;
        write_json_atomic(&self.meta_path, &snapshot.meta)?;
        debug!(
            slots = snapshot.available.len(),
            path = %self.slots_path.display(),
            "Saved snapshot"
        );
        Ok(())
    }
}

/// Read and decode `path`, treating a missing or corrupt file as absent.
fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No cached state at {}, starting fresh", path.display());
            return None;
        }
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt cache file {}: {e}", path.display());
            None
        }
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> WatchResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    file.as_file().sync_all()?;
    file.persist(path)
        .map_err(|e| WatchError::Storage(format!("could not replace {}: {}", path.display(), e.error)))?;
    Ok(())
}
