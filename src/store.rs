// src/store.rs
//
// Persisted canonical series, one file per jurisdiction. The merger never
// touches this directly; the runner loads a snapshot, runs the pipeline,
// and only on full success writes the replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::sanitize::sanitize_jurisdiction_filename;
use crate::csv::{decode_snapshot, encode_snapshot};
use crate::error::{Error, Result};
use crate::model::Snapshot;

pub trait SnapshotStore: Send + Sync {
    /// Prior canonical series, or None on the first-ever run.
    fn load(&self, jurisdiction: &str) -> Result<Option<Snapshot>>;

    /// Replace the canonical series wholesale. Must be atomic: a crash
    /// mid-write may never leave a truncated file behind for `load`.
    fn save(&self, jurisdiction: &str, snapshot: &Snapshot) -> Result<PathBuf>;
}

/// CSV files under a data directory, `<jurisdiction>.csv` each.
pub struct CsvSnapshotStore {
    dir: PathBuf,
}

impl CsvSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, jurisdiction: &str) -> PathBuf {
        self.dir
            .join(format!("{}.csv", sanitize_jurisdiction_filename(jurisdiction)))
    }
}

impl SnapshotStore for CsvSnapshotStore {
    fn load(&self, jurisdiction: &str) -> Result<Option<Snapshot>> {
        let path = self.path_for(jurisdiction);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let records = decode_snapshot(&text)
            .map_err(|e| annotate(e, &path))?;
        Ok(Some(Snapshot::new(records)))
    }

    fn save(&self, jurisdiction: &str, snapshot: &Snapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        // Write to a sibling temp file, then rename over the target, so a
        // crash mid-write leaves the previous snapshot intact.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(encode_snapshot(snapshot).as_bytes())?;
        tmp.flush()?;

        let path = self.path_for(jurisdiction);
        tmp.persist(&path).map_err(|e| Error::Io(e.error))?;
        Ok(path)
    }
}

fn annotate(e: Error, path: &Path) -> Error {
    match e {
        Error::Parse(msg) => Error::Parse(format!("{}: {msg}", path.display())),
        other => other,
    }
}
