//! Filesystem-backed registry of detached processes
//!
//! Every tracked process is one JSON file named `<pid>_detach.pid` in a
//! shared directory. The directory is shared by all instances of the host
//! program on the machine; there is no locking, and records whose process
//! died without cleaning up (stale records) are tolerated — enumeration
//! never verifies liveness.

use crate::record::{ProcessRecord, PID_FILE_SUFFIX};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Store for registry records in one shared directory.
///
/// The directory is explicit state rather than an ambient global; the
/// default store uses the system temp directory, which is what makes
/// independently-started instances discover each other.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    dir: PathBuf,
}

impl RegistryStore {
    /// Store rooted at an explicit directory (tests, custom namespaces)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the machine-shared temp directory
    pub fn shared() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Directory this store reads and writes
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `pid`: `<dir>/<pid>_detach.pid`
    pub fn record_path(&self, pid: i32) -> PathBuf {
        self.dir.join(format!("{}_{}", pid, PID_FILE_SUFFIX))
    }

    /// Serialize and write a record to its registry path.
    ///
    /// Serialization and I/O errors are propagated; the caller decides
    /// what to do with the process the record describes.
    pub fn write(&self, record: &ProcessRecord) -> Result<()> {
        let data = serde_json::to_vec(record)?;
        let path = self.record_path(record.pid);
        fs::write(&path, data)?;
        debug!("wrote registry record {:?}", path);
        Ok(())
    }

    /// Enumerate all decodable records in the registry directory.
    ///
    /// A failure to read the directory yields an empty list. Entries that
    /// cannot be opened or decoded are logged and skipped; they do not
    /// abort enumeration. Order is whatever the directory listing yields.
    pub fn enumerate(&self) -> Vec<ProcessRecord> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to read registry directory {:?}: {}", self.dir, e);
                return Vec::new();
            }
        };

        let mut records = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(PID_FILE_SUFFIX) {
                continue;
            }
            if entry.path().is_dir() {
                continue;
            }
            let data = match fs::read(entry.path()) {
                Ok(data) => data,
                Err(e) => {
                    warn!("skipping unreadable record {:?}: {}", entry.path(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<ProcessRecord>(&data) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("skipping undecodable record {:?}: {}", entry.path(), e);
                }
            }
        }
        records
    }

    /// Remove a record's file, propagating filesystem errors
    pub fn delete(&self, record: &ProcessRecord) -> Result<()> {
        self.delete_pid(record.pid)
    }

    /// Remove the record file for `pid`, propagating filesystem errors
    pub fn delete_pid(&self, pid: i32) -> Result<()> {
        let path = self.record_path(pid);
        fs::remove_file(&path)?;
        debug!("removed registry record {:?}", path);
        Ok(())
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::shared()
    }
}
