//! Registry actions: start, status, stop, restart
//!
//! Every action runs to completion synchronously within one control-mode
//! invocation. There is no waiting on the managed child: a started
//! process is released immediately, a stopped process is signaled and
//! forgotten.

use crate::process::{self, DetachedChild};
use crate::record::ProcessRecord;
use crate::registry::RegistryStore;
use crate::{DetachError, Result};
use chrono::Utc;
use tracing::{error, warn};

/// Executes registry actions against one store.
#[derive(Debug)]
pub struct Controller {
    store: RegistryStore,
}

impl Controller {
    pub fn new(store: RegistryStore) -> Self {
        Self { store }
    }

    /// Spawn `clean_args` as a detached process and register it.
    ///
    /// The first element is the program (in a control invocation that is
    /// its own argv[0], so the same executable re-runs without the detach
    /// flag); the rest become the child's arguments. If the registry
    /// write fails after the spawn succeeded, the child is killed before
    /// the error is returned: an untracked detached process must not
    /// survive a failed start.
    pub fn start(&self, clean_args: &[String]) -> Result<()> {
        let (program, rest) = clean_args.split_first().ok_or_else(|| {
            DetachError::MissingCommand("empty argument list, nothing to run".to_string())
        })?;

        println!("running in detached mode");

        let start_time = Utc::now();
        let mut child: DetachedChild = process::spawn_detached(program, rest)?;

        let record = ProcessRecord {
            pid: child.pid(),
            args: clean_args.to_vec(),
            start_time,
        };

        if let Err(persist_err) = self.store.write(&record) {
            warn!(
                "failed to persist record for pid {}, terminating child: {}",
                record.pid, persist_err
            );
            if let Err(kill_err) = child.kill_and_reap() {
                error!("containment kill failed: {}", kill_err);
            }
            return Err(persist_err);
        }

        child.release();
        Ok(())
    }

    /// List every record in the registry, stale ones included.
    ///
    /// Never fails: enumeration errors are swallowed at the registry
    /// layer and an empty registry is reported, not an error.
    pub fn status(&self) -> Result<()> {
        let records = self.store.enumerate();
        if records.is_empty() {
            println!("no processes running");
            return Ok(());
        }

        for (i, record) in records.iter().enumerate() {
            println!("{}", self.describe(i + 1, record));
        }
        Ok(())
    }

    /// Stop every registered process, best effort.
    ///
    /// For each record the registry file is deleted first, then the pid
    /// is signaled; there is no rollback if the kill fails afterwards.
    /// Failures from either step are collected and returned as one
    /// aggregate error once all records have been processed.
    pub fn stop(&self) -> Result<()> {
        let records = self.store.enumerate();
        if records.is_empty() {
            println!("no processes running");
            return Ok(());
        }

        let mut failures: Vec<String> = Vec::new();
        for record in &records {
            if let Err(e) = self.store.delete(record) {
                failures.push(e.to_string());
                continue;
            }
            if let Err(e) = process::signal_kill(record.pid) {
                failures.push(e.to_string());
            }
        }

        if failures.is_empty() {
            println!("processes stopped");
            Ok(())
        } else {
            Err(DetachError::StopFailed(failures.join(", ")))
        }
    }

    /// Stop everything, then start again with the *current* invocation's
    /// clean args — not the arguments any stopped process was recorded
    /// with. A failed stop aborts the restart.
    pub fn restart(&self, clean_args: &[String]) -> Result<()> {
        self.stop()?;
        self.start(clean_args)
    }

    /// Render one status entry: pid, registry file, args, start time and
    /// elapsed duration.
    fn describe(&self, index: usize, record: &ProcessRecord) -> String {
        let elapsed = record.elapsed().to_std().unwrap_or_default();
        format!(
            "{sep}\nProcess #{index}\n{sep}\nPID: {pid}\nPID File: {path}\nArgs: {args}\nStarted: {started}\nDuration: {elapsed:?}",
            sep = "=".repeat(60),
            pid = record.pid,
            path = self.store.record_path(record.pid).display(),
            args = record.args.join(" "),
            started = record.start_time,
        )
    }
}
