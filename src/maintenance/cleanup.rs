use super::types::{CleanupResult, ItemError, MaintenanceRun};
use crate::config::MaintenanceConfig;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

/// Age-based retention over the log directory.
///
/// Each directly-contained entry is its own unit of work: one failed
/// deletion is collected as an item error and never stops the batch.
pub struct LogCleanup {
    log_dir: PathBuf,
}

impl LogCleanup {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self::new(&config.log_dir)
    }

    /// Delete entries last modified before `now - retention_days`.
    pub fn cleanup_logs(&self, retention_days: u32) -> CleanupResult {
        self.cleanup_logs_at(retention_days, SystemTime::now())
    }

    /// Same, against an explicit clock. Seam for deterministic tests.
    pub fn cleanup_logs_at(&self, retention_days: u32, now: SystemTime) -> CleanupResult {
        let mut run = MaintenanceRun::new("cleanup_logs");
        let retention = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
        let cutoff = now.checked_sub(retention).unwrap_or(UNIX_EPOCH);

        let entries = match std::fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(e) => {
                run.fail();
                error!(dir = %self.log_dir.display(), "log cleanup could not start: {e}");
                return CleanupResult {
                    state: run.state(),
                    deleted_count: 0,
                    errors: vec![ItemError {
                        path: self.log_dir.clone(),
                        message: e.to_string(),
                    }],
                    correlation_id: run.id,
                };
            }
        };

        run.start();
        let mut deleted_count = 0;
        let mut errors = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    errors.push(ItemError {
                        path: self.log_dir.clone(),
                        message: format!("unreadable directory entry: {e}"),
                    });
                    continue;
                }
            };
            let path = entry.path();

            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    errors.push(ItemError {
                        path,
                        message: format!("cannot read modification time: {e}"),
                    });
                    continue;
                }
            };

            if modified >= cutoff {
                continue;
            }

            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "deleted expired log");
                    deleted_count += 1;
                }
                Err(e) => {
                    errors.push(ItemError {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        run.finish(errors.len());
        info!(
            deleted_count,
            errors = errors.len(),
            retention_days,
            "log cleanup finished"
        );
        CleanupResult {
            state: run.state(),
            deleted_count,
            errors,
            correlation_id: run.id,
        }
    }
}
