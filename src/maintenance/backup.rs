use super::types::{BackupResult, MaintenanceRun};
use crate::config::MaintenanceConfig;
use crate::observability::OperationTimer;
use crate::store::RecordStore;
use crate::telemetry::create_maintenance_span;
use rand::Rng;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Instrument};

const LOCK_FILE: &str = ".backup.lock";
const LOCK_ATTEMPTS: u32 = 5;

/// Point-in-time export of the record store to a timestamped artifact.
///
/// A scoped file lock on the backup directory serializes concurrent
/// invocations; the guard is released on every exit path. The export
/// itself goes through the store's native snapshot primitive, so readers
/// of the live database are never blocked.
pub struct BackupService {
    store: Arc<dyn RecordStore>,
    backup_dir: PathBuf,
}

impl BackupService {
    pub fn new(store: Arc<dyn RecordStore>, config: &MaintenanceConfig) -> Self {
        Self {
            store,
            backup_dir: PathBuf::from(&config.backup_dir),
        }
    }

    pub async fn backup(&self) -> BackupResult {
        let run = MaintenanceRun::new("backup");
        let span = create_maintenance_span("backup", &run.id);
        self.backup_inner(run).instrument(span).await
    }

    async fn backup_inner(&self, mut run: MaintenanceRun) -> BackupResult {
        if let Err(e) = std::fs::create_dir_all(&self.backup_dir) {
            run.fail();
            error!("backup target unavailable: {e}");
            return Self::failed(run, format!("backup target unavailable: {e}"));
        }

        let lock_path = self.backup_dir.join(LOCK_FILE);
        let lock_file = match OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) => {
                run.fail();
                return Self::failed(run, format!("cannot open lock file: {e}"));
            }
        };

        let mut lock = fd_lock::RwLock::new(lock_file);
        let guard = match Self::acquire(&mut lock).await {
            Ok(guard) => guard,
            Err(e) => {
                run.fail();
                return Self::failed(run, e);
            }
        };

        run.start();
        let timer = OperationTimer::new("maintenance.backup");
        let stamp = run.started_at.format("%Y%m%d-%H%M%S");
        let artifact = self
            .backup_dir
            .join(format!("clinic-backup-{stamp}-{}.sqlite3", &run.id[..8]));

        if let Err(e) = self.store.export_snapshot(&artifact).await {
            run.fail();
            error!("snapshot export failed: {e}");
            drop(guard);
            return Self::failed(run, e.to_string());
        }

        let size_bytes = std::fs::metadata(&artifact).map(|m| m.len()).ok();
        let duration_ms = timer.finish();
        run.finish(0);
        drop(guard);

        info!(
            path = %artifact.display(),
            size_bytes,
            duration_ms,
            "backup completed"
        );
        BackupResult {
            success: true,
            state: run.state(),
            path: Some(artifact),
            size_bytes,
            error: None,
            correlation_id: run.id,
        }
    }

    /// Take the write lock, retrying briefly with jitter. The guard cannot
    /// be returned from inside the retry loop (it would pin the borrow), so
    /// the loop probes and the lock is taken once at the end.
    async fn acquire(
        lock: &mut fd_lock::RwLock<std::fs::File>,
    ) -> Result<fd_lock::RwLockWriteGuard<'_, std::fs::File>, String> {
        for attempt in 1..LOCK_ATTEMPTS {
            if lock.try_write().is_ok() {
                break;
            }
            let jitter = rand::rng().random_range(0..50u64);
            tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt) + jitter)).await;
        }
        lock.try_write()
            .map_err(|e| format!("another backup is in progress: {e}"))
    }

    fn failed(run: MaintenanceRun, error: String) -> BackupResult {
        BackupResult {
            success: false,
            state: run.state(),
            path: None,
            size_bytes: None,
            error: Some(error),
            correlation_id: run.id,
        }
    }
}
