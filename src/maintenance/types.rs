use crate::telemetry::generate_correlation_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Lifecycle of one maintenance invocation.
///
/// `Failed` means the run never got going (target unwritable, lock
/// unobtainable). Once running, item-level errors end the run in
/// `CompletedWithErrors`, never `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceState {
    Idle,
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

/// One tracked maintenance run with its correlation id.
#[derive(Debug, Clone)]
pub struct MaintenanceRun {
    pub id: String,
    pub operation: &'static str,
    pub started_at: DateTime<Utc>,
    state: MaintenanceState,
}

impl MaintenanceRun {
    pub fn new(operation: &'static str) -> Self {
        Self {
            id: generate_correlation_id(),
            operation,
            started_at: Utc::now(),
            state: MaintenanceState::Idle,
        }
    }

    pub fn state(&self) -> MaintenanceState {
        self.state
    }

    pub fn start(&mut self) {
        if self.state != MaintenanceState::Idle {
            warn!(
                operation = self.operation,
                state = ?self.state,
                "start on a non-idle maintenance run"
            );
        }
        self.state = MaintenanceState::Running;
    }

    /// End a running operation; the number of item errors decides between
    /// the two completed states.
    pub fn finish(&mut self, item_errors: usize) {
        self.state = if item_errors == 0 {
            MaintenanceState::Completed
        } else {
            MaintenanceState::CompletedWithErrors
        };
    }

    pub fn fail(&mut self) {
        self.state = MaintenanceState::Failed;
    }
}

/// Outcome of a backup invocation. Never thrown: failures are carried in
/// `success`/`error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupResult {
    pub success: bool,
    pub state: MaintenanceState,
    pub path: Option<PathBuf>,
    pub size_bytes: Option<u64>,
    pub error: Option<String>,
    pub correlation_id: String,
}

/// One filesystem entry the cleanup could not delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemError {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a log-retention run. A populated `errors` list with a
/// non-zero `deleted_count` is the normal shape of partial success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResult {
    pub state: MaintenanceState,
    pub deleted_count: usize,
    pub errors: Vec<ItemError>,
    pub correlation_id: String,
}

impl CleanupResult {
    pub fn succeeded(&self) -> bool {
        self.state != MaintenanceState::Failed
    }
}
