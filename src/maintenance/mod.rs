pub mod backup;
pub mod cleanup;
pub mod types;

pub use backup::BackupService;
pub use cleanup::LogCleanup;
pub use types::{BackupResult, CleanupResult, ItemError, MaintenanceRun, MaintenanceState};
