// clinic-ops - Operational analytics & health scoring for a clinic record store
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod health;
pub mod kpi;
pub mod maintenance;
pub mod observability;
pub mod stats;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{config, init_config, ClinicOpsConfig, HealthConfig, MaintenanceConfig};
pub use health::{ComponentStatus, HealthReport, HealthScorer};
pub use kpi::{KpiEngine, KpiReport, PeriodWindow, RankedPatient};
pub use maintenance::{BackupResult, BackupService, CleanupResult, LogCleanup, MaintenanceState};
pub use observability::{store_metrics, OperationTimer, StoreMetrics};
pub use stats::{DailyStats, MonthlyStats, StatisticsEngine};
pub use store::{MemoryRecordStore, RecordStore, SqliteRecordStore, StoreError};
pub use telemetry::{generate_correlation_id, init_telemetry};
