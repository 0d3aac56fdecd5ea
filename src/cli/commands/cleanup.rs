use crate::config;
use crate::maintenance::{LogCleanup, MaintenanceState};
use anyhow::Result;

/// `clinic-ops cleanup`: age out old log files. Exit code distinguishes
/// "nothing ran" (Failed) and "ran with issues" (CompletedWithErrors) from
/// a clean run; both of the former return `false`.
pub async fn run(retention_days: Option<u32>) -> Result<bool> {
    let config = config::config()?;
    let retention_days = retention_days.unwrap_or(config.maintenance.default_retention_days);
    let cleanup = LogCleanup::from_config(&config.maintenance);

    println!("🧹 LOG RETENTION CLEANUP");
    println!("{}", "=".repeat(50));
    println!("📁 Directory: {}", config.maintenance.log_dir);
    println!("🗓️  Retention: {retention_days} days");
    println!();

    let result = cleanup.cleanup_logs(retention_days);
    match result.state {
        MaintenanceState::Failed => {
            println!("❌ Cleanup could not start:");
            for error in &result.errors {
                println!("   - {}: {}", error.path.display(), error.message);
            }
            Ok(false)
        }
        state => {
            println!("🗑️  Deleted files: {}", result.deleted_count);
            if !result.errors.is_empty() {
                println!("⚠️  {} file(s) could not be deleted:", result.errors.len());
                for error in &result.errors {
                    println!("   - {}: {}", error.path.display(), error.message);
                }
            }
            println!();
            if state == MaintenanceState::Completed {
                println!("✅ Cleanup completed");
                Ok(true)
            } else {
                println!("⚠️  Cleanup completed with errors");
                Ok(false)
            }
        }
    }
}
