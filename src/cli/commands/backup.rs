use crate::config;
use crate::maintenance::BackupService;
use anyhow::Result;

/// `clinic-ops backup`: export a snapshot of the record store. Returns the
/// result's success flag; failures are printed, never thrown.
pub async fn run() -> Result<bool> {
    let config = config::config()?;
    let store = super::open_store().await?;
    let service = BackupService::new(store, &config.maintenance);

    println!("💾 RECORD STORE BACKUP");
    println!("{}", "=".repeat(50));

    let result = service.backup().await;
    if result.success {
        println!("✅ Backup created successfully");
        if let Some(path) = &result.path {
            println!("📁 Artifact: {}", path.display());
        }
        if let Some(size_bytes) = result.size_bytes {
            println!("💾 Size: {:.2} MB", size_bytes as f64 / 1024.0 / 1024.0);
        }
    } else {
        println!(
            "❌ Backup failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(result.success)
}
