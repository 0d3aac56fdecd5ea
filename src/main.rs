use anyhow::Result;
use clap::Parser;

use clinic_ops::cli::{commands, Cli, Commands};
use clinic_ops::{config, telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let configuration = config::config()?;
    telemetry::init_telemetry(&configuration.observability)?;

    let success = tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::Stats {
                date,
                from,
                to,
                top,
            } => commands::stats::run(date, from, to, top).await,
            Commands::Health { format, verbose } => commands::health::run(format, verbose).await,
            Commands::Backup => commands::backup::run().await,
            Commands::Cleanup { retention_days } => commands::cleanup::run(retention_days).await,
        }
    })?;

    // Non-zero exit for success=false, CompletedWithErrors, or a critical
    // health score; hard data-access errors already returned Err above.
    if !success {
        std::process::exit(1);
    }
    Ok(())
}
