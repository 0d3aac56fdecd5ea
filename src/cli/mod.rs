use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

pub mod commands;

#[derive(Parser)]
#[command(name = "clinic-ops")]
#[command(about = "Operational analytics and maintenance for the clinic record store")]
#[command(long_about = "clinic-ops turns the clinic's transactional records into decision-grade \
                       metrics (period KPIs, rankings, health scores) and runs maintenance \
                       actions (backups, log retention) with explicit partial-failure reporting.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HealthFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display daily and monthly statistics, optionally with a period KPI report
    Stats {
        /// Day to report instead of today
        #[arg(long, help = "Day to report instead of today (YYYY-MM-DD)")]
        date: Option<NaiveDate>,
        /// Start of an explicit KPI window
        #[arg(long, requires = "to", help = "Window start for a period KPI report (YYYY-MM-DD)")]
        from: Option<NaiveDate>,
        /// End of an explicit KPI window
        #[arg(long, requires = "from", help = "Window end for a period KPI report (YYYY-MM-DD)")]
        to: Option<NaiveDate>,
        /// Ranked-patient list length for the KPI report
        #[arg(long, default_value = "5", help = "How many ranked patients to list")]
        top: i64,
    },
    /// Run system health checks and print the weighted score
    Health {
        /// Output format
        #[arg(long, value_enum, default_value = "text", help = "Output format: text or json")]
        format: HealthFormat,
        /// Show component details even when healthy
        #[arg(long, short = 'v', help = "Show component details even when healthy")]
        verbose: bool,
    },
    /// Export a point-in-time snapshot of the record store
    Backup,
    /// Delete log files older than the retention window
    Cleanup {
        /// Retention window in days
        #[arg(long, help = "Retention window in days (defaults to configuration)")]
        retention_days: Option<u32>,
    },
}
