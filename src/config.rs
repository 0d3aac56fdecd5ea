use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for clinic-ops
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ClinicOpsConfig {
    /// Record store settings
    pub database: DatabaseConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Health-scoring policy table
    pub health: HealthConfig,
    /// Backup and log-retention settings
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path of the clinic record store
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ".clinic-ops/clinic.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON-structured log lines instead of plain text
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Tier floors for a free-percentage probe: at or above `excellent` is
/// excellent, then `good`, then `warning`; below `warning` is critical.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct FreeTiers {
    pub excellent: f64,
    pub good: f64,
    pub warning: f64,
}

impl Default for FreeTiers {
    fn default() -> Self {
        Self {
            excellent: 80.0,
            good: 50.0,
            warning: 20.0,
        }
    }
}

/// Latency ceilings in milliseconds: at or below `excellent` is excellent,
/// then `good`, then `warning`; above `warning` is critical.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyTiers {
    pub excellent: u64,
    pub good: u64,
    pub warning: u64,
}

impl Default for LatencyTiers {
    fn default() -> Self {
        Self {
            excellent: 100,
            good: 500,
            warning: 1000,
        }
    }
}

/// Score assigned to each tier, 0-100.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct BandScores {
    pub excellent: f64,
    pub good: f64,
    pub warning: f64,
    pub critical: f64,
}

impl Default for BandScores {
    fn default() -> Self {
        Self {
            excellent: 100.0,
            good: 75.0,
            warning: 50.0,
            critical: 25.0,
        }
    }
}

/// Relative weight of each component in the overall score. Equal weighting
/// is the default and a deliberate choice, kept here rather than hidden in
/// the scoring fold.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub database: f64,
    pub storage: f64,
    pub memory: f64,
    pub performance: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            database: 1.0,
            storage: 1.0,
            memory: 1.0,
            performance: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Hard timeout for the database sample query, in milliseconds
    pub db_timeout_ms: u64,
    /// Latency up to which the database probe scores full marks
    pub db_latency_threshold_ms: u64,
    /// Filesystem path probed for free space (the persistence volume)
    pub storage_path: String,
    pub storage_free_tiers: FreeTiers,
    pub memory_free_tiers: FreeTiers,
    pub latency_tiers_ms: LatencyTiers,
    pub band_scores: BandScores,
    pub weights: ComponentWeights,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            db_timeout_ms: 5_000,
            db_latency_threshold_ms: 100,
            storage_path: ".".to_string(),
            storage_free_tiers: FreeTiers::default(),
            // Memory runs against a lower floor than storage: systems
            // routinely sit near full RAM utilization.
            memory_free_tiers: FreeTiers {
                excellent: 50.0,
                good: 30.0,
                warning: 15.0,
            },
            latency_tiers_ms: LatencyTiers::default(),
            band_scores: BandScores::default(),
            weights: ComponentWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Directory receiving backup artifacts
    pub backup_dir: String,
    /// Directory scanned by log cleanup
    pub log_dir: String,
    /// Retention window applied when the CLI gives none
    pub default_retention_days: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            backup_dir: ".clinic-ops/backups".to_string(),
            log_dir: ".clinic-ops/logs".to_string(),
            default_retention_days: 90,
        }
    }
}

impl ClinicOpsConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (clinic-ops.toml)
    /// 3. Environment variables (prefixed with CLINIC_OPS_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("clinic-ops.toml").exists() {
            builder = builder.add_source(File::with_name("clinic-ops"));
        }

        builder = builder.add_source(
            Environment::with_prefix("CLINIC_OPS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let clinic_ops_config: ClinicOpsConfig = config.try_deserialize()?;
        Ok(clinic_ops_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<ClinicOpsConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = ClinicOpsConfig::load_env_file();
        ClinicOpsConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static ClinicOpsConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
