use crate::config::ObservabilityConfig;
use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging for the process.
///
/// RUST_LOG wins when set; otherwise the configured level applies. The JSON
/// layer is opt-in so interactive CLI runs stay readable.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone()));

    // Logs go to stderr: stdout belongs to command output (including the
    // machine-readable health report).
    if config.json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(filter)
            .init();
    }

    tracing::debug!("clinic-ops telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the attributes common to maintenance runs
pub fn create_maintenance_span(operation: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "maintenance",
        operation = operation,
        correlation.id = correlation_id,
    )
}
