use crate::cli::HealthFormat;
use crate::config;
use crate::health::{ComponentStatus, HealthReport, HealthScorer};
use anyhow::Result;

/// `clinic-ops health`: run the four probes and print the weighted score.
/// Returns `false` (non-zero exit) when the overall status is critical.
pub async fn run(format: HealthFormat, verbose: bool) -> Result<bool> {
    let config = config::config()?;
    let store = super::open_store().await?;
    let scorer = HealthScorer::from_config(store, &config.health);
    let report = scorer.check().await;

    match format {
        HealthFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        HealthFormat::Text => print_text_report(&report, verbose),
    }

    Ok(!report.is_critical())
}

fn status_icon(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Excellent | ComponentStatus::Good => "✅",
        ComponentStatus::Warning => "⚠️ ",
        ComponentStatus::Critical => "❌",
        ComponentStatus::Unknown => "❓",
    }
}

fn print_text_report(report: &HealthReport, verbose: bool) {
    println!("🔎 CLINIC-OPS HEALTH CHECK");
    println!("{}", "=".repeat(50));
    if let Some(host) = &report.host {
        println!("🖥️  Host: {host}");
    }
    println!(
        "🎯 Overall score: {:.1}/100 ({})",
        report.overall_score, report.status
    );
    println!();

    for component in &report.components {
        println!(
            "{} {}: {} ({:.0}/100)",
            status_icon(component.status),
            component.component,
            component.status,
            component.score
        );
        let show_detail =
            verbose || !matches!(component.status, ComponentStatus::Excellent | ComponentStatus::Good);
        if show_detail {
            if let Some(detail) = &component.detail {
                println!("   Details: {detail}");
            }
            if let Some(error) = &component.error {
                println!("   Error: {error}");
            }
        }
    }

    println!();
    println!("💡 RECOMMENDATION: {}", report.recommendation);
}
