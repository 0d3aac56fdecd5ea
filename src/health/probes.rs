use super::types::{status_for_score, Component, ComponentStatus};
use crate::config::{BandScores, FreeTiers, HealthConfig, LatencyTiers};
use crate::observability::{store_metrics, OperationTimer};
use crate::store::RecordStore;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// What one probe reports: a status label and a 0-100 score, with optional
/// human-readable detail.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub status: ComponentStatus,
    pub score: f64,
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn new(status: ComponentStatus, score: f64) -> Self {
        Self {
            status,
            score,
            detail: None,
            error: None,
        }
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    /// The probe could not execute. It still counts in the mean, at 0.
    pub fn unknown(error: String) -> Self {
        Self {
            status: ComponentStatus::Unknown,
            score: 0.0,
            detail: None,
            error: Some(error),
        }
    }
}

/// Measurements shared across probes within one health check. The database
/// probe deposits its latency sample; the performance probe buckets it.
#[derive(Debug, Default)]
pub struct ProbeContext {
    pub db_latency_ms: Option<u64>,
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    fn component(&self) -> Component;
    async fn run(&self, ctx: &mut ProbeContext) -> ProbeOutcome;
}

fn score_free_percentage(free_pct: f64, tiers: &FreeTiers, bands: &BandScores) -> (ComponentStatus, f64) {
    if free_pct >= tiers.excellent {
        (ComponentStatus::Excellent, bands.excellent)
    } else if free_pct >= tiers.good {
        (ComponentStatus::Good, bands.good)
    } else if free_pct >= tiers.warning {
        (ComponentStatus::Warning, bands.warning)
    } else {
        (ComponentStatus::Critical, bands.critical)
    }
}

fn score_latency(latency_ms: u64, tiers: &LatencyTiers, bands: &BandScores) -> (ComponentStatus, f64) {
    if latency_ms <= tiers.excellent {
        (ComponentStatus::Excellent, bands.excellent)
    } else if latency_ms <= tiers.good {
        (ComponentStatus::Good, bands.good)
    } else if latency_ms <= tiers.warning {
        (ComponentStatus::Warning, bands.warning)
    } else {
        (ComponentStatus::Critical, bands.critical)
    }
}

/// Record-store responsiveness: a bounded sample query under a hard timeout.
pub struct DatabaseProbe {
    store: Arc<dyn RecordStore>,
    timeout: Duration,
    latency_threshold_ms: u64,
    full_score: f64,
}

impl DatabaseProbe {
    pub fn new(store: Arc<dyn RecordStore>, config: &HealthConfig) -> Self {
        Self {
            store,
            timeout: Duration::from_millis(config.db_timeout_ms),
            latency_threshold_ms: config.db_latency_threshold_ms.max(1),
            full_score: config.band_scores.excellent,
        }
    }
}

#[async_trait]
impl HealthProbe for DatabaseProbe {
    fn component(&self) -> Component {
        Component::Database
    }

    async fn run(&self, ctx: &mut ProbeContext) -> ProbeOutcome {
        let timer = OperationTimer::new("health.database_probe");
        match tokio::time::timeout(self.timeout, self.store.record_counts()).await {
            Ok(Ok(counts)) => {
                let latency_ms = timer.finish();
                ctx.db_latency_ms = Some(latency_ms);
                store_metrics().record_query(latency_ms);

                // Full marks up to the threshold, monotonic decay past it.
                let score = if latency_ms <= self.latency_threshold_ms {
                    self.full_score
                } else {
                    self.full_score * self.latency_threshold_ms as f64 / latency_ms as f64
                };
                ProbeOutcome::new(status_for_score(score), score).with_detail(format!(
                    "{} patients, {} consultations sampled in {}ms",
                    counts.patients, counts.consultations, latency_ms
                ))
            }
            Ok(Err(e)) => {
                store_metrics().record_error();
                warn!("database probe failed: {e}");
                ProbeOutcome::unknown(e.to_string())
            }
            Err(_) => {
                store_metrics().record_error();
                warn!("database probe timed out after {:?}", self.timeout);
                ProbeOutcome {
                    status: ComponentStatus::Critical,
                    score: 0.0,
                    detail: None,
                    error: Some(format!(
                        "sample query timed out after {}ms",
                        self.timeout.as_millis()
                    )),
                }
            }
        }
    }
}

/// Free-space percentage of the persistence volume, via `df`.
pub struct StorageProbe {
    path: PathBuf,
    tiers: FreeTiers,
    bands: BandScores,
}

impl StorageProbe {
    pub fn new(config: &HealthConfig) -> Self {
        Self {
            path: PathBuf::from(&config.storage_path),
            tiers: config.storage_free_tiers,
            bands: config.band_scores,
        }
    }

    fn free_space(&self) -> Option<(f64, f64)> {
        let output = Command::new("df").arg("-Pk").arg(&self.path).output().ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().nth(1)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let total_kb: f64 = parts.get(1)?.parse().ok()?;
        let available_kb: f64 = parts.get(3)?.parse().ok()?;
        if total_kb <= 0.0 {
            return None;
        }
        Some((
            available_kb / total_kb * 100.0,
            available_kb / 1024.0 / 1024.0,
        ))
    }
}

#[async_trait]
impl HealthProbe for StorageProbe {
    fn component(&self) -> Component {
        Component::Storage
    }

    async fn run(&self, _ctx: &mut ProbeContext) -> ProbeOutcome {
        match self.free_space() {
            Some((free_pct, free_gb)) => {
                let (status, score) = score_free_percentage(free_pct, &self.tiers, &self.bands);
                ProbeOutcome::new(status, score)
                    .with_detail(format!("{free_pct:.1}% free ({free_gb:.1} GB)"))
            }
            None => ProbeOutcome::unknown("could not determine free disk space".to_string()),
        }
    }
}

/// Available-memory percentage, from /proc/meminfo.
pub struct MemoryProbe {
    tiers: FreeTiers,
    bands: BandScores,
}

impl MemoryProbe {
    pub fn new(config: &HealthConfig) -> Self {
        Self {
            tiers: config.memory_free_tiers,
            bands: config.band_scores,
        }
    }

    fn parse_meminfo(meminfo: &str, field: &str) -> Option<u64> {
        for line in meminfo.lines() {
            if line.starts_with(field) {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 2 {
                    return parts[1].parse::<u64>().ok();
                }
            }
        }
        None
    }

    fn available_memory(&self) -> Option<(f64, f64)> {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        let total_kb = Self::parse_meminfo(&meminfo, "MemTotal:")?;
        let available_kb = Self::parse_meminfo(&meminfo, "MemAvailable:")?;
        if total_kb == 0 {
            return None;
        }
        Some((
            available_kb as f64 / total_kb as f64 * 100.0,
            available_kb as f64 / 1024.0 / 1024.0,
        ))
    }
}

#[async_trait]
impl HealthProbe for MemoryProbe {
    fn component(&self) -> Component {
        Component::Memory
    }

    async fn run(&self, _ctx: &mut ProbeContext) -> ProbeOutcome {
        match self.available_memory() {
            Some((available_pct, available_gb)) => {
                let (status, score) =
                    score_free_percentage(available_pct, &self.tiers, &self.bands);
                ProbeOutcome::new(status, score)
                    .with_detail(format!("{available_pct:.1}% available ({available_gb:.1} GB)"))
            }
            None => ProbeOutcome::unknown("could not read memory information".to_string()),
        }
    }
}

/// The database probe's latency, bucketed into the four-tier scale.
pub struct PerformanceProbe {
    tiers: LatencyTiers,
    bands: BandScores,
}

impl PerformanceProbe {
    pub fn new(config: &HealthConfig) -> Self {
        Self {
            tiers: config.latency_tiers_ms,
            bands: config.band_scores,
        }
    }
}

#[async_trait]
impl HealthProbe for PerformanceProbe {
    fn component(&self) -> Component {
        Component::Performance
    }

    async fn run(&self, ctx: &mut ProbeContext) -> ProbeOutcome {
        match ctx.db_latency_ms {
            Some(latency_ms) => {
                let (status, score) = score_latency(latency_ms, &self.tiers, &self.bands);
                ProbeOutcome::new(status, score)
                    .with_detail(format!("store responded in {latency_ms}ms"))
            }
            None => ProbeOutcome::unknown("no latency sample available".to_string()),
        }
    }
}

/// A probe with a fixed outcome. Test scaffolding for the scorer.
pub struct FixedProbe {
    component: Component,
    status: ComponentStatus,
    score: f64,
}

impl FixedProbe {
    pub fn new(component: Component, status: ComponentStatus, score: f64) -> Self {
        Self {
            component,
            status,
            score,
        }
    }
}

#[async_trait]
impl HealthProbe for FixedProbe {
    fn component(&self) -> Component {
        self.component
    }

    async fn run(&self, _ctx: &mut ProbeContext) -> ProbeOutcome {
        ProbeOutcome::new(self.status, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> FreeTiers {
        FreeTiers {
            excellent: 80.0,
            good: 50.0,
            warning: 20.0,
        }
    }

    fn bands() -> BandScores {
        BandScores {
            excellent: 100.0,
            good: 75.0,
            warning: 50.0,
            critical: 25.0,
        }
    }

    #[test]
    fn free_percentage_tiers_are_inclusive_at_the_floor() {
        let t = tiers();
        let b = bands();
        assert_eq!(score_free_percentage(80.0, &t, &b).0, ComponentStatus::Excellent);
        assert_eq!(score_free_percentage(79.9, &t, &b).0, ComponentStatus::Good);
        assert_eq!(score_free_percentage(50.0, &t, &b).0, ComponentStatus::Good);
        assert_eq!(score_free_percentage(20.0, &t, &b).0, ComponentStatus::Warning);
        assert_eq!(score_free_percentage(19.9, &t, &b).0, ComponentStatus::Critical);
    }

    #[test]
    fn latency_tiers_are_inclusive_at_the_ceiling() {
        let t = LatencyTiers {
            excellent: 100,
            good: 500,
            warning: 1000,
        };
        let b = bands();
        assert_eq!(score_latency(100, &t, &b).0, ComponentStatus::Excellent);
        assert_eq!(score_latency(101, &t, &b).0, ComponentStatus::Good);
        assert_eq!(score_latency(500, &t, &b).0, ComponentStatus::Good);
        assert_eq!(score_latency(1000, &t, &b).0, ComponentStatus::Warning);
        assert_eq!(score_latency(1001, &t, &b).0, ComponentStatus::Critical);
    }

    #[test]
    fn meminfo_parsing_reads_the_kb_column() {
        let sample = "MemTotal:       16384000 kB\nMemAvailable:    8192000 kB\n";
        assert_eq!(
            MemoryProbe::parse_meminfo(sample, "MemTotal:"),
            Some(16_384_000)
        );
        assert_eq!(
            MemoryProbe::parse_meminfo(sample, "MemAvailable:"),
            Some(8_192_000)
        );
        assert_eq!(MemoryProbe::parse_meminfo(sample, "SwapFree:"), None);
    }
}
