use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Record-store query metrics for the running process
#[derive(Debug, Default)]
pub struct StoreMetrics {
    pub queries: AtomicU64,
    pub errors: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_query(&self, latency_ms: u64) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> StoreStats {
        let queries = self.queries.load(Ordering::Relaxed);
        let total_latency_ms = self.total_latency_ms.load(Ordering::Relaxed);
        StoreStats {
            queries,
            errors: self.errors.load(Ordering::Relaxed),
            average_latency_ms: if queries > 0 {
                total_latency_ms as f64 / queries as f64
            } else {
                0.0
            },
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "record store metrics: queries={}, errors={}, avg_latency_ms={:.1}",
            stats.queries, stats.errors, stats.average_latency_ms
        );
    }
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub queries: u64,
    pub errors: u64,
    pub average_latency_ms: f64,
}

/// Global metrics instance
static STORE_METRICS: std::sync::LazyLock<StoreMetrics> =
    std::sync::LazyLock::new(StoreMetrics::new);

pub fn store_metrics() -> &'static StoreMetrics {
    &STORE_METRICS
}

/// Time an operation and log its duration on completion
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn finish(self) -> u64 {
        let elapsed_ms = self.elapsed_ms();
        info!(
            operation = %self.operation,
            duration_ms = elapsed_ms,
            "Operation completed"
        );
        elapsed_ms
    }
}
