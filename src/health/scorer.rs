use super::probes::{
    DatabaseProbe, HealthProbe, MemoryProbe, PerformanceProbe, ProbeContext, StorageProbe,
};
use super::types::{
    recommendation_for, status_for_score, Component, ComponentHealth, HealthReport,
};
use crate::config::{ComponentWeights, HealthConfig};
use crate::store::RecordStore;
use std::sync::Arc;
use tracing::info;

/// Folds the four component probes into a weighted 0-100 score with a
/// status label and recommendation.
///
/// Probes run in sequence, database first, so the performance probe can
/// bucket the measured latency. A probe that fails to execute contributes
/// its zero score to the mean instead of aborting the check.
pub struct HealthScorer {
    probes: Vec<Box<dyn HealthProbe>>,
    weights: ComponentWeights,
}

impl HealthScorer {
    /// Standard wiring: the four standard probes against the given store.
    pub fn from_config(store: Arc<dyn RecordStore>, config: &HealthConfig) -> Self {
        let probes: Vec<Box<dyn HealthProbe>> = vec![
            Box::new(DatabaseProbe::new(store, config)),
            Box::new(StorageProbe::new(config)),
            Box::new(MemoryProbe::new(config)),
            Box::new(PerformanceProbe::new(config)),
        ];
        Self {
            probes,
            weights: config.weights,
        }
    }

    /// Custom probe set, for tests and alternative deployments.
    pub fn with_probes(probes: Vec<Box<dyn HealthProbe>>, weights: ComponentWeights) -> Self {
        Self { probes, weights }
    }

    fn weight_for(&self, component: Component) -> f64 {
        match component {
            Component::Database => self.weights.database,
            Component::Storage => self.weights.storage,
            Component::Memory => self.weights.memory,
            Component::Performance => self.weights.performance,
        }
    }

    pub async fn check(&self) -> HealthReport {
        let mut ctx = ProbeContext::default();
        let mut components = Vec::with_capacity(self.probes.len());

        for probe in &self.probes {
            let outcome = probe.run(&mut ctx).await;
            components.push(ComponentHealth {
                component: probe.component(),
                status: outcome.status,
                score: outcome.score,
                detail: outcome.detail,
                error: outcome.error,
            });
        }

        let total_weight: f64 = components
            .iter()
            .map(|c| self.weight_for(c.component))
            .sum();
        let overall_score = if total_weight > 0.0 {
            components
                .iter()
                .map(|c| c.score * self.weight_for(c.component))
                .sum::<f64>()
                / total_weight
        } else {
            0.0
        };

        let status = status_for_score(overall_score);
        info!(
            overall_score,
            status = status.as_str(),
            "health check complete"
        );

        HealthReport {
            overall_score,
            status,
            recommendation: recommendation_for(status).to_string(),
            components,
            host: hostname::get().ok().map(|h| h.to_string_lossy().into_owned()),
            checked_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probes::FixedProbe;
    use crate::health::types::ComponentStatus;

    fn excellent(component: Component) -> Box<dyn HealthProbe> {
        Box::new(FixedProbe::new(component, ComponentStatus::Excellent, 100.0))
    }

    #[tokio::test]
    async fn all_excellent_probes_score_a_perfect_hundred() {
        let scorer = HealthScorer::with_probes(
            vec![
                excellent(Component::Database),
                excellent(Component::Storage),
                excellent(Component::Memory),
                excellent(Component::Performance),
            ],
            ComponentWeights::default(),
        );
        let report = scorer.check().await;
        assert_eq!(report.overall_score, 100.0);
        assert_eq!(report.status, ComponentStatus::Excellent);
        assert!(!report.is_critical());
    }

    #[tokio::test]
    async fn one_dead_component_drops_a_quarter_of_the_mean() {
        let scorer = HealthScorer::with_probes(
            vec![
                Box::new(FixedProbe::new(
                    Component::Database,
                    ComponentStatus::Critical,
                    0.0,
                )),
                excellent(Component::Storage),
                excellent(Component::Memory),
                excellent(Component::Performance),
            ],
            ComponentWeights::default(),
        );
        let report = scorer.check().await;
        assert_eq!(report.overall_score, 75.0);
        assert_eq!(report.status, ComponentStatus::Good);
    }

    #[tokio::test]
    async fn weights_shift_the_mean() {
        let weights = ComponentWeights {
            database: 3.0,
            storage: 1.0,
            memory: 1.0,
            performance: 1.0,
        };
        let scorer = HealthScorer::with_probes(
            vec![
                Box::new(FixedProbe::new(
                    Component::Database,
                    ComponentStatus::Critical,
                    0.0,
                )),
                excellent(Component::Storage),
                excellent(Component::Memory),
                excellent(Component::Performance),
            ],
            weights,
        );
        let report = scorer.check().await;
        // 300 of 600 weighted points present.
        assert_eq!(report.overall_score, 50.0);
        assert_eq!(report.status, ComponentStatus::Warning);
    }

    #[tokio::test]
    async fn empty_probe_set_is_critical_not_a_panic() {
        let scorer = HealthScorer::with_probes(Vec::new(), ComponentWeights::default());
        let report = scorer.check().await;
        assert_eq!(report.overall_score, 0.0);
        assert!(report.is_critical());
    }
}
