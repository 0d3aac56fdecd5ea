use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four infrastructure-adjacent signals folded into the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Database,
    Storage,
    Memory,
    Performance,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Database => "database",
            Component::Storage => "storage",
            Component::Memory => "memory",
            Component::Performance => "performance",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Excellent,
    Good,
    Warning,
    Critical,
    /// The probe could not execute at all. Scores 0 and stays in the mean.
    Unknown,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Excellent => "excellent",
            ComponentStatus::Good => "good",
            ComponentStatus::Warning => "warning",
            ComponentStatus::Critical => "critical",
            ComponentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status label for a 0-100 score: >=90 excellent, >=70 good, >=50 warning,
/// below that critical.
pub fn status_for_score(score: f64) -> ComponentStatus {
    if score >= 90.0 {
        ComponentStatus::Excellent
    } else if score >= 70.0 {
        ComponentStatus::Good
    } else if score >= 50.0 {
        ComponentStatus::Warning
    } else {
        ComponentStatus::Critical
    }
}

/// Recommendation text is a pure function of the overall status.
pub fn recommendation_for(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Excellent => "System in excellent condition - no action required",
        ComponentStatus::Good => "System in good condition - routine monitoring recommended",
        ComponentStatus::Warning => "System condition acceptable - optimizations recommended",
        ComponentStatus::Critical | ComponentStatus::Unknown => {
            "Attention required - urgent maintenance advised"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub component: Component,
    pub status: ComponentStatus,
    pub score: f64,
    pub detail: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_score: f64,
    pub status: ComponentStatus,
    pub recommendation: String,
    pub components: Vec<ComponentHealth>,
    pub host: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn is_critical(&self) -> bool {
        self.status == ComponentStatus::Critical
    }
}
