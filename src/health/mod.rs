pub mod probes;
pub mod scorer;
pub mod types;

pub use probes::{
    DatabaseProbe, FixedProbe, HealthProbe, MemoryProbe, PerformanceProbe, ProbeContext,
    ProbeOutcome, StorageProbe,
};
pub use scorer::HealthScorer;
pub use types::{Component, ComponentHealth, ComponentStatus, HealthReport};
