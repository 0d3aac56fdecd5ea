pub mod engine;
pub mod types;

pub use engine::KpiEngine;
pub use types::{KpiReport, PeriodWindow, RankedPatient, StatusCount};
