//! Fixed-window rollups built on the KPI engine's primitives.

use crate::kpi::{KpiEngine, PeriodWindow};
use crate::store::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub consultations_today: u64,
    pub revenue_today: f64,
    pub appointments_scheduled_today: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStats {
    /// "YYYY-MM"
    pub period_label: String,
    pub consultations_month: u64,
    pub revenue_month: f64,
    pub average_revenue_per_consultation: f64,
    pub unique_patients_month: u64,
}

pub struct StatisticsEngine {
    kpi: KpiEngine,
}

impl StatisticsEngine {
    pub fn new(kpi: KpiEngine) -> Self {
        Self { kpi }
    }

    /// Hand the underlying KPI engine back to the caller.
    pub fn into_kpi(self) -> KpiEngine {
        self.kpi
    }

    pub async fn daily(&self, date: NaiveDate) -> Result<DailyStats, StoreError> {
        let window = PeriodWindow::single_day(date);
        Ok(DailyStats {
            date,
            consultations_today: self.kpi.consultation_count(window).await?,
            revenue_today: self.kpi.revenue(window).await?,
            appointments_scheduled_today: self.kpi.appointments_scheduled(date).await?,
        })
    }

    /// Monthly rollup. An unrepresentable month degrades to zero-valued
    /// metrics under its requested label rather than failing.
    pub async fn monthly(&self, year: i32, month: u32) -> Result<MonthlyStats, StoreError> {
        let period_label = format!("{year:04}-{month:02}");
        let Some(window) = PeriodWindow::month(year, month) else {
            return Ok(MonthlyStats {
                period_label,
                consultations_month: 0,
                revenue_month: 0.0,
                average_revenue_per_consultation: 0.0,
                unique_patients_month: 0,
            });
        };

        let consultations_month = self.kpi.consultation_count(window).await?;
        let revenue_month = self.kpi.revenue(window).await?;
        let average_revenue_per_consultation = if consultations_month > 0 {
            revenue_month / consultations_month as f64
        } else {
            0.0
        };

        Ok(MonthlyStats {
            period_label,
            consultations_month,
            revenue_month,
            average_revenue_per_consultation,
            unique_patients_month: self.kpi.unique_patients(window).await?,
        })
    }

    /// Current calendar day, for CLI invocations without an explicit date.
    pub fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
