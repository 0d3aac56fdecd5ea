use crate::store::{AppointmentStatus, PatientId};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive date range scoping aggregate metrics.
///
/// An inverted window (`start > end`) is not an error: every engine
/// operation treats it as empty and returns its zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Window covering a single calendar day.
    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// Window covering one calendar month, or `None` when the month is
    /// unrepresentable (e.g. month 13).
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start
            .checked_add_months(Months::new(1))?
            .pred_opt()?;
        Some(Self { start, end })
    }

    /// True when the bounds are non-chronological and the window scopes
    /// nothing.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        !self.is_inverted() && day >= self.start && day <= self.end
    }

    /// "YYYY-MM" label for month windows.
    pub fn month_label(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

/// A patient's position in a consultation-count ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPatient {
    pub patient_id: PatientId,
    pub display_name: String,
    pub consultations: u64,
}

/// One appointment-status group in a breakdown, already sorted by the
/// engine (count descending, then status name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: u64,
}

/// Period-scoped business metrics bundled for the reporting façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiReport {
    pub window: PeriodWindow,
    pub revenue: f64,
    pub consultations: u64,
    pub new_patients: u64,
    pub certificates_issued: u64,
    pub top_patients: Vec<RankedPatient>,
    pub appointment_statuses: Vec<StatusCount>,
}
