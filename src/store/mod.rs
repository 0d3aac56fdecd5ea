//! Query Adapter boundary over the clinic record store.
//!
//! The analytics core depends only on the [`RecordStore`] trait; the
//! production engine is [`SqliteRecordStore`], and tests use either the
//! generated mock or the in-memory fixture store.

pub mod memory;
pub mod sqlite;
pub mod types;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;
pub use types::{
    Appointment, AppointmentStatus, Certificate, Consultation, Invoice, InvoiceStatus, Patient,
    PatientId, RecordCounts, Sex,
};

use crate::kpi::PeriodWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Hard failure of the record store: unreachable, or a query failed.
///
/// This is the only error that propagates out of the KPI/Statistics path;
/// no partial result is returned as if it were complete.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("snapshot export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read operations the analytics core requires of any persistence engine.
///
/// Group-by results carry no guaranteed order; callers sort explicitly
/// where order matters. Each method is one query, consistent as of its own
/// execution.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Count of consultations dated within the window.
    async fn count_consultations(&self, window: PeriodWindow) -> Result<u64, StoreError>;

    /// Count of certificates issued within the window.
    async fn count_certificates(&self, window: PeriodWindow) -> Result<u64, StoreError>;

    /// Sum of `total_amount` over paid invoices issued within the window.
    async fn sum_paid_invoices(&self, window: PeriodWindow) -> Result<f64, StoreError>;

    /// Consultation counts grouped by patient, window-scoped.
    async fn consultation_counts_by_patient(
        &self,
        window: PeriodWindow,
    ) -> Result<HashMap<PatientId, u64>, StoreError>;

    /// Appointment counts grouped by status, window-scoped.
    async fn appointment_counts_by_status(
        &self,
        window: PeriodWindow,
    ) -> Result<HashMap<AppointmentStatus, u64>, StoreError>;

    /// Appointments on `day` whose status is one of `statuses`.
    async fn count_appointments_on(
        &self,
        day: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<u64, StoreError>;

    /// Patients with at least one consultation or appointment in the window.
    async fn patients_with_activity(
        &self,
        window: PeriodWindow,
    ) -> Result<Vec<PatientId>, StoreError>;

    /// Earliest consultation or appointment date for the patient, if any.
    async fn first_activity_date(
        &self,
        patient: PatientId,
    ) -> Result<Option<NaiveDate>, StoreError>;

    async fn find_patient(&self, patient: PatientId) -> Result<Option<Patient>, StoreError>;

    /// Bounded sample query used by the database health probe.
    async fn record_counts(&self) -> Result<RecordCounts, StoreError>;

    /// Point-in-time snapshot of the store written to `dest`, using the
    /// engine's native export primitive.
    async fn export_snapshot(&self, dest: &Path) -> Result<(), StoreError>;
}
