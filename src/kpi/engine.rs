use super::types::{KpiReport, PeriodWindow, RankedPatient, StatusCount};
use crate::store::{AppointmentStatus, RecordStore, StoreError};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Period-scoped business metrics over the record store.
///
/// Every operation is total: an inverted window short-circuits to the zero
/// value without touching the store, and empty result sets aggregate to
/// zero. Sub-queries within one call run without a shared transaction, so
/// each result is consistent as of its own execution, not across the call.
pub struct KpiEngine {
    store: Arc<dyn RecordStore>,
}

impl KpiEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Sum of paid invoice totals issued within the window.
    pub async fn revenue(&self, window: PeriodWindow) -> Result<f64, StoreError> {
        if window.is_inverted() {
            return Ok(0.0);
        }
        self.store.sum_paid_invoices(window).await
    }

    /// Count of consultations dated within the window.
    pub async fn consultation_count(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        if window.is_inverted() {
            return Ok(0);
        }
        self.store.count_consultations(window).await
    }

    /// Count of certificates issued within the window.
    pub async fn certificates_issued(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        if window.is_inverted() {
            return Ok(0);
        }
        self.store.count_certificates(window).await
    }

    /// Distinct patients whose first consultation or appointment falls
    /// inside the window. A patient with history before the window does not
    /// count, even with fresh activity inside it.
    pub async fn new_patients(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        if window.is_inverted() {
            return Ok(0);
        }
        let candidates = self.store.patients_with_activity(window).await?;
        let mut count = 0;
        for patient in candidates {
            if let Some(first) = self.store.first_activity_date(patient).await? {
                if window.contains(first) {
                    count += 1;
                }
            }
        }
        debug!(new_patients = count, "new-patient scan complete");
        Ok(count)
    }

    /// Distinct patients with at least one consultation in the window.
    pub async fn unique_patients(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        if window.is_inverted() {
            return Ok(0);
        }
        let counts = self.store.consultation_counts_by_patient(window).await?;
        Ok(counts.len() as u64)
    }

    /// The `n` patients with the most consultations in the window.
    ///
    /// Ordering is deterministic: count descending, ties broken by patient
    /// id ascending. `n <= 0` yields an empty list; `n` past the candidate
    /// set returns all candidates.
    pub async fn top_patients(
        &self,
        window: PeriodWindow,
        n: i64,
    ) -> Result<Vec<RankedPatient>, StoreError> {
        if n <= 0 || window.is_inverted() {
            return Ok(Vec::new());
        }

        let counts = self.store.consultation_counts_by_patient(window).await?;
        let mut ranked: Vec<(crate::store::PatientId, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n as usize);

        let mut result = Vec::with_capacity(ranked.len());
        for (patient_id, consultations) in ranked {
            let display_name = match self.store.find_patient(patient_id).await? {
                Some(patient) => patient.display_name(),
                None => format!("patient #{patient_id}"),
            };
            result.push(RankedPatient {
                patient_id,
                display_name,
                consultations,
            });
        }
        Ok(result)
    }

    /// Per-status appointment counts, sorted count descending then status
    /// name, so the breakdown never depends on map iteration order.
    pub async fn appointment_status_breakdown(
        &self,
        window: PeriodWindow,
    ) -> Result<Vec<StatusCount>, StoreError> {
        if window.is_inverted() {
            return Ok(Vec::new());
        }
        let counts = self.store.appointment_counts_by_status(window).await?;
        let mut breakdown: Vec<StatusCount> = counts
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect();
        breakdown.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.status.as_str().cmp(b.status.as_str()))
        });
        Ok(breakdown)
    }

    /// Appointments on `day` still in an upcoming state.
    pub async fn appointments_scheduled(&self, day: NaiveDate) -> Result<u64, StoreError> {
        self.store
            .count_appointments_on(
                day,
                &[AppointmentStatus::Scheduled, AppointmentStatus::Confirmed],
            )
            .await
    }

    /// Full KPI bundle for the reporting façade.
    pub async fn report(&self, window: PeriodWindow, top_n: i64) -> Result<KpiReport, StoreError> {
        Ok(KpiReport {
            window,
            revenue: self.revenue(window).await?,
            consultations: self.consultation_count(window).await?,
            new_patients: self.new_patients(window).await?,
            certificates_issued: self.certificates_issued(window).await?,
            top_patients: self.top_patients(window, top_n).await?,
            appointment_statuses: self.appointment_status_breakdown(window).await?,
        })
    }
}
