//! In-memory fixture store for engine and service tests.

use super::types::{
    Appointment, AppointmentStatus, Certificate, Consultation, Invoice, InvoiceStatus, Patient,
    PatientId, RecordCounts,
};
use super::{RecordStore, StoreError};
use crate::kpi::PeriodWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// A [`RecordStore`] over plain vectors, with the same window semantics as
/// the SQLite engine. Intended for tests; not a production store.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Records>,
}

#[derive(Default, Serialize)]
struct Records {
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    consultations: Vec<Consultation>,
    invoices: Vec<Invoice>,
    certificates: Vec<Certificate>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_patient(&self, patient: Patient) {
        self.inner.lock().unwrap().patients.push(patient);
    }

    pub fn add_appointment(&self, appointment: Appointment) {
        self.inner.lock().unwrap().appointments.push(appointment);
    }

    pub fn add_consultation(&self, consultation: Consultation) {
        self.inner.lock().unwrap().consultations.push(consultation);
    }

    pub fn add_invoice(&self, invoice: Invoice) {
        self.inner.lock().unwrap().invoices.push(invoice);
    }

    pub fn add_certificate(&self, certificate: Certificate) {
        self.inner.lock().unwrap().certificates.push(certificate);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn count_consultations(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        let records = self.inner.lock().unwrap();
        Ok(records
            .consultations
            .iter()
            .filter(|c| window.contains(c.date))
            .count() as u64)
    }

    async fn count_certificates(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        let records = self.inner.lock().unwrap();
        Ok(records
            .certificates
            .iter()
            .filter(|c| window.contains(c.issued_on))
            .count() as u64)
    }

    async fn sum_paid_invoices(&self, window: PeriodWindow) -> Result<f64, StoreError> {
        let records = self.inner.lock().unwrap();
        Ok(records
            .invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Paid && window.contains(i.issued_on))
            .map(|i| i.total_amount)
            .sum())
    }

    async fn consultation_counts_by_patient(
        &self,
        window: PeriodWindow,
    ) -> Result<HashMap<PatientId, u64>, StoreError> {
        let records = self.inner.lock().unwrap();
        let mut counts = HashMap::new();
        for consultation in records
            .consultations
            .iter()
            .filter(|c| window.contains(c.date))
        {
            *counts.entry(consultation.patient_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn appointment_counts_by_status(
        &self,
        window: PeriodWindow,
    ) -> Result<HashMap<AppointmentStatus, u64>, StoreError> {
        let records = self.inner.lock().unwrap();
        let mut counts = HashMap::new();
        for appointment in records
            .appointments
            .iter()
            .filter(|a| window.contains(a.scheduled_at.date()))
        {
            *counts.entry(appointment.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_appointments_on(
        &self,
        day: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<u64, StoreError> {
        let records = self.inner.lock().unwrap();
        Ok(records
            .appointments
            .iter()
            .filter(|a| a.scheduled_at.date() == day && statuses.contains(&a.status))
            .count() as u64)
    }

    async fn patients_with_activity(
        &self,
        window: PeriodWindow,
    ) -> Result<Vec<PatientId>, StoreError> {
        let records = self.inner.lock().unwrap();
        let mut seen: Vec<PatientId> = Vec::new();
        let consultation_patients = records
            .consultations
            .iter()
            .filter(|c| window.contains(c.date))
            .map(|c| c.patient_id);
        let appointment_patients = records
            .appointments
            .iter()
            .filter(|a| window.contains(a.scheduled_at.date()))
            .map(|a| a.patient_id);
        for patient in consultation_patients.chain(appointment_patients) {
            if !seen.contains(&patient) {
                seen.push(patient);
            }
        }
        Ok(seen)
    }

    async fn first_activity_date(
        &self,
        patient: PatientId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        let records = self.inner.lock().unwrap();
        let consultation_dates = records
            .consultations
            .iter()
            .filter(|c| c.patient_id == patient)
            .map(|c| c.date);
        let appointment_dates = records
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient)
            .map(|a| a.scheduled_at.date());
        Ok(consultation_dates.chain(appointment_dates).min())
    }

    async fn find_patient(&self, patient: PatientId) -> Result<Option<Patient>, StoreError> {
        let records = self.inner.lock().unwrap();
        Ok(records.patients.iter().find(|p| p.id == patient).cloned())
    }

    async fn record_counts(&self) -> Result<RecordCounts, StoreError> {
        let records = self.inner.lock().unwrap();
        Ok(RecordCounts {
            patients: records.patients.len() as u64,
            consultations: records.consultations.len() as u64,
        })
    }

    async fn export_snapshot(&self, dest: &Path) -> Result<(), StoreError> {
        let json = {
            let records = self.inner.lock().unwrap();
            serde_json::to_vec_pretty(&*records)
                .map_err(|e| StoreError::Export(e.to_string()))?
        };
        tokio::fs::write(dest, json).await?;
        Ok(())
    }
}
