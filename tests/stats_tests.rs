use chrono::NaiveDate;
use clinic_ops::kpi::{KpiEngine, PeriodWindow};
use clinic_ops::stats::StatisticsEngine;
use clinic_ops::store::{
    Appointment, AppointmentStatus, Consultation, Invoice, InvoiceStatus, MemoryRecordStore,
    Patient, PatientId,
};
use std::sync::Arc;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn seeded_march_store() -> MemoryRecordStore {
    let store = MemoryRecordStore::new();
    store.add_patient(Patient {
        id: PatientId(1),
        last_name: "Stats".to_string(),
        first_name: "Sena".to_string(),
        birth_date: None,
        sex: None,
        phone: None,
        email: None,
    });
    // Paid invoices spread over the month, one per date listed.
    for (id, (day, amount)) in [(3, 120.0), (10, 80.0), (10, 50.0), (28, 200.0)]
        .into_iter()
        .enumerate()
    {
        store.add_invoice(Invoice {
            id: id as i64,
            patient_id: PatientId(1),
            issued_on: d(2025, 3, day),
            total_amount: amount,
            status: InvoiceStatus::Paid,
        });
    }
    store.add_consultation(Consultation {
        id: 1,
        patient_id: PatientId(1),
        appointment_id: None,
        date: d(2025, 3, 10),
        price: 150.0,
    });
    store
}

fn engine_over(store: MemoryRecordStore) -> StatisticsEngine {
    StatisticsEngine::new(KpiEngine::new(Arc::new(store)))
}

/// Additivity law: the month's revenue equals the sum of each day's
/// revenue across the month.
#[tokio::test]
async fn monthly_revenue_equals_sum_of_daily_revenues() {
    let stats = engine_over(seeded_march_store());

    let monthly = stats.monthly(2025, 3).await.unwrap();

    let window = PeriodWindow::month(2025, 3).unwrap();
    let mut daily_sum = 0.0;
    let mut day = window.start;
    while day <= window.end {
        daily_sum += stats.daily(day).await.unwrap().revenue_today;
        day = day.succ_opt().unwrap();
    }

    assert_eq!(monthly.revenue_month, daily_sum);
    assert_eq!(monthly.revenue_month, 450.0);
}

#[tokio::test]
async fn daily_stats_count_scheduled_and_confirmed_only() {
    let store = MemoryRecordStore::new();
    let day = d(2025, 3, 10);
    for (id, status) in [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ]
    .into_iter()
    .enumerate()
    {
        store.add_appointment(Appointment {
            id: id as i64,
            patient_id: PatientId(1),
            scheduled_at: day.and_hms_opt(8 + id as u32, 0, 0).unwrap(),
            status,
            reason: None,
        });
    }

    let stats = engine_over(store);
    let daily = stats.daily(day).await.unwrap();
    assert_eq!(daily.appointments_scheduled_today, 2);
}

#[tokio::test]
async fn empty_month_averages_to_zero_without_error() {
    let stats = engine_over(MemoryRecordStore::new());
    let monthly = stats.monthly(2025, 3).await.unwrap();
    assert_eq!(monthly.consultations_month, 0);
    assert_eq!(monthly.revenue_month, 0.0);
    assert_eq!(monthly.average_revenue_per_consultation, 0.0);
    assert_eq!(monthly.unique_patients_month, 0);
    assert_eq!(monthly.period_label, "2025-03");
}

#[tokio::test]
async fn monthly_average_uses_consultation_volume() {
    let stats = engine_over(seeded_march_store());
    let monthly = stats.monthly(2025, 3).await.unwrap();
    assert_eq!(monthly.consultations_month, 1);
    assert_eq!(monthly.average_revenue_per_consultation, 450.0);
    assert_eq!(monthly.unique_patients_month, 1);
}
