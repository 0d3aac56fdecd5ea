use chrono::NaiveDate;
use clinic_ops::kpi::{KpiEngine, PeriodWindow};
use clinic_ops::stats::StatisticsEngine;
use clinic_ops::store::{
    Appointment, AppointmentStatus, Consultation, Invoice, InvoiceStatus, MemoryRecordStore,
    PatientId,
};
use once_cell::sync::Lazy;
use proptest::prelude::*;
use std::sync::Arc;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// One runtime shared across proptest cases; building one per case is
/// needless churn at 256 cases per property.
static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
});

fn runtime() -> &'static tokio::runtime::Runtime {
    &RUNTIME
}

fn status_strategy() -> impl Strategy<Value = AppointmentStatus> {
    prop::sample::select(AppointmentStatus::ALL.to_vec())
}

proptest! {
    /// top_patients output is count-descending, id-ascending on ties, and
    /// never longer than max(n, 0).
    #[test]
    fn top_patients_ordering_and_length(
        consults in prop::collection::vec((1i64..20, 1u32..29), 0..60),
        n in -2i64..30,
    ) {
        let ranked = runtime().block_on(async {
            let store = MemoryRecordStore::new();
            for (id, (patient, day)) in consults.iter().enumerate() {
                store.add_consultation(Consultation {
                    id: id as i64,
                    patient_id: PatientId(*patient),
                    appointment_id: None,
                    date: d(2025, 3, *day),
                    price: 100.0,
                });
            }
            let engine = KpiEngine::new(Arc::new(store));
            engine
                .top_patients(PeriodWindow::month(2025, 3).unwrap(), n)
                .await
                .unwrap()
        });

        prop_assert!(ranked.len() as i64 <= n.max(0));
        for pair in ranked.windows(2) {
            let ordered = pair[0].consultations > pair[1].consultations
                || (pair[0].consultations == pair[1].consultations
                    && pair[0].patient_id < pair[1].patient_id);
            prop_assert!(ordered, "ranking out of order: {pair:?}");
        }
    }

    /// The status breakdown partitions the window's appointments: group
    /// counts always sum to the total count, with out-of-window rows
    /// excluded.
    #[test]
    fn status_groups_sum_to_window_total(
        appointments in prop::collection::vec((status_strategy(), 1u32..57), 0..80),
    ) {
        // Independent oracle: offsets 1..=31 land in March, the rest spill
        // into April and must not be counted.
        let expected_total = appointments.iter().filter(|(_, offset)| *offset <= 31).count() as u64;

        let group_sum = runtime().block_on(async {
            let store = MemoryRecordStore::new();
            let base = d(2025, 3, 1);
            for (id, (status, day_offset)) in appointments.iter().enumerate() {
                let day = base + chrono::Duration::days(i64::from(*day_offset) - 1);
                store.add_appointment(Appointment {
                    id: id as i64,
                    patient_id: PatientId(1),
                    scheduled_at: day.and_hms_opt(9, 0, 0).unwrap(),
                    status: *status,
                    reason: None,
                });
            }

            let window = PeriodWindow::month(2025, 3).unwrap();
            let engine = KpiEngine::new(Arc::new(store));
            let breakdown = engine.appointment_status_breakdown(window).await.unwrap();
            breakdown.iter().map(|g| g.count).sum::<u64>()
        });

        prop_assert_eq!(group_sum, expected_total);
    }

    /// Additivity: a month's revenue equals the sum of its days' revenues.
    /// Integer-valued amounts keep the floating-point sums exact.
    #[test]
    fn monthly_revenue_is_additive_over_days(
        invoices in prop::collection::vec((1u32..29, 1u32..500, prop::bool::ANY), 0..40),
    ) {
        let (monthly, daily_sum) = runtime().block_on(async {
            let store = MemoryRecordStore::new();
            for (id, (day, amount, paid)) in invoices.iter().enumerate() {
                store.add_invoice(Invoice {
                    id: id as i64,
                    patient_id: PatientId(1),
                    issued_on: d(2025, 3, *day),
                    total_amount: f64::from(*amount),
                    status: if *paid {
                        InvoiceStatus::Paid
                    } else {
                        InvoiceStatus::Pending
                    },
                });
            }

            let stats = StatisticsEngine::new(KpiEngine::new(Arc::new(store)));
            let monthly = stats.monthly(2025, 3).await.unwrap().revenue_month;

            let window = PeriodWindow::month(2025, 3).unwrap();
            let mut daily_sum = 0.0;
            let mut day = window.start;
            while day <= window.end {
                daily_sum += stats.daily(day).await.unwrap().revenue_today;
                day = day.succ_opt().unwrap();
            }
            (monthly, daily_sum)
        });

        prop_assert_eq!(monthly, daily_sum);
    }
}
