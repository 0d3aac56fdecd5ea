use crate::kpi::{KpiEngine, PeriodWindow};
use crate::stats::StatisticsEngine;
use anyhow::Result;
use chrono::{Datelike, NaiveDate};

/// `clinic-ops stats`: daily and monthly rollups, with an optional
/// explicit-window KPI report. Data-access failures propagate as hard
/// errors; everything else prints and exits cleanly.
pub async fn run(
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    top: i64,
) -> Result<bool> {
    let store = super::open_store().await?;
    let kpi = KpiEngine::new(store);

    println!("📈 CLINIC STATISTICS");
    println!("{}", "=".repeat(50));

    let day = date.unwrap_or_else(StatisticsEngine::today);
    let stats = StatisticsEngine::new(kpi);

    let daily = stats.daily(day).await?;
    println!();
    println!("📅 Day {}:", daily.date);
    println!("   🩺 Consultations: {}", daily.consultations_today);
    println!("   💰 Revenue: {:.2}", daily.revenue_today);
    println!(
        "   📋 Scheduled appointments: {}",
        daily.appointments_scheduled_today
    );

    let monthly = stats.monthly(day.year(), day.month()).await?;
    println!();
    println!("📆 Month {}:", monthly.period_label);
    println!("   🩺 Consultations: {}", monthly.consultations_month);
    println!("   💰 Revenue: {:.2}", monthly.revenue_month);
    println!(
        "   📊 Average per consultation: {:.2}",
        monthly.average_revenue_per_consultation
    );
    println!("   👥 Unique patients: {}", monthly.unique_patients_month);

    if let (Some(from), Some(to)) = (from, to) {
        let kpi = stats.into_kpi();
        let window = PeriodWindow::new(from, to);
        let report = kpi.report(window, top).await?;

        println!();
        println!("🔎 Period {} → {}:", window.start, window.end);
        println!("   💰 Revenue: {:.2}", report.revenue);
        println!("   🩺 Consultations: {}", report.consultations);
        println!("   🆕 New patients: {}", report.new_patients);
        println!("   📄 Certificates issued: {}", report.certificates_issued);

        if !report.top_patients.is_empty() {
            println!("   🏆 Top patients:");
            for (position, ranked) in report.top_patients.iter().enumerate() {
                println!(
                    "      {}. {} ({} consultations)",
                    position + 1,
                    ranked.display_name,
                    ranked.consultations
                );
            }
        }
        if !report.appointment_statuses.is_empty() {
            println!("   📋 Appointments by status:");
            for group in &report.appointment_statuses {
                println!("      • {}: {}", group.status, group.count);
            }
        }
    }

    println!();
    println!("✅ Statistics computed successfully");
    Ok(true)
}
