use super::types::{Patient, PatientId, RecordCounts, Sex};
use super::{AppointmentStatus, RecordStore, StoreError};
use crate::kpi::PeriodWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Production [`RecordStore`] backed by the clinic's SQLite database.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if missing) the database at `path` and ensure the
    /// record schema exists.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let store = Self { pool };
        store.init_schema().await?;
        info!(path, "record store opened");
        Ok(store)
    }

    /// Pool accessor for callers that need raw queries (tests, tooling).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                last_name TEXT NOT NULL,
                first_name TEXT NOT NULL,
                birth_date TEXT,
                sex TEXT,
                phone TEXT,
                email TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id),
                scheduled_at TEXT NOT NULL,
                status TEXT NOT NULL,
                reason TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS consultations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id),
                appointment_id INTEGER REFERENCES appointments(id),
                date TEXT NOT NULL,
                price REAL NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS invoices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id),
                issued_on TEXT NOT NULL,
                total_amount REAL NOT NULL,
                status TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS certificates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id),
                issued_on TEXT NOT NULL,
                category TEXT NOT NULL
            )
            "#,
        ];

        for statement in ddl {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Quoted, validated status list for an `IN (...)` clause. Values come
    /// from the enum, never from user input.
    fn status_list(statuses: &[AppointmentStatus]) -> String {
        statuses
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Close the pool gracefully.
    pub async fn shutdown(&self) {
        debug!("closing record store connections");
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn count_consultations(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM consultations WHERE date BETWEEN ?1 AND ?2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(n as u64)
    }

    async fn count_certificates(&self, window: PeriodWindow) -> Result<u64, StoreError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM certificates WHERE issued_on BETWEEN ?1 AND ?2",
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(n as u64)
    }

    async fn sum_paid_invoices(&self, window: PeriodWindow) -> Result<f64, StoreError> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(total_amount), 0) AS REAL)
            FROM invoices
            WHERE status = 'paid' AND issued_on BETWEEN ?1 AND ?2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn consultation_counts_by_patient(
        &self,
        window: PeriodWindow,
    ) -> Result<HashMap<PatientId, u64>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT patient_id, COUNT(*) AS n
            FROM consultations
            WHERE date BETWEEN ?1 AND ?2
            GROUP BY patient_id
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            let patient_id: i64 = row.get("patient_id");
            let n: i64 = row.get("n");
            counts.insert(PatientId(patient_id), n as u64);
        }
        Ok(counts)
    }

    async fn appointment_counts_by_status(
        &self,
        window: PeriodWindow,
    ) -> Result<HashMap<AppointmentStatus, u64>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS n
            FROM appointments
            WHERE date(scheduled_at) BETWEEN ?1 AND ?2
            GROUP BY status
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = HashMap::new();
        for row in rows {
            let raw: String = row.get("status");
            let n: i64 = row.get("n");
            match AppointmentStatus::from_str(&raw) {
                Ok(status) => {
                    counts.insert(status, n as u64);
                }
                Err(e) => warn!("skipping appointment status group: {e}"),
            }
        }
        Ok(counts)
    }

    async fn count_appointments_on(
        &self,
        day: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> Result<u64, StoreError> {
        if statuses.is_empty() {
            return Ok(0);
        }
        let sql = format!(
            "SELECT COUNT(*) FROM appointments WHERE date(scheduled_at) = ?1 AND status IN ({})",
            Self::status_list(statuses)
        );
        let n: i64 = sqlx::query_scalar(&sql)
            .bind(day)
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    async fn patients_with_activity(
        &self,
        window: PeriodWindow,
    ) -> Result<Vec<PatientId>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT patient_id FROM consultations WHERE date BETWEEN ?1 AND ?2
            UNION
            SELECT patient_id FROM appointments WHERE date(scheduled_at) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PatientId(row.get::<i64, _>("patient_id")))
            .collect())
    }

    async fn first_activity_date(
        &self,
        patient: PatientId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        let first: Option<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT MIN(d) FROM (
                SELECT date AS d FROM consultations WHERE patient_id = ?1
                UNION ALL
                SELECT date(scheduled_at) AS d FROM appointments WHERE patient_id = ?1
            )
            "#,
        )
        .bind(patient.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(first)
    }

    async fn find_patient(&self, patient: PatientId) -> Result<Option<Patient>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, last_name, first_name, birth_date, sex, phone, email
            FROM patients WHERE id = ?1
            "#,
        )
        .bind(patient.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Patient {
            id: PatientId(row.get("id")),
            last_name: row.get("last_name"),
            first_name: row.get("first_name"),
            birth_date: row.get("birth_date"),
            sex: row.get::<Option<String>, _>("sex").and_then(|s| match s.as_str() {
                "male" => Some(Sex::Male),
                "female" => Some(Sex::Female),
                _ => None,
            }),
            phone: row.get("phone"),
            email: row.get("email"),
        }))
    }

    async fn record_counts(&self) -> Result<RecordCounts, StoreError> {
        let patients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await?;
        let consultations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM consultations")
            .fetch_one(&self.pool)
            .await?;
        Ok(RecordCounts {
            patients: patients as u64,
            consultations: consultations as u64,
        })
    }

    async fn export_snapshot(&self, dest: &Path) -> Result<(), StoreError> {
        let dest_str = dest
            .to_str()
            .ok_or_else(|| StoreError::Export("non-UTF-8 destination path".to_string()))?;
        // VACUUM INTO gives a consistent point-in-time copy without
        // blocking concurrent readers.
        let sql = format!("VACUUM INTO '{}'", dest_str.replace('\'', "''"));
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Export(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn seeded_store(dir: &TempDir) -> SqliteRecordStore {
        let path = dir.path().join("clinic.db");
        let store = SqliteRecordStore::connect(path.to_str().unwrap())
            .await
            .unwrap();

        sqlx::query(
            r#"
            INSERT INTO patients (id, last_name, first_name) VALUES
                (1, 'Durand', 'Alice'),
                (2, 'Martin', 'Bruno');
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO consultations (patient_id, date, price) VALUES
                (1, '2025-03-03', 150.0),
                (1, '2025-03-20', 150.0),
                (2, '2025-03-10', 200.0);
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO invoices (patient_id, issued_on, total_amount, status) VALUES
                (1, '2025-03-03', 100.0, 'paid'),
                (2, '2025-03-10', 200.0, 'paid'),
                (2, '2025-03-11', 50.0, 'cancelled');
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();
        sqlx::query(
            r#"
            INSERT INTO appointments (patient_id, scheduled_at, status) VALUES
                (1, '2025-03-03 09:00:00', 'completed'),
                (2, '2025-03-25 10:30:00', 'scheduled'),
                (2, '2025-03-25 14:00:00', 'confirmed');
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();

        store
    }

    fn march() -> PeriodWindow {
        PeriodWindow::month(2025, 3).unwrap()
    }

    #[tokio::test]
    async fn paid_sum_excludes_cancelled_invoices() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        let total = store.sum_paid_invoices(march()).await.unwrap();
        assert_eq!(total, 300.0);
    }

    #[tokio::test]
    async fn group_by_patient_counts_consultations() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        let counts = store.consultation_counts_by_patient(march()).await.unwrap();
        assert_eq!(counts.get(&PatientId(1)), Some(&2));
        assert_eq!(counts.get(&PatientId(2)), Some(&1));
    }

    #[tokio::test]
    async fn first_activity_sees_both_consultations_and_appointments() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        let first = store.first_activity_date(PatientId(1)).await.unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 3, 3));
        let none = store.first_activity_date(PatientId(99)).await.unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn scheduled_count_filters_day_and_status() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        let day = NaiveDate::from_ymd_opt(2025, 3, 25).unwrap();
        let n = store
            .count_appointments_on(
                day,
                &[AppointmentStatus::Scheduled, AppointmentStatus::Confirmed],
            )
            .await
            .unwrap();
        assert_eq!(n, 2);
    }

    #[tokio::test]
    async fn snapshot_export_produces_a_readable_copy() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir).await;
        let dest = dir.path().join("snapshot.sqlite3");
        store.export_snapshot(&dest).await.unwrap();

        let copy = SqliteRecordStore::connect(dest.to_str().unwrap())
            .await
            .unwrap();
        let counts = copy.record_counts().await.unwrap();
        assert_eq!(counts.patients, 2);
        assert_eq!(counts.consultations, 3);
    }
}
