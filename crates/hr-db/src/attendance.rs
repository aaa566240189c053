//! Attendance repository
//!
//! Table: attendance. One row per (user_id, date); later punches fill in the
//! times an earlier one left empty.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::AttendanceRecord;
use sqlx::{FromRow, PgPool};

use crate::repository::{RepositoryResult, Upserted};

#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRow {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub in_time: Option<DateTime<Utc>>,
    pub out_time: Option<DateTime<Utc>>,
    pub marked_absent: bool,
    pub is_late_entry: bool,
    pub is_early_exit: bool,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: Some(row.id),
            user_id: row.user_id,
            date: row.date,
            in_time: row.in_time,
            out_time: row.out_time,
            marked_absent: row.marked_absent,
            is_late_entry: row.is_late_entry,
            is_early_exit: row.is_early_exit,
        }
    }
}

#[derive(Debug, FromRow)]
struct UpsertedAttendanceRow {
    #[sqlx(flatten)]
    record: AttendanceRow,
    inserted: bool,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Merge a punch into the day's row. Missing times keep the stored value.
    async fn upsert(&self, record: &AttendanceRecord) -> RepositoryResult<Upserted<AttendanceRecord>>;

    async fn find_for_day(
        &self,
        user_id: Id,
        date: DateTime<Utc>,
    ) -> RepositoryResult<Option<AttendanceRecord>>;

    /// Rows for `[from, to]`, oldest first
    async fn list_range(
        &self,
        user_id: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<AttendanceRecord>>;
}

const COLUMNS: &str = "a.id, a.user_id, a.date, a.in_time, a.out_time, a.marked_absent, \
                       a.is_late_entry, a.is_early_exit";

pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for PgAttendanceRepository {
    async fn upsert(&self, record: &AttendanceRecord) -> RepositoryResult<Upserted<AttendanceRecord>> {
        let row = sqlx::query_as::<_, UpsertedAttendanceRow>(&format!(
            r#"
            INSERT INTO attendance AS a (user_id, date, in_time, out_time, marked_absent,
                                         is_late_entry, is_early_exit)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, date) DO UPDATE SET
                in_time = COALESCE(EXCLUDED.in_time, a.in_time),
                out_time = COALESCE(EXCLUDED.out_time, a.out_time),
                marked_absent = EXCLUDED.marked_absent,
                is_late_entry = EXCLUDED.is_late_entry,
                is_early_exit = EXCLUDED.is_early_exit,
                updated_at = now()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            COLUMNS
        ))
        .bind(record.user_id)
        .bind(record.date)
        .bind(record.in_time)
        .bind(record.out_time)
        .bind(record.marked_absent)
        .bind(record.is_late_entry)
        .bind(record.is_early_exit)
        .fetch_one(&self.pool)
        .await?;

        Ok(Upserted {
            record: row.record.into(),
            inserted: row.inserted,
        })
    }

    async fn find_for_day(
        &self,
        user_id: Id,
        date: DateTime<Utc>,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {} FROM attendance a WHERE a.user_id = $1 AND a.date = $2",
            COLUMNS
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(AttendanceRecord::from))
    }

    async fn list_range(
        &self,
        user_id: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            r#"
            SELECT {} FROM attendance a
            WHERE a.user_id = $1 AND a.date >= $2 AND a.date <= $3
            ORDER BY a.date
            "#,
            COLUMNS
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}
