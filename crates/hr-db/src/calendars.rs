//! Calendar repository
//!
//! Table: calendars. At most one row per store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use hr_core::traits::Id;
use hr_models::Calendar;
use sqlx::{FromRow, PgPool};

use crate::repository::{parse_text, RepositoryError, RepositoryResult};

#[derive(Debug, Clone, FromRow)]
pub struct CalendarRow {
    pub id: i64,
    pub store_id: i64,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub late_threshold_minutes: i32,
    pub early_exit_threshold_minutes: i32,
    pub weekend_days: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CalendarRow> for Calendar {
    type Error = RepositoryError;

    fn try_from(row: CalendarRow) -> RepositoryResult<Self> {
        let weekend_days = row
            .weekend_days
            .iter()
            .map(|day| parse_text::<Weekday>("calendars.weekend_days", day))
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Calendar {
            id: Some(row.id),
            store_id: row.store_id,
            shift_start: row.shift_start,
            shift_end: row.shift_end,
            late_threshold_minutes: row.late_threshold_minutes,
            early_exit_threshold_minutes: row.early_exit_threshold_minutes,
            weekend_days,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

fn weekend_text(calendar: &Calendar) -> Vec<String> {
    calendar.weekend_days.iter().map(|d| d.to_string()).collect()
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    async fn find_by_store(&self, store_id: Id) -> RepositoryResult<Option<Calendar>>;

    /// Fails with `Conflict` when the store already has a calendar
    async fn create(&self, calendar: &Calendar) -> RepositoryResult<Calendar>;

    async fn update(&self, calendar: &Calendar) -> RepositoryResult<Calendar>;
}

const COLUMNS: &str = "id, store_id, shift_start, shift_end, late_threshold_minutes, \
                       early_exit_threshold_minutes, weekend_days, created_at, updated_at";

pub struct PgCalendarRepository {
    pool: PgPool,
}

impl PgCalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarRepository for PgCalendarRepository {
    async fn find_by_store(&self, store_id: Id) -> RepositoryResult<Option<Calendar>> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!(
            "SELECT {} FROM calendars WHERE store_id = $1",
            COLUMNS
        ))
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Calendar::try_from).transpose()
    }

    async fn create(&self, calendar: &Calendar) -> RepositoryResult<Calendar> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!(
            r#"
            INSERT INTO calendars (store_id, shift_start, shift_end, late_threshold_minutes,
                                   early_exit_threshold_minutes, weekend_days)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(calendar.store_id)
        .bind(calendar.shift_start)
        .bind(calendar.shift_end)
        .bind(calendar.late_threshold_minutes)
        .bind(calendar.early_exit_threshold_minutes)
        .bind(weekend_text(calendar))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "calendar already exists for this store"))?;
        Calendar::try_from(row)
    }

    async fn update(&self, calendar: &Calendar) -> RepositoryResult<Calendar> {
        let row = sqlx::query_as::<_, CalendarRow>(&format!(
            r#"
            UPDATE calendars
            SET shift_start = $2, shift_end = $3, late_threshold_minutes = $4,
                early_exit_threshold_minutes = $5, weekend_days = $6, updated_at = now()
            WHERE store_id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(calendar.store_id)
        .bind(calendar.shift_start)
        .bind(calendar.shift_end)
        .bind(calendar.late_threshold_minutes)
        .bind(calendar.early_exit_threshold_minutes)
        .bind(weekend_text(calendar))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Calendar::try_from(row),
            None => Err(RepositoryError::NotFound(format!("calendar for store {}", calendar.store_id))),
        }
    }
}
