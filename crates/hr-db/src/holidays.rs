//! Holiday repository
//!
//! Table: holidays

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::Holiday;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct HolidayRow {
    pub id: i64,
    pub store_id: i64,
    pub date: DateTime<Utc>,
    pub name: String,
}

impl From<HolidayRow> for Holiday {
    fn from(row: HolidayRow) -> Self {
        Holiday {
            id: Some(row.id),
            store_id: row.store_id,
            date: row.date,
            name: row.name,
        }
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait HolidayRepository: Send + Sync {
    /// Holidays of a store, optionally limited to `[from, to]`
    async fn list_for_store(
        &self,
        store_id: Id,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Holiday>>;

    /// Insert or rename each `(date, name)`; all or nothing
    async fn upsert_many(
        &self,
        store_id: Id,
        entries: Vec<(DateTime<Utc>, String)>,
    ) -> RepositoryResult<Vec<Holiday>>;

    /// `true` when a row was removed
    async fn delete(&self, store_id: Id, date: DateTime<Utc>) -> RepositoryResult<bool>;
}

pub struct PgHolidayRepository {
    pool: PgPool,
}

impl PgHolidayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolidayRepository for PgHolidayRepository {
    async fn list_for_store(
        &self,
        store_id: Id,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Holiday>> {
        let rows = sqlx::query_as::<_, HolidayRow>(
            r#"
            SELECT id, store_id, date, name
            FROM holidays
            WHERE store_id = $1
              AND ($2::timestamptz IS NULL OR date >= $2)
              AND ($3::timestamptz IS NULL OR date <= $3)
            ORDER BY date
            "#,
        )
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Holiday::from).collect())
    }

    async fn upsert_many(
        &self,
        store_id: Id,
        entries: Vec<(DateTime<Utc>, String)>,
    ) -> RepositoryResult<Vec<Holiday>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(entries.len());

        for (date, name) in entries {
            let row = sqlx::query_as::<_, HolidayRow>(
                r#"
                INSERT INTO holidays (store_id, date, name)
                VALUES ($1, $2, $3)
                ON CONFLICT (store_id, date) DO UPDATE SET name = EXCLUDED.name
                RETURNING id, store_id, date, name
                "#,
            )
            .bind(store_id)
            .bind(date)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(Holiday::from(row));
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn delete(&self, store_id: Id, date: DateTime<Utc>) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM holidays WHERE store_id = $1 AND date = $2")
            .bind(store_id)
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
