//! Leave repository
//!
//! Table: leaves

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Paginated, Pagination};
use hr_core::traits::Id;
use hr_models::{Leave, LeaveType, ReviewStatus};
use sqlx::{FromRow, PgPool};

use crate::repository::{parse_text, RecordFilter, RepositoryError, RepositoryResult};

#[derive(Debug, Clone, FromRow)]
pub struct LeaveRow {
    pub id: i64,
    pub user_id: i64,
    pub leave_type: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: String,
    pub reviewed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for Leave {
    type Error = RepositoryError;

    fn try_from(row: LeaveRow) -> RepositoryResult<Self> {
        Ok(Leave {
            id: Some(row.id),
            user_id: row.user_id,
            leave_type: parse_text::<LeaveType>("leaves.leave_type", &row.leave_type)?,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status: parse_text::<ReviewStatus>("leaves.status", &row.status)?,
            reviewed_by: row.reviewed_by,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn create(&self, leave: &Leave) -> RepositoryResult<Leave>;

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Leave>>;

    /// Leaves overlapping `[filter.from, filter.to]`, newest first
    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Leave>>;

    /// Decide a pending leave. `None` when it is missing or already decided.
    async fn review(
        &self,
        id: Id,
        status: ReviewStatus,
        reviewer: Id,
    ) -> RepositoryResult<Option<Leave>>;
}

const COLUMNS: &str = "l.id, l.user_id, l.leave_type, l.start_date, l.end_date, l.reason, \
                       l.status, l.reviewed_by, l.created_at, l.updated_at";

const FILTER: &str = r#"
    FROM leaves l
    JOIN users u ON u.id = l.user_id
    WHERE ($1::bigint IS NULL OR l.user_id = $1)
      AND ($2::bigint IS NULL OR u.store_id = $2)
      AND ($3::timestamptz IS NULL OR l.end_date >= $3)
      AND ($4::timestamptz IS NULL OR l.start_date <= $4)
"#;

pub struct PgLeaveRepository {
    pool: PgPool,
}

impl PgLeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRepository for PgLeaveRepository {
    async fn create(&self, leave: &Leave) -> RepositoryResult<Leave> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            r#"
            INSERT INTO leaves AS l (user_id, leave_type, start_date, end_date, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(leave.user_id)
        .bind(leave.leave_type.as_str())
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(&leave.reason)
        .bind(leave.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Leave::try_from(row)
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Leave>> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {} FROM leaves l WHERE l.id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Leave::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Leave>> {
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", FILTER))
            .bind(filter.user_id)
            .bind(filter.store_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, LeaveRow>(&format!(
            "SELECT {} {} ORDER BY l.start_date DESC, l.id DESC LIMIT $5 OFFSET $6",
            COLUMNS, FILTER
        ))
        .bind(filter.user_id)
        .bind(filter.store_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(Leave::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Paginated::new(items, total, pagination))
    }

    async fn review(
        &self,
        id: Id,
        status: ReviewStatus,
        reviewer: Id,
    ) -> RepositoryResult<Option<Leave>> {
        let row = sqlx::query_as::<_, LeaveRow>(&format!(
            r#"
            UPDATE leaves AS l SET status = $2, reviewed_by = $3, updated_at = now()
            WHERE l.id = $1 AND l.status = 'pending'
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(reviewer)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Leave::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_parses_enums() {
        let now = Utc::now();
        let row = LeaveRow {
            id: 1,
            user_id: 2,
            leave_type: "comp_off".into(),
            start_date: now,
            end_date: now,
            reason: None,
            status: "approved".into(),
            reviewed_by: Some(3),
            created_at: now,
            updated_at: now,
        };
        let leave = Leave::try_from(row.clone()).unwrap();
        assert_eq!(leave.leave_type, LeaveType::CompOff);
        assert_eq!(leave.status, ReviewStatus::Approved);

        let bad = LeaveRow {
            status: "maybe".into(),
            ..row
        };
        assert!(matches!(Leave::try_from(bad), Err(RepositoryError::InvalidData(_))));
    }
}
