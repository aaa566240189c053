//! Overtime request repository
//!
//! Table: overtime_requests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Paginated, Pagination};
use hr_core::traits::Id;
use hr_models::{Compensation, OvertimeRequest, ReviewStatus};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::repository::{parse_text, RecordFilter, RepositoryError, RepositoryResult};

#[derive(Debug, Clone, FromRow)]
pub struct OvertimeRow {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub hours: Decimal,
    pub compensation: String,
    pub status: String,
    pub reviewed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OvertimeRow> for OvertimeRequest {
    type Error = RepositoryError;

    fn try_from(row: OvertimeRow) -> RepositoryResult<Self> {
        Ok(OvertimeRequest {
            id: Some(row.id),
            user_id: row.user_id,
            date: row.date,
            hours: row.hours,
            compensation: parse_text::<Compensation>("overtime_requests.compensation", &row.compensation)?,
            status: parse_text::<ReviewStatus>("overtime_requests.status", &row.status)?,
            reviewed_by: row.reviewed_by,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait OvertimeRepository: Send + Sync {
    async fn create(&self, request: &OvertimeRequest) -> RepositoryResult<OvertimeRequest>;

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<OvertimeRequest>>;

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<OvertimeRequest>>;

    /// Decide a pending request. `None` when it is missing or already decided.
    async fn review(
        &self,
        id: Id,
        status: ReviewStatus,
        reviewer: Id,
    ) -> RepositoryResult<Option<OvertimeRequest>>;

    /// Approved hours compensated in cash within `[from, to]`
    async fn approved_cash_hours(
        &self,
        user_id: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Decimal>;
}

const COLUMNS: &str = "o.id, o.user_id, o.date, o.hours, o.compensation, o.status, \
                       o.reviewed_by, o.created_at, o.updated_at";

const FILTER: &str = r#"
    FROM overtime_requests o
    JOIN users u ON u.id = o.user_id
    WHERE ($1::bigint IS NULL OR o.user_id = $1)
      AND ($2::bigint IS NULL OR u.store_id = $2)
      AND ($3::timestamptz IS NULL OR o.date >= $3)
      AND ($4::timestamptz IS NULL OR o.date <= $4)
"#;

pub struct PgOvertimeRepository {
    pool: PgPool,
}

impl PgOvertimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OvertimeRepository for PgOvertimeRepository {
    async fn create(&self, request: &OvertimeRequest) -> RepositoryResult<OvertimeRequest> {
        let row = sqlx::query_as::<_, OvertimeRow>(&format!(
            r#"
            INSERT INTO overtime_requests AS o (user_id, date, hours, compensation, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(request.user_id)
        .bind(request.date)
        .bind(request.hours)
        .bind(request.compensation.as_str())
        .bind(request.status.as_str())
        .fetch_one(&self.pool)
        .await?;
        OvertimeRequest::try_from(row)
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<OvertimeRequest>> {
        let row = sqlx::query_as::<_, OvertimeRow>(&format!(
            "SELECT {} FROM overtime_requests o WHERE o.id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(OvertimeRequest::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<OvertimeRequest>> {
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", FILTER))
            .bind(filter.user_id)
            .bind(filter.store_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, OvertimeRow>(&format!(
            "SELECT {} {} ORDER BY o.date DESC, o.id DESC LIMIT $5 OFFSET $6",
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
            .map(OvertimeRequest::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(Paginated::new(items, total, pagination))
    }

    async fn review(
        &self,
        id: Id,
        status: ReviewStatus,
        reviewer: Id,
    ) -> RepositoryResult<Option<OvertimeRequest>> {
        let row = sqlx::query_as::<_, OvertimeRow>(&format!(
            r#"
            UPDATE overtime_requests AS o SET status = $2, reviewed_by = $3, updated_at = now()
            WHERE o.id = $1 AND o.status = 'pending'
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(reviewer)
        .fetch_optional(&self.pool)
        .await?;
        row.map(OvertimeRequest::try_from).transpose()
    }

    async fn approved_cash_hours(
        &self,
        user_id: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Decimal> {
        let hours = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(hours), 0)
            FROM overtime_requests
            WHERE user_id = $1 AND status = 'approved' AND compensation = 'cash'
              AND date >= $2 AND date <= $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(hours)
    }
}
