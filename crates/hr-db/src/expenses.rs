//! Expense repository
//!
//! Table: expenses. One row per (user_id, date), written with a single upsert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::pagination::{Paginated, Pagination};
use hr_core::traits::Id;
use hr_models::Expense;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::repository::{RecordFilter, RepositoryError, RepositoryResult, Upserted};

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseRow {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub initial_reading: Decimal,
    pub final_reading: Decimal,
    pub total_distance: Decimal,
    pub rate: Decimal,
    pub fuel_total: Decimal,
    pub miscellaneous_expense: Decimal,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: Some(row.id),
            user_id: row.user_id,
            date: row.date,
            initial_reading: row.initial_reading,
            final_reading: row.final_reading,
            total_distance: row.total_distance,
            rate: row.rate,
            fuel_total: row.fuel_total,
            miscellaneous_expense: row.miscellaneous_expense,
            amount: row.amount,
            description: row.description,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, FromRow)]
struct UpsertedExpenseRow {
    #[sqlx(flatten)]
    expense: ExpenseRow,
    inserted: bool,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Insert, or overwrite the employee's existing row for the same date
    async fn upsert(&self, expense: &Expense) -> RepositoryResult<Upserted<Expense>>;

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Expense>>;

    async fn update(&self, expense: &Expense) -> RepositoryResult<Expense>;

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Expense>>;

    /// Sum of `amount` over `[from, to]`
    async fn sum_amount(
        &self,
        user_id: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Decimal>;
}

const COLUMNS: &str = "e.id, e.user_id, e.date, e.initial_reading, e.final_reading, \
                       e.total_distance, e.rate, e.fuel_total, e.miscellaneous_expense, \
                       e.amount, e.description, e.created_at, e.updated_at";

const FILTER: &str = r#"
    FROM expenses e
    JOIN users u ON u.id = e.user_id
    WHERE ($1::bigint IS NULL OR e.user_id = $1)
      AND ($2::bigint IS NULL OR u.store_id = $2)
      AND ($3::timestamptz IS NULL OR e.date >= $3)
      AND ($4::timestamptz IS NULL OR e.date <= $4)
"#;

pub struct PgExpenseRepository {
    pool: PgPool,
}

impl PgExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn upsert(&self, expense: &Expense) -> RepositoryResult<Upserted<Expense>> {
        let row = sqlx::query_as::<_, UpsertedExpenseRow>(&format!(
            r#"
            INSERT INTO expenses AS e (user_id, date, initial_reading, final_reading, total_distance,
                                       rate, fuel_total, miscellaneous_expense, amount, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id, date) DO UPDATE SET
                initial_reading = EXCLUDED.initial_reading,
                final_reading = EXCLUDED.final_reading,
                total_distance = EXCLUDED.total_distance,
                rate = EXCLUDED.rate,
                fuel_total = EXCLUDED.fuel_total,
                miscellaneous_expense = EXCLUDED.miscellaneous_expense,
                amount = EXCLUDED.amount,
                description = EXCLUDED.description,
                updated_at = now()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            COLUMNS
        ))
        .bind(expense.user_id)
        .bind(expense.date)
        .bind(expense.initial_reading)
        .bind(expense.final_reading)
        .bind(expense.total_distance)
        .bind(expense.rate)
        .bind(expense.fuel_total)
        .bind(expense.miscellaneous_expense)
        .bind(expense.amount)
        .bind(&expense.description)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(expense_id = row.expense.id, inserted = row.inserted, "expense saved");
        Ok(Upserted {
            record: row.expense.into(),
            inserted: row.inserted,
        })
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Expense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {} FROM expenses e WHERE e.id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Expense::from))
    }

    async fn update(&self, expense: &Expense) -> RepositoryResult<Expense> {
        let id = expense
            .id
            .ok_or_else(|| RepositoryError::NotFound("unsaved expense".to_string()))?;

        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            UPDATE expenses AS e SET
                date = $2, initial_reading = $3, final_reading = $4, total_distance = $5,
                rate = $6, fuel_total = $7, miscellaneous_expense = $8, amount = $9,
                description = $10, updated_at = now()
            WHERE e.id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(expense.date)
        .bind(expense.initial_reading)
        .bind(expense.final_reading)
        .bind(expense.total_distance)
        .bind(expense.rate)
        .bind(expense.fuel_total)
        .bind(expense.miscellaneous_expense)
        .bind(expense.amount)
        .bind(&expense.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "an expense already exists for that date"))?;

        row.map(Expense::from)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Expense>> {
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", FILTER))
            .bind(filter.user_id)
            .bind(filter.store_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {} {} ORDER BY e.date DESC, e.id DESC LIMIT $5 OFFSET $6",
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

        Ok(Paginated::new(
            rows.into_iter().map(Expense::from).collect(),
            total,
            pagination,
        ))
    }

    async fn sum_amount(
        &self,
        user_id: Id,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepositoryResult<Decimal> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE user_id = $1 AND date >= $2 AND date <= $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_conversion_keeps_figures() {
        let now = Utc::now();
        let row = ExpenseRow {
            id: 3,
            user_id: 9,
            date: now,
            initial_reading: dec!(100),
            final_reading: dec!(150),
            total_distance: dec!(50),
            rate: dec!(3),
            fuel_total: dec!(150),
            miscellaneous_expense: dec!(10),
            amount: dec!(160),
            description: Some("client visit".into()),
            created_at: now,
            updated_at: now,
        };
        let expense = Expense::from(row);
        assert_eq!(expense.id, Some(3));
        assert_eq!(expense.amount, dec!(160));
        assert_eq!(expense.mileage_input().calculate().unwrap().amount, dec!(160));
    }

    #[tokio::test]
    async fn test_mock_upsert_reports_update() {
        let mut repo = MockExpenseRepository::new();
        repo.expect_upsert().returning(|e| {
            Ok(Upserted {
                record: e.clone(),
                inserted: false,
            })
        });

        let expense = Expense::from(ExpenseRow {
            id: 1,
            user_id: 1,
            date: Utc::now(),
            initial_reading: dec!(0),
            final_reading: dec!(1),
            total_distance: dec!(1),
            rate: dec!(1),
            fuel_total: dec!(1),
            miscellaneous_expense: dec!(0),
            amount: dec!(1),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        let saved = repo.upsert(&expense).await.unwrap();
        assert!(!saved.inserted);
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL pointing at a scratch database"]
    async fn test_concurrent_submissions_share_one_row() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = PgPool::connect(&url).await.unwrap();
        crate::Database::from_pool(pool.clone()).migrate().await.unwrap();

        let email = format!(
            "upsert-{}@example.test",
            Utc::now().timestamp_nanos_opt().unwrap()
        );
        let user_id: i64 =
            sqlx::query_scalar("INSERT INTO users (name, email) VALUES ('Upsert', $1) RETURNING id")
                .bind(&email)
                .fetch_one(&pool)
                .await
                .unwrap();

        let repo = PgExpenseRepository::new(pool.clone());
        let input = hr_payroll::MileageInput::new(dec!(100), dec!(150), dec!(2));
        let breakdown = input.calculate().unwrap();
        let day = chrono::NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let date = hr_core::dates::to_utc_midnight(day);
        let expense = Expense::from_calculation(user_id, date, &input, &breakdown, None);

        let (first, second) = tokio::join!(repo.upsert(&expense), repo.upsert(&expense));
        let inserted = [first.unwrap().inserted, second.unwrap().inserted];
        assert_eq!(inserted.iter().filter(|i| **i).count(), 1);

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await
            .unwrap();
    }
}
