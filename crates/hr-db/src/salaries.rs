//! Salary (payslip) repository
//!
//! Table: salaries. One row per (user_id, month); regenerating overwrites the
//! figures and takes the payslip back out of publication.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hr_core::pagination::{Paginated, Pagination};
use hr_core::traits::Id;
use hr_models::Salary;
use hr_payroll::PayslipBreakdown;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::repository::{RecordFilter, RepositoryResult, Upserted};

#[derive(Debug, Clone, FromRow)]
pub struct SalaryRow {
    pub id: i64,
    pub user_id: i64,
    pub month: NaiveDate,
    pub basic_salary: Decimal,
    pub per_day_salary: Decimal,
    pub per_hour_salary: Decimal,
    pub absent_days: Decimal,
    pub absent_hours: Decimal,
    pub absent_days_deduction: Decimal,
    pub absent_hours_deduction: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_rate: Decimal,
    pub overtime_pay: Decimal,
    pub bonus: Decimal,
    pub fuel_expenses: Decimal,
    pub provident_fund: Decimal,
    pub esi: Decimal,
    pub tax: Decimal,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SalaryRow> for Salary {
    fn from(row: SalaryRow) -> Self {
        Salary {
            id: Some(row.id),
            user_id: row.user_id,
            month: row.month,
            breakdown: PayslipBreakdown {
                basic_salary: row.basic_salary,
                per_day_salary: row.per_day_salary,
                per_hour_salary: row.per_hour_salary,
                absent_days: row.absent_days,
                absent_hours: row.absent_hours,
                absent_days_deduction: row.absent_days_deduction,
                absent_hours_deduction: row.absent_hours_deduction,
                overtime_hours: row.overtime_hours,
                overtime_rate: row.overtime_rate,
                overtime_pay: row.overtime_pay,
                bonus: row.bonus,
                fuel_expenses: row.fuel_expenses,
                provident_fund: row.provident_fund,
                esi: row.esi,
                tax: row.tax,
                gross_salary: row.gross_salary,
                total_deductions: row.total_deductions,
                net_salary: row.net_salary,
            },
            published: row.published,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[derive(Debug, FromRow)]
struct UpsertedSalaryRow {
    #[sqlx(flatten)]
    salary: SalaryRow,
    inserted: bool,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait SalaryRepository: Send + Sync {
    /// Store a computed payslip; an existing one for the month is replaced and unpublished
    async fn upsert(&self, salary: &Salary) -> RepositoryResult<Upserted<Salary>>;

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Salary>>;

    async fn find_for_month(&self, user_id: Id, month: NaiveDate) -> RepositoryResult<Option<Salary>>;

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Salary>>;

    async fn set_published(&self, id: Id, published: bool) -> RepositoryResult<Option<Salary>>;
}

const COLUMNS: &str = "s.id, s.user_id, s.month, s.basic_salary, s.per_day_salary, \
                       s.per_hour_salary, s.absent_days, s.absent_hours, s.absent_days_deduction, \
                       s.absent_hours_deduction, s.overtime_hours, s.overtime_rate, s.overtime_pay, \
                       s.bonus, s.fuel_expenses, s.provident_fund, s.esi, s.tax, s.gross_salary, \
                       s.total_deductions, s.net_salary, s.published, s.created_at, s.updated_at";

// `from`/`to` are compared against the first day of the month
const FILTER: &str = r#"
    FROM salaries s
    JOIN users u ON u.id = s.user_id
    WHERE ($1::bigint IS NULL OR s.user_id = $1)
      AND ($2::bigint IS NULL OR u.store_id = $2)
      AND ($3::timestamptz IS NULL OR s.month >= date_trunc('month', $3)::date)
      AND ($4::timestamptz IS NULL OR s.month <= $4::date)
"#;

pub struct PgSalaryRepository {
    pool: PgPool,
}

impl PgSalaryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalaryRepository for PgSalaryRepository {
    async fn upsert(&self, salary: &Salary) -> RepositoryResult<Upserted<Salary>> {
        let b = &salary.breakdown;
        let row = sqlx::query_as::<_, UpsertedSalaryRow>(&format!(
            r#"
            INSERT INTO salaries AS s (
                user_id, month, basic_salary, per_day_salary, per_hour_salary, absent_days,
                absent_hours, absent_days_deduction, absent_hours_deduction, overtime_hours,
                overtime_rate, overtime_pay, bonus, fuel_expenses, provident_fund, esi, tax,
                gross_salary, total_deductions, net_salary, published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, FALSE)
            ON CONFLICT (user_id, month) DO UPDATE SET
                basic_salary = EXCLUDED.basic_salary,
                per_day_salary = EXCLUDED.per_day_salary,
                per_hour_salary = EXCLUDED.per_hour_salary,
                absent_days = EXCLUDED.absent_days,
                absent_hours = EXCLUDED.absent_hours,
                absent_days_deduction = EXCLUDED.absent_days_deduction,
                absent_hours_deduction = EXCLUDED.absent_hours_deduction,
                overtime_hours = EXCLUDED.overtime_hours,
                overtime_rate = EXCLUDED.overtime_rate,
                overtime_pay = EXCLUDED.overtime_pay,
                bonus = EXCLUDED.bonus,
                fuel_expenses = EXCLUDED.fuel_expenses,
                provident_fund = EXCLUDED.provident_fund,
                esi = EXCLUDED.esi,
                tax = EXCLUDED.tax,
                gross_salary = EXCLUDED.gross_salary,
                total_deductions = EXCLUDED.total_deductions,
                net_salary = EXCLUDED.net_salary,
                published = FALSE,
                updated_at = now()
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            COLUMNS
        ))
        .bind(salary.user_id)
        .bind(salary.month)
        .bind(b.basic_salary)
        .bind(b.per_day_salary)
        .bind(b.per_hour_salary)
        .bind(b.absent_days)
        .bind(b.absent_hours)
        .bind(b.absent_days_deduction)
        .bind(b.absent_hours_deduction)
        .bind(b.overtime_hours)
        .bind(b.overtime_rate)
        .bind(b.overtime_pay)
        .bind(b.bonus)
        .bind(b.fuel_expenses)
        .bind(b.provident_fund)
        .bind(b.esi)
        .bind(b.tax)
        .bind(b.gross_salary)
        .bind(b.total_deductions)
        .bind(b.net_salary)
        .fetch_one(&self.pool)
        .await?;

        Ok(Upserted {
            record: row.salary.into(),
            inserted: row.inserted,
        })
    }

    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Salary>> {
        let row = sqlx::query_as::<_, SalaryRow>(&format!(
            "SELECT {} FROM salaries s WHERE s.id = $1",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Salary::from))
    }

    async fn find_for_month(&self, user_id: Id, month: NaiveDate) -> RepositoryResult<Option<Salary>> {
        let row = sqlx::query_as::<_, SalaryRow>(&format!(
            "SELECT {} FROM salaries s WHERE s.user_id = $1 AND s.month = $2",
            COLUMNS
        ))
        .bind(user_id)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Salary::from))
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Paginated<Salary>> {
        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {}", FILTER))
            .bind(filter.user_id)
            .bind(filter.store_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, SalaryRow>(&format!(
            "SELECT {} {} ORDER BY s.month DESC, s.user_id LIMIT $5 OFFSET $6",
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
            rows.into_iter().map(Salary::from).collect(),
            total,
            pagination,
        ))
    }

    async fn set_published(&self, id: Id, published: bool) -> RepositoryResult<Option<Salary>> {
        let row = sqlx::query_as::<_, SalaryRow>(&format!(
            r#"
            UPDATE salaries AS s SET published = $2, updated_at = now()
            WHERE s.id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Salary::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_payroll::PayslipInput;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_reassembles_breakdown() {
        let b = PayslipInput::new(dec!(30000)).calculate().unwrap();
        let now = Utc::now();
        let row = SalaryRow {
            id: 1,
            user_id: 5,
            month: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            basic_salary: b.basic_salary,
            per_day_salary: b.per_day_salary,
            per_hour_salary: b.per_hour_salary,
            absent_days: b.absent_days,
            absent_hours: b.absent_hours,
            absent_days_deduction: b.absent_days_deduction,
            absent_hours_deduction: b.absent_hours_deduction,
            overtime_hours: b.overtime_hours,
            overtime_rate: b.overtime_rate,
            overtime_pay: b.overtime_pay,
            bonus: b.bonus,
            fuel_expenses: b.fuel_expenses,
            provident_fund: b.provident_fund,
            esi: b.esi,
            tax: b.tax,
            gross_salary: b.gross_salary,
            total_deductions: b.total_deductions,
            net_salary: b.net_salary,
            published: true,
            created_at: now,
            updated_at: now,
        };
        let salary = Salary::from(row);
        assert_eq!(salary.breakdown, b);
        assert!(salary.published);
        assert_eq!(salary.month_label(), "2024-03");
    }
}
