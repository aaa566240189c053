//! User repository
//!
//! Table: users

use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};
use hr_core::traits::Id;
use hr_models::{Role, User};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::repository::{parse_text, RepositoryError, RepositoryResult};

/// User database row, joined with the store name
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub store_id: Option<i64>,
    pub store_name: Option<String>,
    pub weekly_off: Option<String>,
    pub basic_salary: Decimal,
    pub comp_off_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> RepositoryResult<Self> {
        let role: Role = parse_text("users.role", &row.role)?;
        let weekly_off = row
            .weekly_off
            .as_deref()
            .map(|day| parse_text::<Weekday>("users.weekly_off", day))
            .transpose()?;
        Ok(User {
            id: Some(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            role,
            store_id: row.store_id,
            weekly_off,
            store_name: row.store_name,
            basic_salary: row.basic_salary,
            comp_off_balance: row.comp_off_balance,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        })
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>>;

    /// Persist profile and employment fields
    async fn update(&self, user: &User) -> RepositoryResult<User>;

    /// Add `delta` days to the comp-off balance; `None` if the balance would go negative
    async fn adjust_comp_off(&self, user_id: Id, delta: Decimal) -> RepositoryResult<Option<Decimal>>;
}

const SELECT_USER: &str = r#"
    SELECT u.id, u.name, u.email, u.phone, u.address, u.role, u.store_id,
           s.name AS store_name, u.weekly_off, u.basic_salary, u.comp_off_balance,
           u.created_at, u.updated_at
    FROM users u
    LEFT JOIN stores s ON s.id = u.store_id
"#;

/// User repository implementation
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn update(&self, user: &User) -> RepositoryResult<User> {
        let id = user
            .id
            .ok_or_else(|| RepositoryError::NotFound("unsaved user".to_string()))?;

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, phone = $3, address = $4, weekly_off = $5,
                role = $6, store_id = $7, basic_salary = $8, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.weekly_off.map(|d| d.to_string()))
        .bind(user.role.as_str())
        .bind(user.store_id)
        .bind(user.basic_salary)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn adjust_comp_off(&self, user_id: Id, delta: Decimal) -> RepositoryResult<Option<Decimal>> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE users
            SET comp_off_balance = comp_off_balance + $2, updated_at = now()
            WHERE id = $1 AND comp_off_balance + $2 >= 0
            RETURNING comp_off_balance
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row() -> UserRow {
        UserRow {
            id: 4,
            name: "Kiran".into(),
            email: "kiran@example.com".into(),
            phone: None,
            address: None,
            role: "hr_coordinator".into(),
            store_id: Some(2),
            store_name: Some("Thane".into()),
            weekly_off: Some("Wed".into()),
            basic_salary: dec!(18000),
            comp_off_balance: dec!(1.5),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let user = User::try_from(row()).unwrap();
        assert_eq!(user.role, Role::HrCoordinator);
        assert_eq!(user.weekly_off, Some(Weekday::Wed));
        assert_eq!(user.store_name.as_deref(), Some("Thane"));
    }

    #[test]
    fn test_bad_stored_role() {
        let mut bad = row();
        bad.role = "owner".into();
        assert!(matches!(User::try_from(bad), Err(RepositoryError::InvalidData(_))));
    }
}
