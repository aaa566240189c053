//! Store repository
//!
//! Table: stores

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::Store;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub name: String,
    pub fuel_rate_per_km: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: Some(row.id),
            name: row.name,
            fuel_rate_per_km: row.fuel_rate_per_km,
            created_at: Some(row.created_at),
            updated_at: Some(row.updated_at),
        }
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Store>>;

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Store>>;

    async fn update_fuel_rate(&self, id: Id, rate: Decimal) -> RepositoryResult<Option<Store>>;
}

pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(
            "SELECT id, name, fuel_rate_per_km, created_at, updated_at FROM stores WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Store::from))
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(
            "SELECT id, name, fuel_rate_per_km, created_at, updated_at FROM stores WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Store::from))
    }

    async fn update_fuel_rate(&self, id: Id, rate: Decimal) -> RepositoryResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>(
            r#"
            UPDATE stores SET fuel_rate_per_km = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, name, fuel_rate_per_km, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(rate)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Store::from))
    }
}
