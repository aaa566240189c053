//! Notification repository
//!
//! Table: notifications. Rows are written only; delivery is out of scope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::traits::Id;
use hr_models::Notification;
use sqlx::{FromRow, PgPool};

use crate::repository::RepositoryResult;

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: Some(row.id),
            user_id: row.user_id,
            message: row.message,
            read: row.read,
            created_at: Some(row.created_at),
        }
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> RepositoryResult<Notification>;

    /// Unread notifications for a user, newest first
    async fn list_unread(&self, user_id: Id) -> RepositoryResult<Vec<Notification>>;
}

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: &Notification) -> RepositoryResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, message, read)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, message, read, created_at
            "#,
        )
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(notification.read)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_unread(&self, user_id: Id) -> RepositoryResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, user_id, message, read, created_at
            FROM notifications
            WHERE user_id = $1 AND NOT read
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }
}
