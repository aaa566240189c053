//! Notification rows written on review decisions. Delivery happens elsewhere.

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Option<Id>,
    pub user_id: Id,
    pub message: String,
    pub read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(user_id: Id, message: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id,
            message: message.into(),
            read: false,
            created_at: None,
        }
    }
}

impl Identifiable for Notification {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Notification {
    const TABLE_NAME: &'static str = "notifications";
    const TYPE_NAME: &'static str = "Notification";
}
