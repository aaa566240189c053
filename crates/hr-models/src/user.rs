//! User model
//!
//! Table: users

use chrono::{DateTime, Utc, Weekday};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::Role;

/// Employee account
///
/// Every user, including HR and MD, is an employee of at most one store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    pub phone: Option<String>,

    pub address: Option<String>,

    pub role: Role,

    pub store_id: Option<Id>,

    /// Personal weekly day off, on top of the store weekend
    pub weekly_off: Option<Weekday>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,

    pub basic_salary: Decimal,

    /// Compensatory leave available, in days
    pub comp_off_balance: Decimal,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            ..Default::default()
        }
    }

    pub fn belongs_to_store(&self, store_id: Id) -> bool {
        self.store_id == Some(store_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_validation() {
        let user = User::new("Asha", "asha@example.com", Role::Employee);
        assert!(user.validate().is_ok());

        let bad = User::new("", "not-an-email", Role::Employee);
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_belongs_to_store() {
        let mut user = User::new("Ravi", "ravi@example.com", Role::StoreDirector);
        user.store_id = Some(3);
        assert!(user.belongs_to_store(3));
        assert!(!user.belongs_to_store(4));
    }
}
