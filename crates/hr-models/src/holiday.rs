//! Holiday model
//!
//! Table: holidays

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable};
use serde::{Deserialize, Serialize};

use crate::serde_format::display_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: Option<Id>,
    pub store_id: Id,
    /// Stored at UTC midnight
    #[serde(with = "display_date")]
    pub date: DateTime<Utc>,
    pub name: String,
}

impl Identifiable for Holiday {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Holiday {
    const TABLE_NAME: &'static str = "holidays";
    const TYPE_NAME: &'static str = "Holiday";
}
