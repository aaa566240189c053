//! Store model
//!
//! Table: stores

use chrono::{DateTime, Utc};
use hr_core::traits::{Entity, Id, Identifiable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Option<Id>,
    pub name: String,
    /// Default mileage reimbursement per kilometre
    pub fuel_rate_per_km: Decimal,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Store {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for Store {
    const TABLE_NAME: &'static str = "stores";
    const TYPE_NAME: &'static str = "Store";
}
