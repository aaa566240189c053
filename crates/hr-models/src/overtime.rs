//! Overtime request model
//!
//! Table: overtime_requests

use chrono::{DateTime, Utc};
use hr_core::traits::{EmployeeScoped, Entity, Id, Identifiable, Timestamped};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::leave::ReviewStatus;
use crate::serde_format::display_date;

text_enum! {
    /// How approved overtime is paid back
    pub enum Compensation {
        Cash => "cash",
        CompOff => "comp_off",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRequest {
    pub id: Option<Id>,
    pub user_id: Id,
    #[serde(with = "display_date")]
    pub date: DateTime<Utc>,
    pub hours: Decimal,
    pub compensation: Compensation,
    pub status: ReviewStatus,
    pub reviewed_by: Option<Id>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OvertimeRequest {
    /// Comp-off days earned once approved
    pub fn comp_off_days(&self, hours_per_day: Decimal) -> Decimal {
        if self.compensation == Compensation::CompOff && !hours_per_day.is_zero() {
            self.hours / hours_per_day
        } else {
            Decimal::ZERO
        }
    }
}

impl Identifiable for OvertimeRequest {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for OvertimeRequest {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl EmployeeScoped for OvertimeRequest {
    fn employee_id(&self) -> Id {
        self.user_id
    }
}

impl Entity for OvertimeRequest {
    const TABLE_NAME: &'static str = "overtime_requests";
    const TYPE_NAME: &'static str = "OvertimeRequest";
}
