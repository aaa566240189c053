//! Leave model
//!
//! Table: leaves

use chrono::{DateTime, Utc};
use hr_core::dates;
use hr_core::traits::{EmployeeScoped, Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

use crate::serde_format::display_date;

text_enum! {
    pub enum LeaveType {
        Casual => "casual",
        Sick => "sick",
        Earned => "earned",
        CompOff => "comp_off",
        Unpaid => "unpaid",
    }
}

text_enum! {
    /// Review state shared by leave and overtime requests
    pub enum ReviewStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ReviewStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    pub id: Option<Id>,
    pub user_id: Id,
    pub leave_type: LeaveType,
    #[serde(with = "display_date")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "display_date")]
    pub end_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: ReviewStatus,
    pub reviewed_by: Option<Id>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Leave {
    /// Calendar days covered, both ends inclusive
    pub fn days(&self) -> i64 {
        let start = dates::display_date(self.start_date);
        let end = dates::display_date(self.end_date);
        (end - start).num_days() + 1
    }
}

impl Identifiable for Leave {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Leave {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl EmployeeScoped for Leave {
    fn employee_id(&self) -> Id {
        self.user_id
    }
}

impl Entity for Leave {
    const TABLE_NAME: &'static str = "leaves";
    const TYPE_NAME: &'static str = "Leave";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_are_inclusive() {
        let leave = Leave {
            id: None,
            user_id: 1,
            leave_type: LeaveType::CompOff,
            start_date: dates::normalize_submitted("startDate", "2024-07-01").unwrap(),
            end_date: dates::normalize_submitted("endDate", "2024-07-03").unwrap(),
            reason: None,
            status: ReviewStatus::Pending,
            reviewed_by: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(leave.days(), 3);
        let json = serde_json::to_value(&leave).unwrap();
        assert_eq!(json["leaveType"], "comp_off");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_review_status_is_final() {
        assert!(!ReviewStatus::Pending.is_final());
        assert!(ReviewStatus::Approved.is_final());
        assert!(ReviewStatus::Rejected.is_final());
    }
}
