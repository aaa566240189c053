//! Attendance model
//!
//! Table: attendance. One row per (user, date).

use chrono::{DateTime, Utc};
use hr_core::traits::{EmployeeScoped, Entity, Id, Identifiable};
use hr_payroll::{AttendanceFlags, DayRecord};
use serde::{Deserialize, Serialize};

use crate::serde_format::{display_date, display_instant_opt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Option<Id>,
    pub user_id: Id,
    #[serde(with = "display_date")]
    pub date: DateTime<Utc>,
    #[serde(default, with = "display_instant_opt")]
    pub in_time: Option<DateTime<Utc>>,
    #[serde(default, with = "display_instant_opt")]
    pub out_time: Option<DateTime<Utc>>,
    pub marked_absent: bool,
    pub is_late_entry: bool,
    pub is_early_exit: bool,
}

impl AttendanceRecord {
    pub fn flags(&self) -> AttendanceFlags {
        AttendanceFlags {
            is_late_entry: self.is_late_entry,
            is_early_exit: self.is_early_exit,
        }
    }

    pub fn day_record(&self) -> DayRecord {
        DayRecord {
            in_time: self.in_time,
            out_time: self.out_time,
            marked_absent: self.marked_absent,
            flags: self.flags(),
        }
    }
}

impl Identifiable for AttendanceRecord {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl EmployeeScoped for AttendanceRecord {
    fn employee_id(&self) -> Id {
        self.user_id
    }
}

impl Entity for AttendanceRecord {
    const TABLE_NAME: &'static str = "attendance";
    const TYPE_NAME: &'static str = "Attendance";
}
