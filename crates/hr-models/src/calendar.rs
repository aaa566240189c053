//! Per-store working calendar
//!
//! Table: calendars

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use hr_core::traits::{Entity, Id, Identifiable, Timestamped};
use hr_payroll::Thresholds;
use serde::{Deserialize, Serialize};

use crate::serde_format::hh_mm;

/// Shift times and attendance tolerances for one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: Option<Id>,
    pub store_id: Id,
    #[serde(with = "hh_mm")]
    pub shift_start: NaiveTime,
    #[serde(with = "hh_mm")]
    pub shift_end: NaiveTime,
    pub late_threshold_minutes: i32,
    pub early_exit_threshold_minutes: i32,
    pub weekend_days: Vec<Weekday>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Calendar {
    /// Calendar a store falls back to before one is configured
    pub fn default_for(store_id: Id) -> Self {
        let thresholds = Thresholds::default();
        Self {
            id: None,
            store_id,
            shift_start: thresholds.shift_start,
            shift_end: thresholds.shift_end,
            late_threshold_minutes: thresholds.late_threshold_minutes as i32,
            early_exit_threshold_minutes: thresholds.early_exit_threshold_minutes as i32,
            weekend_days: vec![Weekday::Sun],
            created_at: None,
            updated_at: None,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            shift_start: self.shift_start,
            shift_end: self.shift_end,
            late_threshold_minutes: self.late_threshold_minutes.max(0) as u32,
            early_exit_threshold_minutes: self.early_exit_threshold_minutes.max(0) as u32,
        }
    }
}

impl Identifiable for Calendar {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Calendar {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Calendar {
    const TABLE_NAME: &'static str = "calendars";
    const TYPE_NAME: &'static str = "Calendar";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calendar_thresholds() {
        let calendar = Calendar::default_for(1);
        let thresholds = calendar.thresholds();
        assert_eq!(thresholds, Thresholds::default());
        assert_eq!(calendar.weekend_days, vec![Weekday::Sun]);
    }

    #[test]
    fn test_serializes_shift_as_hh_mm() {
        let json = serde_json::to_value(Calendar::default_for(1)).unwrap();
        assert_eq!(json["shiftStart"], "09:00");
        assert_eq!(json["shiftEnd"], "18:00");
        assert_eq!(json["lateThresholdMinutes"], 15);
    }
}
