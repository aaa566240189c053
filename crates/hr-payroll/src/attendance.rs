//! Attendance status derivation
//!
//! Precedence, first match wins:
//! future → weekend / weekday-off → holiday → absent → late → early-exit → present.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use hr_core::dates;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    Future,
    Weekend,
    WeekdayOff,
    Holiday,
    Absent,
    Late,
    EarlyExit,
    Present,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Future => "future",
            DayStatus::Weekend => "weekend",
            DayStatus::WeekdayOff => "weekday-off",
            DayStatus::Holiday => "holiday",
            DayStatus::Absent => "absent",
            DayStatus::Late => "late",
            DayStatus::EarlyExit => "early-exit",
            DayStatus::Present => "present",
        }
    }

    /// Days the employee was expected at work and turned up
    pub fn is_attended(&self) -> bool {
        matches!(self, DayStatus::Present | DayStatus::Late | DayStatus::EarlyExit)
    }
}

/// Per-store shift definition and tolerances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub late_threshold_minutes: u32,
    pub early_exit_threshold_minutes: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            shift_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            shift_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            late_threshold_minutes: 15,
            early_exit_threshold_minutes: 15,
        }
    }
}

impl Thresholds {
    /// Latest IST wall-clock time that still counts as on time
    pub fn late_cutoff(&self) -> NaiveTime {
        let (time, wrapped) = self
            .shift_start
            .overflowing_add_signed(Duration::minutes(self.late_threshold_minutes as i64));
        if wrapped != 0 {
            NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(self.shift_start)
        } else {
            time
        }
    }

    /// Earliest IST wall-clock time an employee may leave
    pub fn early_exit_cutoff(&self) -> NaiveTime {
        let (time, wrapped) = self
            .shift_end
            .overflowing_sub_signed(Duration::minutes(self.early_exit_threshold_minutes as i64));
        if wrapped != 0 {
            NaiveTime::MIN
        } else {
            time
        }
    }
}

/// Late / early flags derived from punches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceFlags {
    pub is_late_entry: bool,
    pub is_early_exit: bool,
}

impl AttendanceFlags {
    /// Compare UTC punches, shifted to IST, against the store thresholds
    pub fn evaluate(
        in_time: Option<DateTime<Utc>>,
        out_time: Option<DateTime<Utc>>,
        thresholds: &Thresholds,
    ) -> Self {
        let is_late_entry = in_time
            .map(|t| dates::to_display(t).time() > thresholds.late_cutoff())
            .unwrap_or(false);
        let is_early_exit = out_time
            .map(|t| dates::to_display(t).time() < thresholds.early_exit_cutoff())
            .unwrap_or(false);
        Self {
            is_late_entry,
            is_early_exit,
        }
    }
}

/// Stored attendance facts for one employee-day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayRecord {
    pub in_time: Option<DateTime<Utc>>,
    pub out_time: Option<DateTime<Utc>>,
    /// Explicitly marked absent by HR
    pub marked_absent: bool,
    pub flags: AttendanceFlags,
}

/// Calendar facts needed to classify a day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarContext {
    pub holidays: HashSet<NaiveDate>,
    pub weekend_days: Vec<Weekday>,
    /// The employee's personal weekly day off
    pub weekly_off: Option<Weekday>,
}

impl Default for CalendarContext {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            weekend_days: vec![Weekday::Sun],
            weekly_off: None,
        }
    }
}

pub fn classify_day(
    date: NaiveDate,
    today: NaiveDate,
    record: Option<&DayRecord>,
    calendar: &CalendarContext,
) -> DayStatus {
    if date > today {
        return DayStatus::Future;
    }
    if calendar.weekend_days.contains(&date.weekday()) {
        return DayStatus::Weekend;
    }
    if calendar.weekly_off == Some(date.weekday()) {
        return DayStatus::WeekdayOff;
    }
    if calendar.holidays.contains(&date) {
        return DayStatus::Holiday;
    }

    let record = match record {
        Some(r) if !r.marked_absent && r.in_time.is_some() => r,
        _ => return DayStatus::Absent,
    };

    if record.flags.is_late_entry {
        DayStatus::Late
    } else if record.flags.is_early_exit {
        DayStatus::EarlyExit
    } else {
        DayStatus::Present
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// Classify every day in `start..=end`
pub fn classify_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    records: &HashMap<NaiveDate, DayRecord>,
    calendar: &CalendarContext,
) -> Vec<ClassifiedDay> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| ClassifiedDay {
            date,
            status: classify_day(date, today, records.get(&date), calendar),
        })
        .collect()
}

/// Count of days per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary(pub BTreeMap<DayStatus, u32>);

impl AttendanceSummary {
    pub fn from_days(days: &[ClassifiedDay]) -> Self {
        let mut counts = BTreeMap::new();
        for day in days {
            *counts.entry(day.status).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn count(&self, status: DayStatus) -> u32 {
        self.0.get(&status).copied().unwrap_or(0)
    }
}
