//! Attendance punch contract

use chrono::{DateTime, TimeZone, Utc};
use hr_core::dates;
use hr_core::error::ValidationErrors;
use hr_core::traits::Id;
use hr_models::serde_format::hh_mm;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

/// Body of `POST /attendance`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendanceRequest {
    /// Record for another employee (managers only)
    pub employee_id: Option<Id>,
    pub date: Option<String>,
    /// `HH:MM` IST wall-clock on `date`, or an RFC 3339 timestamp
    pub in_time: Option<String>,
    pub out_time: Option<String>,
    #[serde(default)]
    pub marked_absent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: Option<Id>,
    pub date: DateTime<Utc>,
    pub in_time: Option<DateTime<Utc>>,
    pub out_time: Option<DateTime<Utc>>,
    pub marked_absent: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AttendanceContract;

impl AttendanceContract {
    /// `next_day_allowed` lets an out-punch close a shift after midnight
    fn validate_punch(
        &self,
        field: &str,
        raw: Option<&str>,
        date: Option<DateTime<Utc>>,
        next_day_allowed: bool,
        errors: &mut ValidationErrors,
    ) -> Option<DateTime<Utc>> {
        let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            let ts = ts.with_timezone(&Utc);
            let day = dates::display_date(date?);
            let punched = dates::display_date(ts);
            let on_day = punched == day || (next_day_allowed && day.succ_opt() == Some(punched));
            if !on_day {
                errors.add(field, "must fall on date");
                return None;
            }
            return Some(ts);
        }
        let Some(time) = hh_mm::parse(raw) else {
            errors.add(field, "must be HH:MM or an RFC 3339 timestamp");
            return None;
        };
        let day = dates::display_date(date?);
        dates::ist()
            .from_local_datetime(&day.and_time(time))
            .single()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl Contract<RecordAttendanceRequest> for AttendanceContract {
    type Output = NewAttendance;

    fn validate(&self, input: &RecordAttendanceRequest) -> ValidationResult<NewAttendance> {
        let mut errors = ValidationErrors::new();

        let date = base::required_date("date", input.date.as_deref(), &mut errors);
        let in_time =
            self.validate_punch("inTime", input.in_time.as_deref(), date, false, &mut errors);
        let out_time =
            self.validate_punch("outTime", input.out_time.as_deref(), date, true, &mut errors);

        if input.marked_absent && (in_time.is_some() || out_time.is_some()) {
            errors.add("markedAbsent", "cannot be combined with punch times");
        }
        if !input.marked_absent && in_time.is_none() && out_time.is_none() && errors.is_empty() {
            errors.add_base("inTime, outTime or markedAbsent is required");
        }
        if let (Some(i), Some(o)) = (in_time, out_time) {
            if o < i {
                errors.add("outTime", "must be after inTime");
            }
        }

        match date {
            Some(date) if errors.is_empty() => Ok(NewAttendance {
                employee_id: input.employee_id,
                date,
                in_time,
                out_time,
                marked_absent: input.marked_absent,
            }),
            _ => Err(errors),
        }
    }
}
