//! Calendar / attendance threshold settings contract

use std::collections::HashSet;

use chrono::{NaiveTime, Weekday};
use hr_core::error::ValidationErrors;
use hr_models::serde_format::hh_mm;
use hr_models::Calendar;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

pub const MAX_THRESHOLD_MINUTES: i64 = 240;

/// Body of `POST` / `PUT /settings/calendar`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarRequest {
    pub store_name: Option<String>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub late_threshold_minutes: Option<i64>,
    pub early_exit_threshold_minutes: Option<i64>,
    pub weekend_days: Option<Vec<String>>,
    pub fuel_rate_per_km: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarChanges {
    pub store_name: String,
    pub shift_start: Option<NaiveTime>,
    pub shift_end: Option<NaiveTime>,
    pub late_threshold_minutes: Option<i32>,
    pub early_exit_threshold_minutes: Option<i32>,
    pub weekend_days: Option<Vec<Weekday>>,
    pub fuel_rate_per_km: Option<Decimal>,
}

impl CalendarChanges {
    pub fn apply(&self, calendar: &mut Calendar) {
        if let Some(t) = self.shift_start {
            calendar.shift_start = t;
        }
        if let Some(t) = self.shift_end {
            calendar.shift_end = t;
        }
        if let Some(m) = self.late_threshold_minutes {
            calendar.late_threshold_minutes = m;
        }
        if let Some(m) = self.early_exit_threshold_minutes {
            calendar.early_exit_threshold_minutes = m;
        }
        if let Some(days) = &self.weekend_days {
            calendar.weekend_days = days.clone();
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CalendarContract;

impl CalendarContract {
    pub fn new() -> Self {
        Self
    }

    fn validate_time(&self, field: &str, raw: Option<&str>, errors: &mut ValidationErrors) -> Option<NaiveTime> {
        let raw = raw?;
        let parsed = hh_mm::parse(raw);
        if parsed.is_none() {
            errors.add(field, "must be a time in HH:MM format");
        }
        parsed
    }

    fn validate_threshold(&self, field: &str, value: Option<i64>, errors: &mut ValidationErrors) -> Option<i32> {
        let value = value?;
        if !(0..=MAX_THRESHOLD_MINUTES).contains(&value) {
            errors.add(field, format!("must be between 0 and {}", MAX_THRESHOLD_MINUTES));
            return None;
        }
        Some(value as i32)
    }

    fn validate_weekend_days(&self, raw: Option<&Vec<String>>, errors: &mut ValidationErrors) -> Option<Vec<Weekday>> {
        let raw = raw?;
        let mut days = Vec::with_capacity(raw.len());
        let mut seen = HashSet::new();
        for name in raw {
            match name.trim().parse::<Weekday>() {
                Ok(day) if seen.insert(day) => days.push(day),
                Ok(_) => errors.add("weekendDays", format!("{} is listed twice", name.trim())),
                Err(_) => errors.add("weekendDays", format!("{} is not a day of the week", name.trim())),
            }
        }
        if days.len() > 6 {
            errors.add("weekendDays", "must leave at least one working day");
        }
        Some(days)
    }

    /// Shift order is checked on the merged calendar, since an update may
    /// change only one end
    pub fn validate_shift_order(&self, calendar: &Calendar) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        if calendar.shift_end <= calendar.shift_start {
            errors.add("shiftEnd", "must be after shiftStart");
        }
        errors.into_result()
    }
}

impl Contract<CalendarRequest> for CalendarContract {
    type Output = CalendarChanges;

    fn validate(&self, input: &CalendarRequest) -> ValidationResult<CalendarChanges> {
        let mut errors = ValidationErrors::new();

        let store_name = base::required("storeName", input.store_name.as_deref(), &mut errors);
        let shift_start = self.validate_time("shiftStart", input.shift_start.as_deref(), &mut errors);
        let shift_end = self.validate_time("shiftEnd", input.shift_end.as_deref(), &mut errors);
        let late_threshold_minutes =
            self.validate_threshold("lateThresholdMinutes", input.late_threshold_minutes, &mut errors);
        let early_exit_threshold_minutes = self.validate_threshold(
            "earlyExitThresholdMinutes",
            input.early_exit_threshold_minutes,
            &mut errors,
        );
        let weekend_days = self.validate_weekend_days(input.weekend_days.as_ref(), &mut errors);
        base::positive("fuelRatePerKm", input.fuel_rate_per_km, &mut errors);
        base::fits("fuelRatePerKm", input.fuel_rate_per_km, base::RATE, &mut errors);

        if let (Some(start), Some(end)) = (shift_start, shift_end) {
            if end <= start {
                errors.add("shiftEnd", "must be after shiftStart");
            }
        }

        match store_name {
            Some(store_name) if errors.is_empty() => Ok(CalendarChanges {
                store_name: store_name.to_string(),
                shift_start,
                shift_end,
                late_threshold_minutes,
                early_exit_threshold_minutes,
                weekend_days,
                fuel_rate_per_km: input.fuel_rate_per_km,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: serde_json::Value) -> CalendarRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_calendar() {
        let changes = CalendarContract::new()
            .validate(&request(serde_json::json!({
                "storeName": "Powai",
                "shiftStart": "10:00",
                "shiftEnd": "19:30",
                "lateThresholdMinutes": 10,
                "earlyExitThresholdMinutes": 0,
                "weekendDays": ["sunday", "Sat"]
            })))
            .unwrap();

        let mut calendar = Calendar::default_for(1);
        changes.apply(&mut calendar);
        assert_eq!(calendar.shift_start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(calendar.late_threshold_minutes, 10);
        assert_eq!(calendar.weekend_days, vec![Weekday::Sun, Weekday::Sat]);
        assert!(CalendarContract::new().validate_shift_order(&calendar).is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        let errors = CalendarContract::new()
            .validate(&request(serde_json::json!({
                "storeName": "Powai",
                "lateThresholdMinutes": 241,
                "earlyExitThresholdMinutes": -1
            })))
            .unwrap_err();
        assert!(errors.has_error("lateThresholdMinutes"));
        assert!(errors.has_error("earlyExitThresholdMinutes"));
    }

    #[test]
    fn test_bad_times_and_days() {
        let errors = CalendarContract::new()
            .validate(&request(serde_json::json!({
                "storeName": "Powai",
                "shiftStart": "18:00",
                "shiftEnd": "09:00",
                "weekendDays": ["funday"]
            })))
            .unwrap_err();
        assert!(errors.has_error("shiftEnd"));
        assert!(errors.has_error("weekendDays"));
    }

    #[test]
    fn test_merged_shift_order() {
        let changes = CalendarContract::new()
            .validate(&request(serde_json::json!({
                "storeName": "Powai",
                "shiftStart": "19:00"
            })))
            .unwrap();
        let mut calendar = Calendar::default_for(1);
        changes.apply(&mut calendar);
        assert!(CalendarContract::new().validate_shift_order(&calendar).is_err());
    }
}
