//! Overtime request contract

use std::str::FromStr;

use chrono::{DateTime, Utc};
use hr_core::error::ValidationErrors;
use hr_models::Compensation;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

pub const MAX_OVERTIME_HOURS: u32 = 12;

/// Body of `POST /overtime`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeRequestBody {
    pub date: Option<String>,
    pub hours: Option<Decimal>,
    pub compensation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOvertime {
    pub date: DateTime<Utc>,
    pub hours: Decimal,
    pub compensation: Compensation,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OvertimeContract;

impl Contract<OvertimeRequestBody> for OvertimeContract {
    type Output = NewOvertime;

    fn validate(&self, input: &OvertimeRequestBody) -> ValidationResult<NewOvertime> {
        let mut errors = ValidationErrors::new();

        let date = base::required_date("date", input.date.as_deref(), &mut errors);
        let hours = match input.hours {
            None => {
                errors.add("hours", "can't be blank");
                None
            }
            Some(h) if h <= Decimal::ZERO || h > Decimal::from(MAX_OVERTIME_HOURS) => {
                errors.add("hours", format!("must be greater than 0 and at most {}", MAX_OVERTIME_HOURS));
                None
            }
            Some(h) if h.normalize().scale() > base::QUANTITY.scale => {
                errors.add("hours", "must have at most 2 decimal places");
                None
            }
            Some(h) => Some(h),
        };
        let compensation = base::required("compensation", input.compensation.as_deref(), &mut errors)
            .and_then(|raw| match Compensation::from_str(raw) {
                Ok(c) => Some(c),
                Err(_) => {
                    errors.add("compensation", "must be cash or comp_off");
                    None
                }
            });

        match (date, hours, compensation) {
            (Some(date), Some(hours), Some(compensation)) => Ok(NewOvertime {
                date,
                hours,
                compensation,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn body(hours: Decimal, compensation: &str) -> OvertimeRequestBody {
        OvertimeRequestBody {
            date: Some("2024-05-10".into()),
            hours: Some(hours),
            compensation: Some(compensation.into()),
        }
    }

    #[test]
    fn test_hours_bounds() {
        assert!(OvertimeContract.validate(&body(dec!(12), "cash")).is_ok());
        assert!(OvertimeContract.validate(&body(dec!(0.5), "comp_off")).is_ok());
        assert!(OvertimeContract.validate(&body(dec!(0), "cash")).unwrap_err().has_error("hours"));
        assert!(OvertimeContract.validate(&body(dec!(12.5), "cash")).unwrap_err().has_error("hours"));
        assert!(OvertimeContract.validate(&body(dec!(1.333), "comp_off")).unwrap_err().has_error("hours"));
    }

    #[test]
    fn test_compensation_values() {
        let errors = OvertimeContract.validate(&body(dec!(2), "shares")).unwrap_err();
        assert!(errors.has_error("compensation"));
    }
}
