//! Leave application contract

use std::str::FromStr;

use chrono::{DateTime, Utc};
use hr_core::error::ValidationErrors;
use hr_models::LeaveType;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

const MAX_REASON_LENGTH: usize = 1000;

/// Body of `POST /leaves`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeaveRequest {
    pub leave_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLeave {
    pub leave_type: LeaveType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ApplyLeaveContract;

impl Contract<ApplyLeaveRequest> for ApplyLeaveContract {
    type Output = NewLeave;

    fn validate(&self, input: &ApplyLeaveRequest) -> ValidationResult<NewLeave> {
        let mut errors = ValidationErrors::new();

        let leave_type = base::required("leaveType", input.leave_type.as_deref(), &mut errors)
            .and_then(|raw| match LeaveType::from_str(raw) {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.add("leaveType", "must be one of casual, sick, earned, comp_off, unpaid");
                    None
                }
            });
        let start_date = base::required_date("startDate", input.start_date.as_deref(), &mut errors);
        let end_date = base::required_date("endDate", input.end_date.as_deref(), &mut errors);
        base::max_length("reason", input.reason.as_deref(), MAX_REASON_LENGTH, &mut errors);

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("endDate", "must be on or after startDate");
            }
        }

        match (leave_type, start_date, end_date) {
            (Some(leave_type), Some(start_date), Some(end_date)) if errors.is_empty() => Ok(NewLeave {
                leave_type,
                start_date,
                end_date,
                reason: input
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: serde_json::Value) -> ApplyLeaveRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_leave() {
        let leave = ApplyLeaveContract
            .validate(&request(serde_json::json!({
                "leaveType": "comp_off",
                "startDate": "2024-09-02",
                "endDate": "2024-09-02",
                "reason": "family function"
            })))
            .unwrap();
        assert_eq!(leave.leave_type, LeaveType::CompOff);
        assert_eq!(leave.start_date, leave.end_date);
    }

    #[test]
    fn test_invalid_leave() {
        let errors = ApplyLeaveContract
            .validate(&request(serde_json::json!({
                "leaveType": "vacation",
                "startDate": "2024-09-05",
                "endDate": "2024-09-02"
            })))
            .unwrap_err();
        assert!(errors.has_error("leaveType"));
        assert!(errors.has_error("endDate"));
    }
}
