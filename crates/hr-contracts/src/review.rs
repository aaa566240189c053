//! Review decision contract shared by leave and overtime

use std::str::FromStr;

use hr_core::error::ValidationErrors;
use hr_models::ReviewStatus;
use serde::Deserialize;

use crate::base::{self, Contract, ValidationResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub status: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewContract;

impl Contract<ReviewRequest> for ReviewContract {
    type Output = ReviewStatus;

    fn validate(&self, input: &ReviewRequest) -> ValidationResult<ReviewStatus> {
        let mut errors = ValidationErrors::new();
        if let Some(raw) = base::required("status", input.status.as_deref(), &mut errors) {
            match ReviewStatus::from_str(raw) {
                Ok(status) if status.is_final() => return Ok(status),
                _ => errors.add("status", "must be approved or rejected"),
            }
        }
        Err(errors)
    }
}
