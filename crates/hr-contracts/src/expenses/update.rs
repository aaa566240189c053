//! Update contract for expenses

use chrono::{DateTime, Utc};
use hr_core::error::ValidationErrors;
use hr_models::Expense;
use hr_payroll::MileageInput;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::MAX_DESCRIPTION_LENGTH;
use crate::base::{self, Contract, ValidationResult};

/// Body of `PUT /expenses/:id`; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub date: Option<String>,
    pub initial_reading: Option<Decimal>,
    pub final_reading: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub miscellaneous_expense: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub date: Option<DateTime<Utc>>,
    pub initial_reading: Option<Decimal>,
    pub final_reading: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub miscellaneous_expense: Option<Decimal>,
    pub description: Option<String>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        *self == ExpenseChanges::default()
    }

    /// Readings after applying the changes to a stored expense
    pub fn merged_input(&self, current: &Expense) -> MileageInput {
        MileageInput::new(
            self.initial_reading.unwrap_or(current.initial_reading),
            self.final_reading.unwrap_or(current.final_reading),
            self.rate.unwrap_or(current.rate),
        )
        .with_miscellaneous(
            self.miscellaneous_expense
                .unwrap_or(current.miscellaneous_expense),
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateExpenseContract;

impl UpdateExpenseContract {
    pub fn new() -> Self {
        Self
    }
}

impl Contract<UpdateExpenseRequest> for UpdateExpenseContract {
    type Output = ExpenseChanges;

    fn validate(&self, input: &UpdateExpenseRequest) -> ValidationResult<ExpenseChanges> {
        let mut errors = ValidationErrors::new();

        let date = base::optional_date("date", input.date.as_deref(), &mut errors);
        base::non_negative("initialReading", input.initial_reading, &mut errors);
        if let (Some(i), Some(f)) = (input.initial_reading, input.final_reading) {
            if f < i {
                errors.add("finalReading", "must be greater than or equal to initialReading");
            }
        }
        base::positive("rate", input.rate, &mut errors);
        base::non_negative("miscellaneousExpense", input.miscellaneous_expense, &mut errors);
        super::create::check_columns(
            input.initial_reading,
            input.final_reading,
            input.rate,
            input.miscellaneous_expense,
            &mut errors,
        );
        base::max_length(
            "description",
            input.description.as_deref(),
            MAX_DESCRIPTION_LENGTH,
            &mut errors,
        );

        errors.into_result()?;

        let changes = ExpenseChanges {
            date,
            initial_reading: input.initial_reading,
            final_reading: input.final_reading,
            rate: input.rate,
            miscellaneous_expense: input.miscellaneous_expense,
            description: input.description.as_ref().map(|d| d.trim().to_string()),
        };
        if changes.is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add_base("no changes submitted");
            return Err(errors);
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_core::dates;
    use hr_payroll::CalculationError;
    use rust_decimal_macros::dec;

    fn stored() -> Expense {
        let input = MileageInput::new(dec!(100), dec!(150), dec!(2));
        let breakdown = input.calculate().unwrap();
        let date = dates::normalize_submitted("date", "2024-02-01").unwrap();
        Expense::from_calculation(1, date, &input, &breakdown, None)
    }

    #[test]
    fn test_merge_recomputes_from_stored_values() {
        let req = UpdateExpenseRequest {
            final_reading: Some(dec!(180)),
            ..Default::default()
        };
        let changes = UpdateExpenseContract::new().validate(&req).unwrap();
        let merged = changes.merged_input(&stored()).calculate().unwrap();
        assert_eq!(merged.total_distance, dec!(80));
        assert_eq!(merged.amount, dec!(160));
    }

    #[test]
    fn test_merged_readings_are_rechecked() {
        let req = UpdateExpenseRequest {
            final_reading: Some(dec!(90)),
            ..Default::default()
        };
        let changes = UpdateExpenseContract::new().validate(&req).unwrap();
        assert_eq!(
            changes.merged_input(&stored()).calculate().unwrap_err(),
            CalculationError::FinalBeforeInitial
        );
    }

    #[test]
    fn test_unstorable_rate_rejected() {
        let req = UpdateExpenseRequest {
            rate: Some(dec!(2.125)),
            ..Default::default()
        };
        let errors = UpdateExpenseContract::new().validate(&req).unwrap_err();
        assert!(errors.has_error("rate"));
    }

    #[test]
    fn test_empty_update_rejected() {
        let errors = UpdateExpenseContract::new()
            .validate(&UpdateExpenseRequest::default())
            .unwrap_err();
        assert_eq!(errors.base_errors, vec!["no changes submitted".to_string()]);
    }
}
