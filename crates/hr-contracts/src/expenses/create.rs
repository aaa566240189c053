//! Create contract for expenses

use chrono::{DateTime, Utc};
use hr_core::error::ValidationErrors;
use hr_core::traits::Id;
use hr_payroll::MileageInput;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::MAX_DESCRIPTION_LENGTH;
use crate::base::{self, Contract, ValidationResult};

/// Body of `POST /expenses`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// Submit on behalf of another employee (managers only)
    pub employee_id: Option<Id>,
    pub date: Option<String>,
    pub initial_reading: Option<Decimal>,
    pub final_reading: Option<Decimal>,
    /// Falls back to the store's fuel rate when omitted
    pub rate: Option<Decimal>,
    pub miscellaneous_expense: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub employee_id: Option<Id>,
    pub date: DateTime<Utc>,
    pub initial_reading: Decimal,
    pub final_reading: Decimal,
    pub rate: Option<Decimal>,
    pub miscellaneous_expense: Decimal,
    pub description: Option<String>,
}

impl NewExpense {
    pub fn mileage_input(&self, rate: Decimal) -> MileageInput {
        MileageInput::new(self.initial_reading, self.final_reading, rate)
            .with_miscellaneous(self.miscellaneous_expense)
    }
}

/// Figures are computed from exactly what gets stored
pub(crate) fn check_columns(
    initial: Option<Decimal>,
    final_reading: Option<Decimal>,
    rate: Option<Decimal>,
    miscellaneous: Option<Decimal>,
    errors: &mut ValidationErrors,
) {
    base::fits("initialReading", initial, base::AMOUNT, errors);
    base::fits("finalReading", final_reading, base::AMOUNT, errors);
    base::fits("rate", rate, base::RATE, errors);
    base::fits("miscellaneousExpense", miscellaneous, base::AMOUNT, errors);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateExpenseContract;

impl CreateExpenseContract {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_readings(
        &self,
        initial: Option<Decimal>,
        final_reading: Option<Decimal>,
        errors: &mut ValidationErrors,
    ) {
        match initial {
            None => errors.add("initialReading", "can't be blank"),
            Some(_) => base::non_negative("initialReading", initial, errors),
        }
        match (initial, final_reading) {
            (_, None) => errors.add("finalReading", "can't be blank"),
            (Some(i), Some(f)) if f < i => {
                errors.add("finalReading", "must be greater than or equal to initialReading")
            }
            _ => {}
        }
    }
}

impl Contract<CreateExpenseRequest> for CreateExpenseContract {
    type Output = NewExpense;

    fn validate(&self, input: &CreateExpenseRequest) -> ValidationResult<NewExpense> {
        let mut errors = ValidationErrors::new();

        let date = base::required_date("date", input.date.as_deref(), &mut errors);
        self.validate_readings(input.initial_reading, input.final_reading, &mut errors);
        base::positive("rate", input.rate, &mut errors);
        base::non_negative("miscellaneousExpense", input.miscellaneous_expense, &mut errors);
        check_columns(
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

        match (date, input.initial_reading, input.final_reading) {
            (Some(date), Some(initial_reading), Some(final_reading)) if errors.is_empty() => {
                Ok(NewExpense {
                    employee_id: input.employee_id,
                    date,
                    initial_reading,
                    final_reading,
                    rate: input.rate,
                    miscellaneous_expense: input.miscellaneous_expense.unwrap_or_default(),
                    description: input
                        .description
                        .as_deref()
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> CreateExpenseRequest {
        serde_json::from_value(serde_json::json!({
            "date": "2024-03-04",
            "initialReading": 1200,
            "finalReading": 1250.5,
            "rate": 3,
            "miscellaneousExpense": 40
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_expense() {
        let expense = CreateExpenseContract::new().validate(&request()).unwrap();
        assert_eq!(expense.final_reading, dec!(1250.5));
        assert_eq!(expense.miscellaneous_expense, dec!(40));
        assert_eq!(expense.mileage_input(dec!(3)).calculate().unwrap().amount, dec!(191.5));
    }

    #[test]
    fn test_final_before_initial_rejected() {
        let mut req = request();
        req.final_reading = Some(dec!(1199));
        let errors = CreateExpenseContract::new().validate(&req).unwrap_err();
        assert_eq!(
            errors.get("finalReading").unwrap(),
            &vec!["must be greater than or equal to initialReading".to_string()]
        );
    }

    #[test]
    fn test_collects_every_field_error() {
        let req = CreateExpenseRequest {
            rate: Some(dec!(-1)),
            miscellaneous_expense: Some(dec!(-5)),
            ..Default::default()
        };
        let errors = CreateExpenseContract::new().validate(&req).unwrap_err();
        for field in ["date", "initialReading", "finalReading", "rate", "miscellaneousExpense"] {
            assert!(errors.has_error(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_rate_precision_and_reading_size_are_bounded() {
        let mut req = request();
        req.rate = Some(dec!(3.555));
        req.final_reading = Some(dec!(100000000000));
        let errors = CreateExpenseContract::new().validate(&req).unwrap_err();
        assert_eq!(
            errors.get("rate").unwrap(),
            &vec!["must have at most 2 decimal places".to_string()]
        );
        assert!(errors.has_error("finalReading"));

        let mut req = request();
        req.rate = Some(dec!(0.004));
        assert!(CreateExpenseContract::new()
            .validate(&req)
            .unwrap_err()
            .has_error("rate"));
    }

    #[test]
    fn test_huge_reading_is_a_field_error() {
        let req: CreateExpenseRequest = serde_json::from_value(serde_json::json!({
            "date": "2024-03-04",
            "initialReading": 0,
            "finalReading": "70000000000000000000000000000",
            "rate": 2
        }))
        .unwrap();
        let errors = CreateExpenseContract::new().validate(&req).unwrap_err();
        assert!(errors.has_error("finalReading"));
    }

    #[test]
    fn test_rate_is_optional_and_blank_description_dropped() {
        let mut req = request();
        req.rate = None;
        req.description = Some("   ".into());
        let expense = CreateExpenseContract::new().validate(&req).unwrap();
        assert_eq!(expense.rate, None);
        assert_eq!(expense.description, None);
    }
}
