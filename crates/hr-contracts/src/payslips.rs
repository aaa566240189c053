//! Payslip generation / preview contract

use chrono::NaiveDate;
use hr_core::dates;
use hr_core::error::ValidationErrors;
use hr_core::traits::Id;
use hr_payroll::PayslipInput;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::base::{self, absorb, Contract, ValidationResult};

/// Body of `POST /payslips` and `POST /payslips/preview`.
///
/// Omitted figures are filled from stored data by the service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipRequest {
    pub employee_id: Option<Id>,
    pub month: Option<String>,
    pub basic_salary: Option<Decimal>,
    pub absent_days: Option<Decimal>,
    pub absent_hours: Option<Decimal>,
    pub overtime_hours: Option<Decimal>,
    pub overtime_rate: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub fuel_expenses: Option<Decimal>,
}

/// Caller-supplied figures; `None` means "derive it"
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PayslipOverrides {
    pub basic_salary: Option<Decimal>,
    pub absent_days: Option<Decimal>,
    pub absent_hours: Option<Decimal>,
    pub overtime_hours: Option<Decimal>,
    pub overtime_rate: Option<Decimal>,
    pub bonus: Option<Decimal>,
    pub fuel_expenses: Option<Decimal>,
}

impl PayslipOverrides {
    /// Overrides win over the derived defaults
    pub fn resolve(&self, derived: &PayslipInput) -> PayslipInput {
        PayslipInput {
            basic_salary: self.basic_salary.unwrap_or(derived.basic_salary),
            absent_days: self.absent_days.unwrap_or(derived.absent_days),
            absent_hours: self.absent_hours.unwrap_or(derived.absent_hours),
            overtime_hours: self.overtime_hours.unwrap_or(derived.overtime_hours),
            overtime_rate: self.overtime_rate.or(derived.overtime_rate),
            bonus: self.bonus.unwrap_or(derived.bonus),
            fuel_expenses: self.fuel_expenses.unwrap_or(derived.fuel_expenses),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayslipParams {
    pub employee_id: Id,
    /// First day of the pay month
    pub month: NaiveDate,
    pub overrides: PayslipOverrides,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PayslipContract;

impl Contract<PayslipRequest> for PayslipContract {
    type Output = PayslipParams;

    fn validate(&self, input: &PayslipRequest) -> ValidationResult<PayslipParams> {
        let mut errors = ValidationErrors::new();

        let employee_id = match input.employee_id {
            Some(id) if id > 0 => Some(id),
            Some(_) => {
                errors.add("employeeId", "must be a positive integer");
                None
            }
            None => {
                errors.add("employeeId", "can't be blank");
                None
            }
        };
        let month = base::required("month", input.month.as_deref(), &mut errors)
            .and_then(|raw| absorb(dates::parse_month("month", raw), &mut errors));

        for (field, value, column) in [
            ("basicSalary", input.basic_salary, base::AMOUNT),
            ("absentDays", input.absent_days, base::QUANTITY),
            ("absentHours", input.absent_hours, base::QUANTITY),
            ("overtimeHours", input.overtime_hours, base::QUANTITY),
            ("bonus", input.bonus, base::AMOUNT),
            ("fuelExpenses", input.fuel_expenses, base::AMOUNT),
        ] {
            base::non_negative(field, value, &mut errors);
            base::fits(field, value, column, &mut errors);
        }
        base::positive("overtimeRate", input.overtime_rate, &mut errors);
        base::fits("overtimeRate", input.overtime_rate, base::MULTIPLIER, &mut errors);

        match (employee_id, month) {
            (Some(employee_id), Some(month)) if errors.is_empty() => Ok(PayslipParams {
                employee_id,
                month,
                overrides: PayslipOverrides {
                    basic_salary: input.basic_salary,
                    absent_days: input.absent_days,
                    absent_hours: input.absent_hours,
                    overtime_hours: input.overtime_hours,
                    overtime_rate: input.overtime_rate,
                    bonus: input.bonus,
                    fuel_expenses: input.fuel_expenses,
                },
            }),
            _ => Err(errors),
        }
    }
}
