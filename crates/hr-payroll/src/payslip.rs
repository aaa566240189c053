//! Payslip calculation
//!
//! Every line item is rounded to paise (2 dp) before it is summed, so the
//! stored figures satisfy `net == gross - total_deductions` exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{CalculationError, Checked};

const MONEY_SCALE: u32 = 2;

/// Fixed payroll assumptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollConstants {
    pub working_days_per_month: Decimal,
    pub hours_per_day: Decimal,
    pub provident_fund_rate: Decimal,
    pub esi_rate: Decimal,
    pub tax_rate: Decimal,
    pub default_overtime_rate: Decimal,
}

impl Default for PayrollConstants {
    fn default() -> Self {
        Self {
            working_days_per_month: dec!(22),
            hours_per_day: dec!(8),
            provident_fund_rate: dec!(0.12),
            esi_rate: dec!(0.0175),
            tax_rate: dec!(0.10),
            default_overtime_rate: dec!(1.5),
        }
    }
}

/// Raw payroll inputs for one employee and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipInput {
    pub basic_salary: Decimal,
    #[serde(default)]
    pub absent_days: Decimal,
    #[serde(default)]
    pub absent_hours: Decimal,
    #[serde(default)]
    pub overtime_hours: Decimal,
    /// Multiplier applied to the hourly rate; defaults to 1.5
    pub overtime_rate: Option<Decimal>,
    #[serde(default)]
    pub bonus: Decimal,
    #[serde(default)]
    pub fuel_expenses: Decimal,
}

/// The computed payslip, persisted once and read back verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipBreakdown {
    pub basic_salary: Decimal,
    pub per_day_salary: Decimal,
    pub per_hour_salary: Decimal,
    pub absent_days: Decimal,
    pub absent_hours: Decimal,
    pub absent_days_deduction: Decimal,
    pub absent_hours_deduction: Decimal,
    pub overtime_hours: Decimal,
    pub overtime_rate: Decimal,
    pub overtime_pay: Decimal,
    pub bonus: Decimal,
    pub fuel_expenses: Decimal,
    pub provident_fund: Decimal,
    pub esi: Decimal,
    pub tax: Decimal,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn non_negative(value: Decimal, field: &'static str) -> Result<(), CalculationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(CalculationError::Negative { field })
    } else {
        Ok(())
    }
}

impl PayslipInput {
    pub fn new(basic_salary: Decimal) -> Self {
        Self {
            basic_salary,
            absent_days: Decimal::ZERO,
            absent_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            overtime_rate: None,
            bonus: Decimal::ZERO,
            fuel_expenses: Decimal::ZERO,
        }
    }

    pub fn check(&self) -> Result<(), CalculationError> {
        non_negative(self.basic_salary, "basicSalary")?;
        non_negative(self.absent_days, "absentDays")?;
        if self.absent_days > dec!(31) {
            return Err(CalculationError::TooLarge {
                field: "absentDays",
                max: 31,
            });
        }
        non_negative(self.absent_hours, "absentHours")?;
        non_negative(self.overtime_hours, "overtimeHours")?;
        if let Some(rate) = self.overtime_rate {
            if rate <= Decimal::ZERO {
                return Err(CalculationError::NotPositive {
                    field: "overtimeRate",
                });
            }
        }
        non_negative(self.bonus, "bonus")?;
        non_negative(self.fuel_expenses, "fuelExpenses")?;
        Ok(())
    }

    pub fn calculate(&self) -> Result<PayslipBreakdown, CalculationError> {
        self.calculate_with(&PayrollConstants::default())
    }

    pub fn calculate_with(
        &self,
        constants: &PayrollConstants,
    ) -> Result<PayslipBreakdown, CalculationError> {
        self.check()?;

        let overtime_rate = self.overtime_rate.unwrap_or(constants.default_overtime_rate);

        // Unrounded rates feed the line items; only the items themselves are rounded
        let per_day = self
            .basic_salary
            .div_or(constants.working_days_per_month, "perDaySalary")?;
        let per_hour = per_day.div_or(constants.hours_per_day, "perHourSalary")?;

        let absent_days_deduction =
            money(self.absent_days.mul_or(per_day, "absentDaysDeduction")?);
        let absent_hours_deduction =
            money(self.absent_hours.mul_or(per_hour, "absentHoursDeduction")?);
        let overtime_pay = money(
            self.overtime_hours
                .mul_or(per_hour, "overtimePay")?
                .mul_or(overtime_rate, "overtimePay")?,
        );

        let provident_fund = money(
            self.basic_salary
                .mul_or(constants.provident_fund_rate, "providentFund")?,
        );
        let esi = money(self.basic_salary.mul_or(constants.esi_rate, "esi")?);
        let tax = money(self.basic_salary.mul_or(constants.tax_rate, "tax")?);

        let basic_salary = money(self.basic_salary);
        let bonus = money(self.bonus);
        let fuel_expenses = money(self.fuel_expenses);

        let gross_salary = basic_salary
            .add_or(overtime_pay, "grossSalary")?
            .add_or(bonus, "grossSalary")?
            .add_or(fuel_expenses, "grossSalary")?;
        let total_deductions = absent_days_deduction
            .add_or(absent_hours_deduction, "totalDeductions")?
            .add_or(provident_fund, "totalDeductions")?
            .add_or(esi, "totalDeductions")?
            .add_or(tax, "totalDeductions")?;
        let net_salary = gross_salary.sub_or(total_deductions, "netSalary")?;

        Ok(PayslipBreakdown {
            basic_salary,
            per_day_salary: money(per_day),
            per_hour_salary: money(per_hour),
            absent_days: self.absent_days,
            absent_hours: self.absent_hours,
            absent_days_deduction,
            absent_hours_deduction,
            overtime_hours: self.overtime_hours,
            overtime_rate,
            overtime_pay,
            bonus,
            fuel_expenses,
            provident_fund,
            esi,
            tax,
            gross_salary,
            total_deductions,
            net_salary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PayslipInput {
        PayslipInput {
            basic_salary: dec!(22000),
            absent_days: dec!(2),
            absent_hours: dec!(0),
            overtime_hours: dec!(4),
            overtime_rate: Some(dec!(1.5)),
            bonus: dec!(500),
            fuel_expenses: dec!(300),
        }
    }

    #[test]
    fn test_sample_payslip() {
        let p = sample().calculate().unwrap();

        assert_eq!(p.per_day_salary, dec!(1000));
        assert_eq!(p.per_hour_salary, dec!(125));
        assert_eq!(p.overtime_pay, dec!(750));
        assert_eq!(p.provident_fund, dec!(2640));
        assert_eq!(p.esi, dec!(385));
        assert_eq!(p.tax, dec!(2200));
        assert_eq!(p.absent_days_deduction, dec!(2000));
        assert_eq!(p.gross_salary, dec!(22000) + dec!(750) + dec!(500) + dec!(300));
        assert_eq!(
            p.total_deductions,
            dec!(2000) + dec!(0) + dec!(2640) + dec!(385) + dec!(2200)
        );
        assert_eq!(p.net_salary, p.gross_salary - p.total_deductions);
        assert_eq!(p.net_salary, dec!(16325));
    }

    #[test]
    fn test_net_is_gross_minus_deductions_for_awkward_salaries() {
        for basic in [dec!(13333.33), dec!(25001), dec!(99999.99), dec!(1)] {
            let input = PayslipInput {
                basic_salary: basic,
                absent_days: dec!(1.5),
                absent_hours: dec!(3),
                overtime_hours: dec!(7.25),
                overtime_rate: None,
                bonus: dec!(123.45),
                fuel_expenses: dec!(67.891),
            };
            let p = input.calculate().unwrap();
            assert_eq!(p.net_salary, p.gross_salary - p.total_deductions);
            assert_eq!(
                p.total_deductions,
                p.absent_days_deduction + p.absent_hours_deduction + p.provident_fund + p.esi + p.tax
            );
            assert!(p.gross_salary.scale() <= 2);
        }
    }

    #[test]
    fn test_default_overtime_rate() {
        let mut input = sample();
        input.overtime_rate = None;
        let p = input.calculate().unwrap();
        assert_eq!(p.overtime_rate, dec!(1.5));
        assert_eq!(p.overtime_pay, dec!(750));
    }

    #[test]
    fn test_absent_hours_use_hourly_rate() {
        let mut input = PayslipInput::new(dec!(22000));
        input.absent_hours = dec!(3);
        let p = input.calculate().unwrap();
        assert_eq!(p.absent_hours_deduction, dec!(375));
    }

    #[test]
    fn test_recalculation_is_stable() {
        let first = sample().calculate().unwrap();
        let json = serde_json::to_string(&first).unwrap();
        let stored: PayslipBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(stored, sample().calculate().unwrap());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let mut input = PayslipInput::new(dec!(70000000000000000000000000000));
        input.bonus = dec!(70000000000000000000000000000);
        assert!(matches!(
            input.calculate().unwrap_err(),
            CalculationError::Overflow { .. }
        ));

        let mut input = sample();
        input.overtime_hours = Decimal::MAX;
        assert_eq!(input.calculate().unwrap_err().field(), "overtimePay");
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = sample();
        input.absent_days = dec!(32);
        assert_eq!(input.calculate().unwrap_err().field(), "absentDays");

        let mut input = sample();
        input.overtime_rate = Some(dec!(0));
        assert_eq!(input.calculate().unwrap_err().field(), "overtimeRate");

        let mut input = sample();
        input.bonus = dec!(-10);
        assert_eq!(input.calculate().unwrap_err().field(), "bonus");
    }
}
