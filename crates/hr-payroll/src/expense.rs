//! Expense / mileage reimbursement

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CalculationError, Checked};

/// Odometer readings and rates for one day of travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageInput {
    pub initial_reading: Decimal,
    pub final_reading: Decimal,
    /// Reimbursement per kilometre
    pub rate: Decimal,
    #[serde(default)]
    pub miscellaneous_expense: Decimal,
}

/// Derived figures persisted alongside the readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageBreakdown {
    pub total_distance: Decimal,
    pub fuel_total: Decimal,
    pub amount: Decimal,
}

impl MileageInput {
    pub fn new(initial_reading: Decimal, final_reading: Decimal, rate: Decimal) -> Self {
        Self {
            initial_reading,
            final_reading,
            rate,
            miscellaneous_expense: Decimal::ZERO,
        }
    }

    pub fn with_miscellaneous(mut self, amount: Decimal) -> Self {
        self.miscellaneous_expense = amount;
        self
    }

    /// Reject readings that would produce a negative distance or amount
    pub fn check(&self) -> Result<(), CalculationError> {
        if self.initial_reading.is_sign_negative() {
            return Err(CalculationError::Negative {
                field: "initialReading",
            });
        }
        if self.final_reading < self.initial_reading {
            return Err(CalculationError::FinalBeforeInitial);
        }
        if self.rate <= Decimal::ZERO {
            return Err(CalculationError::NotPositive { field: "rate" });
        }
        if self.miscellaneous_expense.is_sign_negative() {
            return Err(CalculationError::Negative {
                field: "miscellaneousExpense",
            });
        }
        Ok(())
    }

    /// totalDistance = final − initial; fuelTotal = distance × rate; amount = fuelTotal + misc
    pub fn calculate(&self) -> Result<MileageBreakdown, CalculationError> {
        self.check()?;

        let total_distance = self
            .final_reading
            .sub_or(self.initial_reading, "totalDistance")?;
        let fuel_total = total_distance.mul_or(self.rate, "fuelTotal")?;
        let amount = fuel_total.add_or(self.miscellaneous_expense, "amount")?;

        Ok(MileageBreakdown {
            total_distance,
            fuel_total,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_basic_trip() {
        let result = MileageInput::new(dec!(1200), dec!(1250), dec!(3.5))
            .with_miscellaneous(dec!(40))
            .calculate()
            .unwrap();

        assert_eq!(result.total_distance, dec!(50));
        assert_eq!(result.fuel_total, dec!(175.0));
        assert_eq!(result.amount, dec!(215.0));
    }

    #[test]
    fn test_amount_matches_formula_over_a_grid() {
        let readings = [dec!(0), dec!(10.5), dec!(999.9)];
        let rates = [dec!(0.01), dec!(2.75), dec!(12)];
        let miscs = [dec!(0), dec!(0.99), dec!(150)];

        for initial in readings {
            for extra in [dec!(0), dec!(1), dec!(48.3)] {
                for rate in rates {
                    for misc in miscs {
                        let final_reading = initial + extra;
                        let result = MileageInput::new(initial, final_reading, rate)
                            .with_miscellaneous(misc)
                            .calculate()
                            .unwrap();
                        assert_eq!(result.amount, (final_reading - initial) * rate + misc);
                        assert!(!result.total_distance.is_sign_negative());
                    }
                }
            }
        }
    }

    #[test]
    fn test_monotonic_in_final_reading_and_misc() {
        let base = MileageInput::new(dec!(100), dec!(100), dec!(4));
        let mut previous = base.calculate().unwrap().amount;
        for step in 1..20 {
            let amount = MileageInput {
                final_reading: dec!(100) + Decimal::from(step),
                ..base
            }
            .calculate()
            .unwrap()
            .amount;
            assert!(amount >= previous);
            previous = amount;
        }

        let low = base.with_miscellaneous(dec!(5)).calculate().unwrap().amount;
        let high = base.with_miscellaneous(dec!(6)).calculate().unwrap().amount;
        assert!(high >= low);
    }

    #[test]
    fn test_zero_distance_is_allowed() {
        let result = MileageInput::new(dec!(500), dec!(500), dec!(3)).calculate().unwrap();
        assert_eq!(result.total_distance, Decimal::ZERO);
        assert_eq!(result.amount, Decimal::ZERO);
    }

    #[test]
    fn test_final_before_initial_is_rejected() {
        let err = MileageInput::new(dec!(500), dec!(499.9), dec!(3))
            .calculate()
            .unwrap_err();
        assert_eq!(err, CalculationError::FinalBeforeInitial);
        assert_eq!(err.field(), "finalReading");
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = MileageInput::new(dec!(0), dec!(70000000000000000000000000000), dec!(2))
            .calculate()
            .unwrap_err();
        assert_eq!(err, CalculationError::Overflow { field: "fuelTotal" });

        let err = MileageInput::new(dec!(0), Decimal::MAX, dec!(1))
            .with_miscellaneous(dec!(1))
            .calculate()
            .unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn test_rate_and_misc_are_checked() {
        assert_eq!(
            MileageInput::new(dec!(0), dec!(1), dec!(0)).calculate().unwrap_err(),
            CalculationError::NotPositive { field: "rate" }
        );
        assert_eq!(
            MileageInput::new(dec!(0), dec!(1), dec!(1))
                .with_miscellaneous(dec!(-1))
                .calculate()
                .unwrap_err()
                .field(),
            "miscellaneousExpense"
        );
        assert_eq!(
            MileageInput::new(dec!(-5), dec!(1), dec!(1)).calculate().unwrap_err().field(),
            "initialReading"
        );
    }
}
