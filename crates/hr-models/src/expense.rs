//! Expense model
//!
//! Table: expenses. One row per (user, date).

use chrono::{DateTime, Utc};
use hr_core::traits::{EmployeeScoped, Entity, Id, Identifiable, Timestamped};
use hr_payroll::{MileageBreakdown, MileageInput};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::serde_format::display_date;

/// Daily travel reimbursement claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Option<Id>,
    pub user_id: Id,
    #[serde(with = "display_date")]
    pub date: DateTime<Utc>,
    pub initial_reading: Decimal,
    pub final_reading: Decimal,
    pub total_distance: Decimal,
    pub rate: Decimal,
    pub fuel_total: Decimal,
    pub miscellaneous_expense: Decimal,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Build an unsaved expense from validated readings
    pub fn from_calculation(
        user_id: Id,
        date: DateTime<Utc>,
        input: &MileageInput,
        breakdown: &MileageBreakdown,
        description: Option<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            date,
            initial_reading: input.initial_reading,
            final_reading: input.final_reading,
            total_distance: breakdown.total_distance,
            rate: input.rate,
            fuel_total: breakdown.fuel_total,
            miscellaneous_expense: input.miscellaneous_expense,
            amount: breakdown.amount,
            description,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn mileage_input(&self) -> MileageInput {
        MileageInput::new(self.initial_reading, self.final_reading, self.rate)
            .with_miscellaneous(self.miscellaneous_expense)
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Expense {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl EmployeeScoped for Expense {
    fn employee_id(&self) -> Id {
        self.user_id
    }
}

impl Entity for Expense {
    const TABLE_NAME: &'static str = "expenses";
    const TYPE_NAME: &'static str = "Expense";
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_core::dates;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_calculation_keeps_inputs_and_outputs() {
        let input = MileageInput::new(dec!(100), dec!(140), dec!(2.5)).with_miscellaneous(dec!(20));
        let breakdown = input.calculate().unwrap();
        let date = dates::normalize_submitted("date", "2024-05-02").unwrap();

        let expense = Expense::from_calculation(7, date, &input, &breakdown, None);
        assert_eq!(expense.total_distance, dec!(40));
        assert_eq!(expense.amount, dec!(120.0));
        assert_eq!(expense.mileage_input(), input);

        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["date"], "2024-05-02");
        assert_eq!(json["userId"], 7);
    }
}
