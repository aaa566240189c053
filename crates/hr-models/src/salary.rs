//! Salary (payslip) model
//!
//! Table: salaries. One row per (user, month); the breakdown is computed once
//! and read back verbatim.

use chrono::{DateTime, NaiveDate, Utc};
use hr_core::traits::{EmployeeScoped, Entity, Id, Identifiable, Timestamped};
use hr_payroll::PayslipBreakdown;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub id: Option<Id>,
    pub user_id: Id,
    /// First day of the pay month
    pub month: NaiveDate,
    #[serde(flatten)]
    pub breakdown: PayslipBreakdown,
    pub published: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Salary {
    pub fn month_label(&self) -> String {
        self.month.format("%Y-%m").to_string()
    }
}

/// What a caller gets back when asking for a payslip
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PayslipView {
    /// The owning employee asked before HR published it
    Locked,
    Available(Salary),
}

impl Identifiable for Salary {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Salary {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl EmployeeScoped for Salary {
    fn employee_id(&self) -> Id {
        self.user_id
    }
}

impl Entity for Salary {
    const TABLE_NAME: &'static str = "salaries";
    const TYPE_NAME: &'static str = "Salary";
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_payroll::PayslipInput;
    use rust_decimal_macros::dec;

    fn salary() -> Salary {
        Salary {
            id: Some(1),
            user_id: 2,
            month: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            breakdown: PayslipInput::new(dec!(22000)).calculate().unwrap(),
            published: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_locked_view_hides_figures() {
        let json = serde_json::to_value(PayslipView::Locked).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "locked" }));
    }

    #[test]
    fn test_available_view_flattens_breakdown() {
        let json = serde_json::to_value(PayslipView::Available(salary())).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["userId"], 2);
        assert!(json.get("netSalary").is_some());
        assert_eq!(salary().month_label(), "2024-04");
    }
}
