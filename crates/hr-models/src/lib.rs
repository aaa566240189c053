//! # hr-models
//!
//! Domain models for the HR service.
//!
//! Each entity maps to one table and implements the core traits from
//! `hr-core` (Entity, Identifiable, Timestamped, EmployeeScoped).

pub use hr_core::traits::{EmployeeScoped, Entity, Id, Identifiable, Timestamped};

#[macro_use]
mod macros;

pub mod attendance;
pub mod calendar;
pub mod expense;
pub mod holiday;
pub mod leave;
pub mod notification;
pub mod overtime;
pub mod role;
pub mod salary;
pub mod serde_format;
pub mod store;
pub mod user;

pub use attendance::AttendanceRecord;
pub use calendar::Calendar;
pub use expense::Expense;
pub use holiday::Holiday;
pub use leave::{Leave, LeaveType, ReviewStatus};
pub use notification::Notification;
pub use overtime::{Compensation, OvertimeRequest};
pub use role::Role;
pub use salary::{PayslipView, Salary};
pub use store::Store;
pub use user::User;

/// A stored or submitted string that names no known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
