//! # hr-services
//!
//! Business operations for the HR service.
//!
//! Every operation runs the same pipeline: authorize the caller against the
//! target scope, validate the request through its contract, compute with
//! `hr-payroll`, then persist through the repository traits of `hr-db`.
//! Services hold no state beyond the repositories they were built with.

pub mod attendance;
pub mod context;
pub mod expenses;
pub mod leaves;
pub mod overtime;
pub mod payslips;
pub mod profile;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use attendance::{AttendanceDay, AttendanceReport, AttendanceService};
pub use context::Repositories;
pub use expenses::ExpenseService;
pub use leaves::LeaveService;
pub use overtime::OvertimeService;
pub use payslips::PayslipService;
pub use profile::ProfileService;
pub use settings::{CalendarView, SettingsService};
