//! # hr-payroll
//!
//! The one place payroll arithmetic lives. Every surface that shows money or
//! an attendance status (API handlers, the payslip preview, stored payslips)
//! goes through these functions; nothing here touches I/O.
//!
//! - [`expense`]: odometer readings to reimbursement
//! - [`payslip`]: basic salary plus adjustments to net pay
//! - [`attendance`]: raw punches plus calendar context to a day status

pub mod attendance;
pub mod error;
pub mod expense;
pub mod payslip;

pub use attendance::{
    classify_day, classify_range, AttendanceFlags, AttendanceSummary, CalendarContext,
    ClassifiedDay, DayRecord, DayStatus, Thresholds,
};
pub use error::CalculationError;
pub use expense::{MileageBreakdown, MileageInput};
pub use payslip::{PayrollConstants, PayslipBreakdown, PayslipInput};
