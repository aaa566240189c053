//! # hr-db
//!
//! Database layer for the HR service.
//!
//! Every repository is a trait (mockable with the `mock` feature) plus a
//! PostgreSQL implementation built on sqlx. Natural-key uniqueness (one
//! expense, attendance row or payslip per employee and day/month) is enforced
//! by constraints and written with single `INSERT … ON CONFLICT` statements.

pub mod attendance;
pub mod calendars;
pub mod expenses;
pub mod holidays;
pub mod leaves;
pub mod notifications;
pub mod overtime;
pub mod pool;
pub mod repository;
pub mod salaries;
pub mod stores;
pub mod users;

pub use attendance::{AttendanceRepository, PgAttendanceRepository};
pub use calendars::{CalendarRepository, PgCalendarRepository};
pub use expenses::{ExpenseRepository, PgExpenseRepository};
pub use holidays::{HolidayRepository, PgHolidayRepository};
pub use leaves::{LeaveRepository, PgLeaveRepository};
pub use notifications::{NotificationRepository, PgNotificationRepository};
pub use overtime::{OvertimeRepository, PgOvertimeRepository};
pub use pool::{Database, PoolStats};
pub use repository::{RecordFilter, RepositoryError, RepositoryResult, Upserted};
pub use salaries::{PgSalaryRepository, SalaryRepository};
pub use stores::{PgStoreRepository, StoreRepository};
pub use users::{PgUserRepository, UserRepository};

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    pub use crate::attendance::MockAttendanceRepository;
    pub use crate::calendars::MockCalendarRepository;
    pub use crate::expenses::MockExpenseRepository;
    pub use crate::holidays::MockHolidayRepository;
    pub use crate::leaves::MockLeaveRepository;
    pub use crate::notifications::MockNotificationRepository;
    pub use crate::overtime::MockOvertimeRepository;
    pub use crate::salaries::MockSalaryRepository;
    pub use crate::stores::MockStoreRepository;
    pub use crate::users::MockUserRepository;
}
