//! Test doubles shared by the service tests

use std::sync::Arc;

use hr_auth::CurrentUser;
use hr_core::traits::Id;
use hr_db::mock::{
    MockAttendanceRepository, MockCalendarRepository, MockExpenseRepository,
    MockHolidayRepository, MockLeaveRepository, MockNotificationRepository,
    MockOvertimeRepository, MockSalaryRepository, MockStoreRepository, MockUserRepository,
};
use hr_models::{Role, Store, User};
use rust_decimal_macros::dec;

use crate::context::Repositories;

/// One mock per repository; unused ones panic if called
#[derive(Default)]
pub struct MockRepos {
    pub users: MockUserRepository,
    pub stores: MockStoreRepository,
    pub calendars: MockCalendarRepository,
    pub holidays: MockHolidayRepository,
    pub expenses: MockExpenseRepository,
    pub salaries: MockSalaryRepository,
    pub attendance: MockAttendanceRepository,
    pub leaves: MockLeaveRepository,
    pub overtime: MockOvertimeRepository,
    pub notifications: MockNotificationRepository,
}

impl MockRepos {
    pub fn build(self) -> Repositories {
        Repositories {
            users: Arc::new(self.users),
            stores: Arc::new(self.stores),
            calendars: Arc::new(self.calendars),
            holidays: Arc::new(self.holidays),
            expenses: Arc::new(self.expenses),
            salaries: Arc::new(self.salaries),
            attendance: Arc::new(self.attendance),
            leaves: Arc::new(self.leaves),
            overtime: Arc::new(self.overtime),
            notifications: Arc::new(self.notifications),
        }
    }
}

pub fn caller(id: Id, role: Role, store_id: Option<Id>) -> CurrentUser {
    CurrentUser::new(id, role, store_id)
}

pub fn employee(id: Id, role: Role, store_id: Option<Id>) -> User {
    User {
        id: Some(id),
        store_id,
        basic_salary: dec!(22000),
        ..User::new(format!("user{}", id), format!("user{}@example.com", id), role)
    }
}

pub fn store(id: Id, name: &str) -> Store {
    Store {
        id: Some(id),
        name: name.to_string(),
        fuel_rate_per_km: dec!(3.5),
        created_at: None,
        updated_at: None,
    }
}
