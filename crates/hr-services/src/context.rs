//! Repository bundle and the scope lookups every service shares

use std::sync::Arc;

use chrono::NaiveDate;
use hr_auth::{authorize, Action, CurrentUser, Scope};
use hr_contracts::query::ListQuery;
use hr_core::traits::Id;
use hr_core::{dates, HrError, HrResult};
use hr_db::{
    AttendanceRepository, CalendarRepository, Database, ExpenseRepository, HolidayRepository,
    LeaveRepository, NotificationRepository, OvertimeRepository, PgAttendanceRepository,
    PgCalendarRepository, PgExpenseRepository, PgHolidayRepository, PgLeaveRepository,
    PgNotificationRepository, PgOvertimeRepository, PgSalaryRepository, PgStoreRepository,
    PgUserRepository, RecordFilter, SalaryRepository, StoreRepository, UserRepository,
};
use hr_models::{Calendar, Notification, Store, User};
use hr_payroll::{CalendarContext, Thresholds};

/// Every repository a service may touch
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub stores: Arc<dyn StoreRepository>,
    pub calendars: Arc<dyn CalendarRepository>,
    pub holidays: Arc<dyn HolidayRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub salaries: Arc<dyn SalaryRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub leaves: Arc<dyn LeaveRepository>,
    pub overtime: Arc<dyn OvertimeRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

/// Rows a list request may see, and the scope it was authorized against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListScope {
    pub filter: RecordFilter,
    pub scope: Scope,
}

impl Repositories {
    pub fn postgres(db: &Database) -> Self {
        let pool = db.pool().clone();
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            stores: Arc::new(PgStoreRepository::new(pool.clone())),
            calendars: Arc::new(PgCalendarRepository::new(pool.clone())),
            holidays: Arc::new(PgHolidayRepository::new(pool.clone())),
            expenses: Arc::new(PgExpenseRepository::new(pool.clone())),
            salaries: Arc::new(PgSalaryRepository::new(pool.clone())),
            attendance: Arc::new(PgAttendanceRepository::new(pool.clone())),
            leaves: Arc::new(PgLeaveRepository::new(pool.clone())),
            overtime: Arc::new(PgOvertimeRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    pub async fn user(&self, id: Id) -> HrResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| HrError::not_found("User", "id", id))
    }

    pub async fn store_named(&self, name: &str) -> HrResult<Store> {
        self.stores
            .find_by_name(name)
            .await?
            .ok_or_else(|| HrError::not_found("Store", "name", name))
    }

    /// Scope of one employee's records
    pub async fn employee_scope(&self, current: &CurrentUser, user_id: Id) -> HrResult<Scope> {
        if user_id == current.id {
            return Ok(current.own_scope());
        }
        let user = self.user(user_id).await?;
        Ok(Scope::Employee {
            user_id,
            store_id: user.store_id,
        })
    }

    /// The employee a request is about (the caller when none is named), once
    /// the caller is allowed to `action` them
    pub async fn authorize_employee(
        &self,
        current: &CurrentUser,
        employee_id: Option<Id>,
        action: Action,
    ) -> HrResult<Id> {
        let user_id = employee_id.unwrap_or(current.id);
        let scope = self.employee_scope(current, user_id).await?;
        authorize(current, action, scope)?;
        Ok(user_id)
    }

    /// Resolve the row filter of a list request and authorize it.
    ///
    /// `employeeId` narrows to one employee, `storeName` to one store and
    /// `allEmployees` to the caller's store (every store for HR/MD). With none
    /// of them the caller sees their own rows.
    pub async fn list_scope(
        &self,
        current: &CurrentUser,
        query: &ListQuery,
        action: Action,
    ) -> HrResult<ListScope> {
        let (filter, scope) = if let Some(employee_id) = query.employee_id {
            let scope = self.employee_scope(current, employee_id).await?;
            (RecordFilter::for_user(employee_id), scope)
        } else if let Some(name) = &query.store_name {
            let store_id = store_id(&self.store_named(name).await?)?;
            (RecordFilter::for_store(store_id), Scope::Store(store_id))
        } else if query.all_employees {
            match current.store_id {
                Some(store_id) if !current.is_admin() => {
                    (RecordFilter::for_store(store_id), Scope::Store(store_id))
                }
                _ => (RecordFilter::default(), Scope::Global),
            }
        } else {
            (RecordFilter::for_user(current.id), current.own_scope())
        };

        authorize(current, action, scope)?;

        let filter = match query.date_range() {
            Some((start, end)) => {
                filter.between(dates::to_utc_midnight(start), dates::to_utc_midnight(end))
            }
            None => filter,
        };
        Ok(ListScope { filter, scope })
    }

    /// Thresholds and calendar facts for one employee over `[from, to]`
    pub async fn working_calendar(
        &self,
        user: &User,
        from: NaiveDate,
        to: NaiveDate,
    ) -> HrResult<(Thresholds, CalendarContext)> {
        let Some(store_id) = user.store_id else {
            let context = CalendarContext {
                weekly_off: user.weekly_off,
                ..CalendarContext::default()
            };
            return Ok((Thresholds::default(), context));
        };

        let calendar = self
            .calendars
            .find_by_store(store_id)
            .await?
            .unwrap_or_else(|| Calendar::default_for(store_id));
        let holidays = self
            .holidays
            .list_for_store(
                store_id,
                Some(dates::to_utc_midnight(from)),
                Some(dates::to_utc_midnight(to)),
            )
            .await?;

        let context = CalendarContext {
            holidays: holidays.iter().map(|h| dates::display_date(h.date)).collect(),
            weekend_days: calendar.weekend_days.clone(),
            weekly_off: user.weekly_off,
        };
        Ok((calendar.thresholds(), context))
    }

    /// Write a notification row. A failure here never fails the caller's request.
    pub async fn notify(&self, user_id: Id, message: String) {
        if let Err(err) = self
            .notifications
            .create(&Notification::new(user_id, message))
            .await
        {
            tracing::warn!(user_id, error = %err, "failed to store notification");
        }
    }
}

pub(crate) fn store_id(store: &Store) -> HrResult<Id> {
    store
        .id
        .ok_or_else(|| HrError::Internal(format!("store {} has no id", store.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{caller, employee, MockRepos};
    use hr_models::Role;

    #[tokio::test]
    async fn test_list_scope_defaults_to_own_rows() {
        let repos = MockRepos::default().build();
        let me = caller(1, Role::Employee, Some(10));
        let scope = repos
            .list_scope(&me, &ListQuery::default(), Action::ViewExpenses)
            .await
            .unwrap();
        assert_eq!(scope.filter, RecordFilter::for_user(1));
    }

    #[tokio::test]
    async fn test_all_employees_is_store_wide_for_directors() {
        let repos = MockRepos::default().build();
        let director = caller(1, Role::StoreDirector, Some(10));
        let query = ListQuery {
            all_employees: true,
            ..Default::default()
        };
        let scope = repos
            .list_scope(&director, &query, Action::ViewExpenses)
            .await
            .unwrap();
        assert_eq!(scope.filter, RecordFilter::for_store(10));
        assert_eq!(scope.scope, Scope::Store(10));
    }

    #[tokio::test]
    async fn test_employee_cannot_list_a_colleague() {
        let mut mocks = MockRepos::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Role::Employee, Some(10)))));
        let repos = mocks.build();

        let me = caller(1, Role::Employee, Some(10));
        let query = ListQuery {
            employee_id: Some(2),
            ..Default::default()
        };
        let err = repos
            .list_scope(&me, &query, Action::ViewExpenses)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_unknown_employee_is_not_found() {
        let mut mocks = MockRepos::default();
        mocks.users.expect_find_by_id().returning(|_| Ok(None));
        let repos = mocks.build();

        let hr = caller(1, Role::Hr, None);
        let err = repos
            .authorize_employee(&hr, Some(99), Action::ViewExpenses)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_working_calendar_without_store_uses_defaults() {
        let repos = MockRepos::default().build();
        let mut user = employee(1, Role::Employee, None);
        user.weekly_off = Some(chrono::Weekday::Wed);
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let (thresholds, context) = repos.working_calendar(&user, day, day).await.unwrap();
        assert_eq!(thresholds, Thresholds::default());
        assert_eq!(context.weekend_days, vec![chrono::Weekday::Sun]);
        assert_eq!(context.weekly_off, Some(chrono::Weekday::Wed));
    }
}
