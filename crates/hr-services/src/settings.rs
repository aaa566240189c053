//! Per-store settings: holidays, the working calendar and the fuel rate

use hr_auth::{authorize, Action, CurrentUser, Scope};
use hr_contracts::calendar::{CalendarContract, CalendarRequest};
use hr_contracts::holidays::{
    HolidayDeleteContract, HolidayDeleteParams, HolidaySettingsContract, HolidaySettingsRequest,
};
use hr_contracts::query::{ListParams, ListQuery, ListQueryContract};
use hr_contracts::Contract;
use hr_core::traits::Id;
use hr_core::{dates, HrError, HrResult};
use hr_models::{Calendar, Holiday, Store};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use crate::context::{store_id, Repositories};

/// A store's calendar as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub store_name: String,
    #[serde(flatten)]
    pub calendar: Calendar,
    pub fuel_rate_per_km: Decimal,
}

impl CalendarView {
    fn new(store: &Store, calendar: Calendar) -> Self {
        Self {
            store_name: store.name.clone(),
            calendar,
            fuel_rate_per_km: store.fuel_rate_per_km,
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    repos: Repositories,
}

impl SettingsService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Look up the named store and check the caller may `action` it
    async fn authorized_store(
        &self,
        current: &CurrentUser,
        name: &str,
        action: Action,
    ) -> HrResult<(Store, Id)> {
        let store = self.repos.store_named(name).await?;
        let id = store_id(&store)?;
        authorize(current, action, Scope::Store(id))?;
        Ok((store, id))
    }

    fn required_store(query: &ListQuery) -> HrResult<&str> {
        query
            .store_name
            .as_deref()
            .ok_or_else(|| HrError::invalid("storeName", "can't be blank"))
    }

    /// Holidays of a store, optionally within `startDate..=endDate`
    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn holidays(&self, current: &CurrentUser, params: ListParams) -> HrResult<Vec<Holiday>> {
        let query = ListQueryContract::new().validate(&params)?;
        let name = Self::required_store(&query)?;
        let (_, store_id) = self
            .authorized_store(current, name, Action::ViewStoreSettings)
            .await?;

        let (from, to) = match query.date_range() {
            Some((start, end)) => (
                Some(dates::to_utc_midnight(start)),
                Some(dates::to_utc_midnight(end)),
            ),
            None => (None, None),
        };
        Ok(self.repos.holidays.list_for_store(store_id, from, to).await?)
    }

    /// Insert or rename every submitted holiday. Dates not mentioned are left alone.
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn save_holidays(
        &self,
        current: &CurrentUser,
        request: HolidaySettingsRequest,
    ) -> HrResult<Vec<Holiday>> {
        let settings = HolidaySettingsContract::new().validate(&request)?;
        let (_, store_id) = self
            .authorized_store(current, &settings.store_name, Action::ManageHolidays)
            .await?;

        let entries = settings
            .holidays
            .into_iter()
            .map(|entry| (entry.date, entry.name))
            .collect::<Vec<_>>();
        let count = entries.len();
        let saved = self.repos.holidays.upsert_many(store_id, entries).await?;
        tracing::info!(store_id, count, "holidays saved");
        Ok(saved)
    }

    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn delete_holiday(&self, current: &CurrentUser, params: HolidayDeleteParams) -> HrResult<()> {
        let removal = HolidayDeleteContract.validate(&params)?;
        let (_, store_id) = self
            .authorized_store(current, &removal.store_name, Action::ManageHolidays)
            .await?;

        if !self.repos.holidays.delete(store_id, removal.date).await? {
            return Err(HrError::not_found(
                "Holiday",
                "date",
                dates::format_display_date(removal.date),
            ));
        }
        tracing::info!(store_id, date = %dates::format_display_date(removal.date), "holiday deleted");
        Ok(())
    }

    /// The store's calendar, or the default one when none is configured yet
    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn calendar(&self, current: &CurrentUser, params: ListParams) -> HrResult<CalendarView> {
        let query = ListQueryContract::new().validate(&params)?;
        let name = Self::required_store(&query)?;
        let (store, store_id) = self
            .authorized_store(current, name, Action::ViewStoreSettings)
            .await?;

        let calendar = self
            .repos
            .calendars
            .find_by_store(store_id)
            .await?
            .unwrap_or_else(|| Calendar::default_for(store_id));
        Ok(CalendarView::new(&store, calendar))
    }

    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn create_calendar(
        &self,
        current: &CurrentUser,
        request: CalendarRequest,
    ) -> HrResult<CalendarView> {
        let changes = CalendarContract::new().validate(&request)?;
        let (store, store_id) = self
            .authorized_store(current, &changes.store_name, Action::ManageCalendar)
            .await?;

        let mut calendar = Calendar::default_for(store_id);
        changes.apply(&mut calendar);
        CalendarContract::new().validate_shift_order(&calendar)?;

        let calendar = self.repos.calendars.create(&calendar).await?;
        let store = self.apply_fuel_rate(store, changes.fuel_rate_per_km).await?;
        tracing::info!(store_id, "calendar created");
        Ok(CalendarView::new(&store, calendar))
    }

    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn update_calendar(
        &self,
        current: &CurrentUser,
        request: CalendarRequest,
    ) -> HrResult<CalendarView> {
        let changes = CalendarContract::new().validate(&request)?;
        let (store, store_id) = self
            .authorized_store(current, &changes.store_name, Action::ManageCalendar)
            .await?;

        let mut calendar = self
            .repos
            .calendars
            .find_by_store(store_id)
            .await?
            .ok_or_else(|| HrError::not_found("Calendar", "storeName", &store.name))?;
        changes.apply(&mut calendar);
        CalendarContract::new().validate_shift_order(&calendar)?;

        let calendar = self.repos.calendars.update(&calendar).await?;
        let store = self.apply_fuel_rate(store, changes.fuel_rate_per_km).await?;
        tracing::info!(store_id, "calendar updated");
        Ok(CalendarView::new(&store, calendar))
    }

    async fn apply_fuel_rate(&self, store: Store, rate: Option<Decimal>) -> HrResult<Store> {
        let Some(rate) = rate else {
            return Ok(store);
        };
        let id = store_id(&store)?;
        self.repos
            .stores
            .update_fuel_rate(id, rate)
            .await?
            .ok_or_else(|| HrError::not_found("Store", "id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{caller, store, MockRepos};
    use chrono::{NaiveTime, Weekday};
    use hr_models::Role;
    use rust_decimal_macros::dec;

    fn bandra(mocks: &mut MockRepos) {
        mocks
            .stores
            .expect_find_by_name()
            .returning(|name| Ok(Some(store(10, name))));
    }

    fn by_store(name: &str) -> ListParams {
        ListParams {
            store_name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_store_name_is_required() {
        let service = SettingsService::new(MockRepos::default().build());
        let err = service
            .holidays(&caller(1, Role::Employee, Some(10)), ListParams::default())
            .await
            .unwrap_err();
        match err {
            HrError::Validation(errors) => assert!(errors.has_error("storeName")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_employee_sees_own_store_holidays_only() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks
            .holidays
            .expect_list_for_store()
            .times(1)
            .returning(|_, _, _| Ok(Vec::new()));
        let service = SettingsService::new(mocks.build());

        service
            .holidays(&caller(1, Role::Employee, Some(10)), by_store("Bandra"))
            .await
            .unwrap();
        let err = service
            .holidays(&caller(2, Role::Employee, Some(11)), by_store("Bandra"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_coordinator_cannot_edit_holidays() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks.holidays.expect_upsert_many().never();
        let service = SettingsService::new(mocks.build());

        let request = serde_json::from_value(serde_json::json!({
            "storeName": "Bandra",
            "holidays": [{ "date": "2024-08-15", "name": "Independence Day" }]
        }))
        .unwrap();
        let err = service
            .save_holidays(&caller(1, Role::HrCoordinator, Some(10)), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_deleting_a_missing_holiday_is_not_found() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks.holidays.expect_delete().returning(|_, _| Ok(false));
        let service = SettingsService::new(mocks.build());

        let err = service
            .delete_holiday(
                &caller(1, Role::StoreDirector, Some(10)),
                HolidayDeleteParams {
                    store_name: Some("Bandra".into()),
                    date: Some("2024-08-15".into()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_unconfigured_store_gets_default_calendar() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks.calendars.expect_find_by_store().returning(|_| Ok(None));
        let service = SettingsService::new(mocks.build());

        let view = service
            .calendar(&caller(1, Role::Employee, Some(10)), by_store("Bandra"))
            .await
            .unwrap();
        assert_eq!(view.calendar, Calendar::default_for(10));
        assert_eq!(view.fuel_rate_per_km, dec!(3.5));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["storeName"], "Bandra");
        assert_eq!(json["shiftStart"], "09:00");
    }

    #[tokio::test]
    async fn test_create_calendar_applies_changes_and_fuel_rate() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks
            .calendars
            .expect_create()
            .withf(|c| {
                c.shift_start == NaiveTime::from_hms_opt(10, 0, 0).unwrap()
                    && c.weekend_days == vec![Weekday::Sat, Weekday::Sun]
            })
            .returning(|c| Ok(Calendar { id: Some(1), ..c.clone() }));
        mocks
            .stores
            .expect_update_fuel_rate()
            .withf(|id, rate| *id == 10 && *rate == dec!(4.25))
            .returning(|_, rate| {
                Ok(Some(Store {
                    fuel_rate_per_km: rate,
                    ..store(10, "Bandra")
                }))
            });
        let service = SettingsService::new(mocks.build());

        let request = serde_json::from_value(serde_json::json!({
            "storeName": "Bandra",
            "shiftStart": "10:00",
            "weekendDays": ["Sat", "Sun"],
            "fuelRatePerKm": 4.25
        }))
        .unwrap();
        let view = service
            .create_calendar(&caller(1, Role::HrCoordinator, Some(10)), request)
            .await
            .unwrap();
        assert_eq!(view.calendar.id, Some(1));
        assert_eq!(view.fuel_rate_per_km, dec!(4.25));
    }

    #[tokio::test]
    async fn test_merged_shift_order_is_checked() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks
            .calendars
            .expect_find_by_store()
            .returning(|store_id| Ok(Some(Calendar::default_for(store_id))));
        mocks.calendars.expect_update().never();
        let service = SettingsService::new(mocks.build());

        // default shift ends at 18:00
        let request = serde_json::from_value(serde_json::json!({
            "storeName": "Bandra",
            "shiftStart": "19:00"
        }))
        .unwrap();
        let err = service
            .update_calendar(&caller(1, Role::StoreDirector, Some(10)), request)
            .await
            .unwrap_err();
        match err {
            HrError::Validation(errors) => assert!(errors.has_error("shiftEnd")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_without_calendar_is_not_found() {
        let mut mocks = MockRepos::default();
        bandra(&mut mocks);
        mocks.calendars.expect_find_by_store().returning(|_| Ok(None));
        let service = SettingsService::new(mocks.build());

        let request = serde_json::from_value(serde_json::json!({
            "storeName": "Bandra",
            "lateThresholdMinutes": 10
        }))
        .unwrap();
        let err = service
            .update_calendar(&caller(1, Role::Hr, None), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
