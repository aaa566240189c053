//! Expense submission, correction and listing

use hr_auth::{Action, CurrentUser};
use hr_contracts::expenses::{
    CreateExpenseContract, CreateExpenseRequest, UpdateExpenseContract, UpdateExpenseRequest,
};
use hr_contracts::query::{ListParams, ListQueryContract};
use hr_contracts::Contract;
use hr_core::pagination::Paginated;
use hr_core::traits::Id;
use hr_core::{HrError, HrResult};
use hr_db::Upserted;
use hr_models::Expense;
use rust_decimal::Decimal;
use tracing::instrument;

use crate::context::Repositories;

#[derive(Clone)]
pub struct ExpenseService {
    repos: Repositories,
}

impl ExpenseService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Record the day's mileage for an employee. A second submission for the
    /// same day replaces the first; `inserted` tells the two apart.
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn submit(
        &self,
        current: &CurrentUser,
        request: CreateExpenseRequest,
    ) -> HrResult<Upserted<Expense>> {
        let employee_id = self
            .repos
            .authorize_employee(current, request.employee_id, Action::SubmitExpense)
            .await?;
        let new = CreateExpenseContract::new().validate(&request)?;

        let rate = match new.rate {
            Some(rate) => rate,
            None => self.store_rate(employee_id).await?,
        };
        let input = new.mileage_input(rate);
        let breakdown = input.calculate()?;

        let expense =
            Expense::from_calculation(employee_id, new.date, &input, &breakdown, new.description);
        let saved = self.repos.expenses.upsert(&expense).await?;

        tracing::info!(
            employee_id,
            expense_id = ?saved.record.id,
            amount = %saved.record.amount,
            inserted = saved.inserted,
            "expense recorded"
        );
        Ok(saved)
    }

    /// Expenses the caller may not touch are reported as missing
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn update(
        &self,
        current: &CurrentUser,
        id: Id,
        request: UpdateExpenseRequest,
    ) -> HrResult<Expense> {
        let not_found = || HrError::not_found("Expense", "id", id);
        let mut expense = self
            .repos
            .expenses
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;
        self.repos
            .authorize_employee(current, Some(expense.user_id), Action::SubmitExpense)
            .await
            .map_err(|err| match err {
                HrError::Forbidden { .. } => not_found(),
                other => other,
            })?;

        let changes = UpdateExpenseContract::new().validate(&request)?;
        let input = changes.merged_input(&expense);
        let breakdown = input.calculate()?;

        if let Some(date) = changes.date {
            expense.date = date;
        }
        if let Some(description) = changes.description {
            expense.description = Some(description).filter(|d| !d.is_empty());
        }
        expense.initial_reading = input.initial_reading;
        expense.final_reading = input.final_reading;
        expense.rate = input.rate;
        expense.miscellaneous_expense = input.miscellaneous_expense;
        expense.total_distance = breakdown.total_distance;
        expense.fuel_total = breakdown.fuel_total;
        expense.amount = breakdown.amount;

        let saved = self.repos.expenses.update(&expense).await?;
        tracing::info!(expense_id = id, amount = %saved.amount, "expense updated");
        Ok(saved)
    }

    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn list(&self, current: &CurrentUser, params: ListParams) -> HrResult<Paginated<Expense>> {
        let query = ListQueryContract::new().validate(&params)?;
        let scope = self
            .repos
            .list_scope(current, &query, Action::ViewExpenses)
            .await?;
        Ok(self.repos.expenses.list(&scope.filter, query.pagination).await?)
    }

    /// The fuel rate of the employee's store, for requests that omit `rate`
    async fn store_rate(&self, employee_id: Id) -> HrResult<Decimal> {
        let user = self.repos.user(employee_id).await?;
        let store = match user.store_id {
            Some(store_id) => self.repos.stores.find_by_id(store_id).await?,
            None => None,
        };
        store
            .map(|s| s.fuel_rate_per_km)
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or_else(|| HrError::invalid("rate", "is required when the store has no fuel rate"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{caller, employee, store, MockRepos};
    use hr_core::dates;
    use hr_models::Role;
    use rust_decimal_macros::dec;

    fn request(value: serde_json::Value) -> CreateExpenseRequest {
        serde_json::from_value(value).unwrap()
    }

    fn stored(id: Id, user_id: Id) -> Expense {
        let input = hr_payroll::MileageInput::new(dec!(100), dec!(150), dec!(2));
        let breakdown = input.calculate().unwrap();
        let mut expense = Expense::from_calculation(
            user_id,
            dates::normalize_submitted("date", "2024-05-02").unwrap(),
            &input,
            &breakdown,
            None,
        );
        expense.id = Some(id);
        expense
    }

    #[tokio::test]
    async fn test_submit_uses_store_rate_when_omitted() {
        let mut mocks = MockRepos::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Role::Employee, Some(10)))));
        mocks
            .stores
            .expect_find_by_id()
            .returning(|id| Ok(Some(store(id, "Andheri"))));
        mocks.expenses.expect_upsert().times(1).returning(|e| {
            Ok(Upserted {
                record: e.clone(),
                inserted: true,
            })
        });
        let service = ExpenseService::new(mocks.build());

        let saved = service
            .submit(
                &caller(1, Role::Employee, Some(10)),
                request(serde_json::json!({
                    "date": "2024-05-02",
                    "initialReading": 1000,
                    "finalReading": 1040,
                    "miscellaneousExpense": 20
                })),
            )
            .await
            .unwrap();

        assert!(saved.inserted);
        assert_eq!(saved.record.rate, dec!(3.5));
        assert_eq!(saved.record.total_distance, dec!(40));
        assert_eq!(saved.record.amount, dec!(160.0));
    }

    #[tokio::test]
    async fn test_submit_rejects_final_below_initial_without_writing() {
        let mut mocks = MockRepos::default();
        mocks.expenses.expect_upsert().never();
        let service = ExpenseService::new(mocks.build());

        let err = service
            .submit(
                &caller(1, Role::Employee, Some(10)),
                request(serde_json::json!({
                    "date": "2024-05-02",
                    "initialReading": 500,
                    "finalReading": 400,
                    "rate": 3
                })),
            )
            .await
            .unwrap_err();
        match err {
            HrError::Validation(errors) => assert!(errors.has_error("finalReading")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_for_colleague_is_forbidden_for_employees() {
        let mut mocks = MockRepos::default();
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Role::Employee, Some(10)))));
        let service = ExpenseService::new(mocks.build());

        let err = service
            .submit(
                &caller(1, Role::Employee, Some(10)),
                request(serde_json::json!({
                    "employeeId": 2,
                    "date": "2024-05-02",
                    "initialReading": 1,
                    "finalReading": 2,
                    "rate": 1
                })),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_update_recomputes_from_merged_readings() {
        let mut mocks = MockRepos::default();
        mocks
            .expenses
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, 1))));
        mocks
            .expenses
            .expect_update()
            .returning(|e| Ok(e.clone()));
        let service = ExpenseService::new(mocks.build());

        let updated = service
            .update(
                &caller(1, Role::Employee, Some(10)),
                7,
                serde_json::from_value(serde_json::json!({ "finalReading": 180 })).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.total_distance, dec!(80));
        assert_eq!(updated.amount, dec!(160));
    }

    #[tokio::test]
    async fn test_update_missing_expense_is_not_found() {
        let mut mocks = MockRepos::default();
        mocks.expenses.expect_find_by_id().returning(|_| Ok(None));
        let service = ExpenseService::new(mocks.build());

        let err = service
            .update(
                &caller(1, Role::Hr, None),
                7,
                UpdateExpenseRequest::default(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_of_colleagues_expense_looks_missing() {
        let mut mocks = MockRepos::default();
        mocks
            .expenses
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id, 2))));
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Role::Employee, Some(10)))));
        mocks.expenses.expect_update().never();
        let service = ExpenseService::new(mocks.build());

        let err = service
            .update(
                &caller(1, Role::Employee, Some(10)),
                7,
                serde_json::from_value(serde_json::json!({ "finalReading": 180 })).unwrap(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_passes_filter_and_pagination() {
        let mut mocks = MockRepos::default();
        mocks
            .expenses
            .expect_list()
            .withf(|filter, page| {
                filter.user_id == Some(1) && filter.from.is_some() && page.limit == 10
            })
            .returning(|_, page| Ok(Paginated::new(vec![stored(1, 1)], 1, page)));
        let service = ExpenseService::new(mocks.build());

        let params = ListParams {
            start_date: Some("2024-05-01".into()),
            end_date: Some("2024-05-31".into()),
            limit: Some("10".into()),
            ..Default::default()
        };
        let page = service
            .list(&caller(1, Role::Employee, Some(10)), params)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
    }
}
