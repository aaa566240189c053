//! Overtime requests and their review
//!
//! Approved cash overtime is paid through the payslip; approved comp-off
//! overtime credits `hours / 8` days to the employee's comp-off balance.

use hr_auth::{authorize, Action, CurrentUser};
use hr_contracts::overtime::{OvertimeContract, OvertimeRequestBody};
use hr_contracts::query::{ListParams, ListQueryContract};
use hr_contracts::review::{ReviewContract, ReviewRequest};
use hr_contracts::Contract;
use hr_core::pagination::Paginated;
use hr_core::traits::Id;
use hr_core::{dates, HrError, HrResult};
use hr_models::{OvertimeRequest, ReviewStatus};
use hr_payroll::PayrollConstants;
use tracing::instrument;

use crate::context::Repositories;

#[derive(Clone)]
pub struct OvertimeService {
    repos: Repositories,
    constants: PayrollConstants,
}

impl OvertimeService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            constants: PayrollConstants::default(),
        }
    }

    #[instrument(skip(self, body), fields(user_id = current.id))]
    pub async fn request(&self, current: &CurrentUser, body: OvertimeRequestBody) -> HrResult<OvertimeRequest> {
        authorize(current, Action::RequestOvertime, current.own_scope())?;
        let new = OvertimeContract.validate(&body)?;

        let request = OvertimeRequest {
            id: None,
            user_id: current.id,
            date: new.date,
            hours: new.hours,
            compensation: new.compensation,
            status: ReviewStatus::Pending,
            reviewed_by: None,
            created_at: None,
            updated_at: None,
        };
        let saved = self.repos.overtime.create(&request).await?;
        tracing::info!(overtime_id = ?saved.id, hours = %saved.hours, "overtime requested");
        Ok(saved)
    }

    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn list(
        &self,
        current: &CurrentUser,
        params: ListParams,
    ) -> HrResult<Paginated<OvertimeRequest>> {
        let query = ListQueryContract::new().validate(&params)?;
        let action = if query.is_own(current.id) {
            Action::RequestOvertime
        } else {
            Action::ReviewOvertime
        };
        let scope = self.repos.list_scope(current, &query, action).await?;
        Ok(self.repos.overtime.list(&scope.filter, query.pagination).await?)
    }

    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn review(
        &self,
        current: &CurrentUser,
        id: Id,
        request: ReviewRequest,
    ) -> HrResult<OvertimeRequest> {
        let pending = self
            .repos
            .overtime
            .find_by_id(id)
            .await?
            .ok_or_else(|| HrError::not_found("OvertimeRequest", "id", id))?;
        self.repos
            .authorize_employee(current, Some(pending.user_id), Action::ReviewOvertime)
            .await?;
        let status = ReviewContract.validate(&request)?;

        let reviewed = self
            .repos
            .overtime
            .review(id, status, current.id)
            .await?
            .ok_or_else(|| {
                HrError::conflict(format!("overtime request {} has already been reviewed", id))
            })?;

        if reviewed.status == ReviewStatus::Approved {
            let credit = reviewed.comp_off_days(self.constants.hours_per_day);
            if !credit.is_zero() {
                let balance = self
                    .repos
                    .users
                    .adjust_comp_off(reviewed.user_id, credit)
                    .await?;
                tracing::info!(user_id = reviewed.user_id, %credit, ?balance, "comp-off credited");
            }
        }

        self.repos
            .notify(
                reviewed.user_id,
                format!(
                    "Your overtime of {} hours on {} was {}",
                    reviewed.hours.normalize(),
                    dates::format_display_date(reviewed.date),
                    reviewed.status
                ),
            )
            .await;
        tracing::info!(overtime_id = id, status = %reviewed.status, reviewer = current.id, "overtime reviewed");
        Ok(reviewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{caller, employee, MockRepos};
    use hr_models::{Compensation, Role};
    use rust_decimal_macros::dec;

    fn pending(compensation: Compensation) -> OvertimeRequest {
        OvertimeRequest {
            id: Some(4),
            user_id: 2,
            date: dates::normalize_submitted("date", "2024-09-02").unwrap(),
            hours: dec!(4),
            compensation,
            status: ReviewStatus::Pending,
            reviewed_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn reviewing(mocks: &mut MockRepos, compensation: Compensation) {
        mocks
            .users
            .expect_find_by_id()
            .returning(|id| Ok(Some(employee(id, Role::Employee, Some(10)))));
        mocks
            .overtime
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending(compensation))));
        mocks.overtime.expect_review().returning(move |_, status, reviewer| {
            Ok(Some(OvertimeRequest {
                status,
                reviewed_by: Some(reviewer),
                ..pending(compensation)
            }))
        });
        mocks
            .notifications
            .expect_create()
            .returning(|n| Ok(n.clone()));
    }

    #[tokio::test]
    async fn test_approved_comp_off_credits_half_a_day_for_four_hours() {
        let mut mocks = MockRepos::default();
        reviewing(&mut mocks, Compensation::CompOff);
        mocks
            .users
            .expect_adjust_comp_off()
            .withf(|user_id, delta| *user_id == 2 && *delta == dec!(0.5))
            .times(1)
            .returning(|_, _| Ok(Some(dec!(0.5))));
        let service = OvertimeService::new(mocks.build());

        let reviewed = service
            .review(
                &caller(1, Role::StoreDirector, Some(10)),
                4,
                ReviewRequest {
                    status: Some("approved".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewed.status, ReviewStatus::Approved);
    }

    #[tokio::test]
    async fn test_cash_overtime_leaves_balance_alone() {
        let mut mocks = MockRepos::default();
        reviewing(&mut mocks, Compensation::Cash);
        mocks.users.expect_adjust_comp_off().never();
        let service = OvertimeService::new(mocks.build());

        service
            .review(
                &caller(1, Role::Hr, None),
                4,
                ReviewRequest {
                    status: Some("approved".into()),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_hours_rejected() {
        let mut mocks = MockRepos::default();
        mocks.overtime.expect_create().never();
        let service = OvertimeService::new(mocks.build());

        let body = serde_json::from_value(serde_json::json!({
            "date": "2024-09-02",
            "hours": 13,
            "compensation": "cash"
        }))
        .unwrap();
        let err = service
            .request(&caller(2, Role::Employee, Some(10)), body)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
