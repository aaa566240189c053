//! Leave applications and their review
//!
//! Comp-off leave spends the employee's comp-off balance, one day per
//! calendar day of leave. The debit happens at approval.

use hr_auth::{authorize, Action, CurrentUser};
use hr_contracts::leaves::{ApplyLeaveContract, ApplyLeaveRequest};
use hr_contracts::query::{ListParams, ListQueryContract};
use hr_contracts::review::{ReviewContract, ReviewRequest};
use hr_contracts::Contract;
use hr_core::pagination::Paginated;
use hr_core::traits::Id;
use hr_core::{dates, HrError, HrResult};
use hr_models::{Leave, LeaveType, ReviewStatus};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::context::Repositories;

#[derive(Clone)]
pub struct LeaveService {
    repos: Repositories,
}

impl LeaveService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn apply(&self, current: &CurrentUser, request: ApplyLeaveRequest) -> HrResult<Leave> {
        authorize(current, Action::ApplyLeave, current.own_scope())?;
        let new = ApplyLeaveContract.validate(&request)?;

        let leave = Leave {
            id: None,
            user_id: current.id,
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason,
            status: ReviewStatus::Pending,
            reviewed_by: None,
            created_at: None,
            updated_at: None,
        };

        if leave.leave_type == LeaveType::CompOff {
            let user = self.repos.user(current.id).await?;
            if user.comp_off_balance < Decimal::from(leave.days()) {
                return Err(HrError::invalid(
                    "leaveType",
                    format!(
                        "comp-off balance of {} days does not cover {} days",
                        user.comp_off_balance.normalize(),
                        leave.days()
                    ),
                ));
            }
        }

        let saved = self.repos.leaves.create(&leave).await?;
        tracing::info!(leave_id = ?saved.id, leave_type = %saved.leave_type, days = saved.days(), "leave applied");
        Ok(saved)
    }

    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn list(&self, current: &CurrentUser, params: ListParams) -> HrResult<Paginated<Leave>> {
        let query = ListQueryContract::new().validate(&params)?;
        let action = if query.is_own(current.id) {
            Action::ApplyLeave
        } else {
            Action::ReviewLeave
        };
        let scope = self.repos.list_scope(current, &query, action).await?;
        Ok(self.repos.leaves.list(&scope.filter, query.pagination).await?)
    }

    /// Approve or reject a pending leave
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn review(&self, current: &CurrentUser, id: Id, request: ReviewRequest) -> HrResult<Leave> {
        let leave = self
            .repos
            .leaves
            .find_by_id(id)
            .await?
            .ok_or_else(|| HrError::not_found("Leave", "id", id))?;
        self.repos
            .authorize_employee(current, Some(leave.user_id), Action::ReviewLeave)
            .await?;
        let status = ReviewContract.validate(&request)?;

        if leave.status.is_final() {
            return Err(HrError::conflict(format!("leave {} has already been {}", id, leave.status)));
        }

        let debit = match (status, leave.leave_type) {
            (ReviewStatus::Approved, LeaveType::CompOff) => Decimal::from(leave.days()),
            _ => Decimal::ZERO,
        };
        if !debit.is_zero() {
            self.repos
                .users
                .adjust_comp_off(leave.user_id, -debit)
                .await?
                .ok_or_else(|| HrError::invalid("leaveType", "comp-off balance is insufficient"))?;
        }

        let reviewed = match self.repos.leaves.review(id, status, current.id).await? {
            Some(reviewed) => reviewed,
            None => {
                // Decided concurrently; give the days back
                if !debit.is_zero() {
                    self.repos.users.adjust_comp_off(leave.user_id, debit).await?;
                }
                return Err(HrError::conflict(format!("leave {} has already been reviewed", id)));
            }
        };

        self.repos
            .notify(
                reviewed.user_id,
                format!(
                    "Your {} leave from {} to {} was {}",
                    reviewed.leave_type,
                    dates::format_display_date(reviewed.start_date),
                    dates::format_display_date(reviewed.end_date),
                    reviewed.status
                ),
            )
            .await;
        tracing::info!(leave_id = id, status = %reviewed.status, reviewer = current.id, "leave reviewed");
        Ok(reviewed)
    }
}
