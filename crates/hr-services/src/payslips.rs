//! Payslip generation, preview, publication and viewing
//!
//! A payslip is computed once and stored; reads return the stored figures.
//! Inputs the request leaves out are derived from data the service owns.

use chrono::NaiveDate;
use hr_auth::{authorize, Action, CurrentUser};
use hr_contracts::payslips::{PayslipContract, PayslipParams, PayslipRequest};
use hr_contracts::query::{ListParams, ListQueryContract};
use hr_contracts::Contract;
use hr_core::pagination::Paginated;
use hr_core::traits::Id;
use hr_core::{dates, HrError, HrResult};
use hr_db::Upserted;
use hr_models::{PayslipView, Salary, User};
use hr_payroll::{AttendanceSummary, DayStatus, PayslipBreakdown, PayslipInput};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::attendance::classify_period;
use crate::context::Repositories;

#[derive(Clone)]
pub struct PayslipService {
    repos: Repositories,
}

impl PayslipService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Inputs drawn from the employee's record for `month`: basic salary,
    /// expense total as fuel, approved cash overtime and absent days so far
    pub async fn derive_input(&self, user: &User, month: NaiveDate) -> HrResult<PayslipInput> {
        let user_id = user
            .id
            .ok_or_else(|| HrError::Internal("unsaved user".to_string()))?;
        let (first, last) = dates::month_bounds(month);
        let from = dates::to_utc_midnight(first);
        let to = dates::to_utc_midnight(last);

        let fuel_expenses = self.repos.expenses.sum_amount(user_id, from, to).await?;
        let overtime_hours = self
            .repos
            .overtime
            .approved_cash_hours(user_id, from, to)
            .await?;

        let (days, _) = classify_period(&self.repos, user, first, last, dates::today()).await?;
        let absent_days = AttendanceSummary::from_days(&days).count(DayStatus::Absent);

        Ok(PayslipInput {
            absent_days: Decimal::from(absent_days),
            overtime_hours,
            fuel_expenses,
            ..PayslipInput::new(user.basic_salary)
        })
    }

    async fn compute(
        &self,
        current: &CurrentUser,
        request: &PayslipRequest,
    ) -> HrResult<(PayslipParams, PayslipBreakdown)> {
        let params = PayslipContract.validate(request)?;
        self.repos
            .authorize_employee(current, Some(params.employee_id), Action::ManagePayroll)
            .await?;

        let user = self.repos.user(params.employee_id).await?;
        let derived = self.derive_input(&user, params.month).await?;
        let breakdown = params.overrides.resolve(&derived).calculate()?;
        Ok((params, breakdown))
    }

    /// Run the calculation without storing anything
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn preview(
        &self,
        current: &CurrentUser,
        request: PayslipRequest,
    ) -> HrResult<PayslipBreakdown> {
        let (_, breakdown) = self.compute(current, &request).await?;
        Ok(breakdown)
    }

    /// Compute and store the month's payslip. Regenerating replaces the
    /// figures and withdraws it from the employee until published again.
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn generate(
        &self,
        current: &CurrentUser,
        request: PayslipRequest,
    ) -> HrResult<Upserted<Salary>> {
        let (params, breakdown) = self.compute(current, &request).await?;
        let salary = Salary {
            id: None,
            user_id: params.employee_id,
            month: params.month,
            breakdown,
            published: false,
            created_at: None,
            updated_at: None,
        };
        let saved = self.repos.salaries.upsert(&salary).await?;

        tracing::info!(
            employee_id = params.employee_id,
            month = %saved.record.month_label(),
            net_salary = %saved.record.breakdown.net_salary,
            inserted = saved.inserted,
            "payslip generated"
        );
        Ok(saved)
    }

    /// Set `published`, or flip it when no value is given
    #[instrument(skip(self), fields(user_id = current.id))]
    pub async fn publish(
        &self,
        current: &CurrentUser,
        id: Id,
        published: Option<bool>,
    ) -> HrResult<Salary> {
        let salary = self.find(id).await?;
        self.repos
            .authorize_employee(current, Some(salary.user_id), Action::ManagePayroll)
            .await?;

        let published = published.unwrap_or(!salary.published);
        let saved = self
            .repos
            .salaries
            .set_published(id, published)
            .await?
            .ok_or_else(|| HrError::not_found("Payslip", "id", id))?;

        if published && !salary.published {
            self.repos
                .notify(
                    saved.user_id,
                    format!("Your payslip for {} is available", saved.month_label()),
                )
                .await;
        }
        tracing::info!(payslip_id = id, published, "payslip publication changed");
        Ok(saved)
    }

    /// One month's payslip. The employee sees it locked until it is published.
    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn view(&self, current: &CurrentUser, params: ListParams) -> HrResult<PayslipView> {
        let query = ListQueryContract::new().validate(&params)?;
        let month = query
            .month
            .ok_or_else(|| HrError::invalid("month", "can't be blank"))?;
        let employee_id = query.employee_id.unwrap_or(current.id);
        let scope = self.repos.employee_scope(current, employee_id).await?;
        authorize(current, Action::ViewPayslip, scope)?;

        let salary = self
            .repos
            .salaries
            .find_for_month(employee_id, month)
            .await?
            .ok_or_else(|| HrError::not_found("Payslip", "month", month.format("%Y-%m")))?;

        Ok(visible(salary, current.can(Action::ManagePayroll, scope)))
    }

    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn list(
        &self,
        current: &CurrentUser,
        params: ListParams,
    ) -> HrResult<Paginated<PayslipView>> {
        let query = ListQueryContract::new().validate(&params)?;
        let scope = self
            .repos
            .list_scope(current, &query, Action::ViewPayslip)
            .await?;
        let manager = current.can(Action::ManagePayroll, scope.scope);

        let page = self
            .repos
            .salaries
            .list(&scope.filter, query.pagination)
            .await?;
        Ok(page.map(|salary| visible(salary, manager)))
    }

    async fn find(&self, id: Id) -> HrResult<Salary> {
        self.repos
            .salaries
            .find_by_id(id)
            .await?
            .ok_or_else(|| HrError::not_found("Payslip", "id", id))
    }
}

fn visible(salary: Salary, manager: bool) -> PayslipView {
    if salary.published || manager {
        PayslipView::Available(salary)
    } else {
        PayslipView::Locked
    }
}
