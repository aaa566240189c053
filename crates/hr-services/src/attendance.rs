//! Attendance punches and the per-day status report

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use hr_auth::{Action, CurrentUser};
use hr_contracts::attendance::{AttendanceContract, RecordAttendanceRequest};
use hr_contracts::query::{ListParams, ListQueryContract};
use hr_contracts::Contract;
use hr_core::traits::Id;
use hr_core::{dates, HrError, HrResult};
use hr_db::Upserted;
use hr_models::{AttendanceRecord, User};
use hr_payroll::{
    classify_range, AttendanceFlags, AttendanceSummary, ClassifiedDay, DayRecord, DayStatus,
};
use serde::Serialize;
use tracing::instrument;

use crate::context::Repositories;

/// Longest range one report may cover
pub const MAX_REPORT_DAYS: i64 = 366;

/// One calendar day of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    #[serde(with = "hr_models::serde_format::display_instant_opt")]
    pub in_time: Option<DateTime<Utc>>,
    #[serde(with = "hr_models::serde_format::display_instant_opt")]
    pub out_time: Option<DateTime<Utc>>,
    pub is_late_entry: bool,
    pub is_early_exit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub employee_id: Id,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<AttendanceDay>,
    pub summary: AttendanceSummary,
}

#[derive(Clone)]
pub struct AttendanceService {
    repos: Repositories,
}

impl AttendanceService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Record an in and/or out punch. Flags are computed here from the
    /// merged day, never taken from the client.
    #[instrument(skip(self, request), fields(user_id = current.id))]
    pub async fn record(
        &self,
        current: &CurrentUser,
        request: RecordAttendanceRequest,
    ) -> HrResult<Upserted<AttendanceRecord>> {
        let employee_id = self
            .repos
            .authorize_employee(current, request.employee_id, Action::RecordAttendance)
            .await?;
        let punch = AttendanceContract.validate(&request)?;

        let user = self.repos.user(employee_id).await?;
        let day = dates::display_date(punch.date);
        let (thresholds, _) = self.repos.working_calendar(&user, day, day).await?;

        let existing = self
            .repos
            .attendance
            .find_for_day(employee_id, punch.date)
            .await?;
        let in_time = punch.in_time.or(existing.as_ref().and_then(|r| r.in_time));
        let out_time = punch.out_time.or(existing.as_ref().and_then(|r| r.out_time));

        let flags = if punch.marked_absent {
            AttendanceFlags::default()
        } else {
            AttendanceFlags::evaluate(in_time, out_time, &thresholds)
        };

        let record = AttendanceRecord {
            id: None,
            user_id: employee_id,
            date: punch.date,
            in_time,
            out_time,
            marked_absent: punch.marked_absent,
            is_late_entry: flags.is_late_entry,
            is_early_exit: flags.is_early_exit,
        };
        let saved = self.repos.attendance.upsert(&record).await?;

        tracing::info!(
            employee_id,
            date = %day,
            late = flags.is_late_entry,
            early_exit = flags.is_early_exit,
            "attendance recorded"
        );
        Ok(saved)
    }

    /// One classified entry per day of the requested range (the current
    /// month by default) with a count per status
    #[instrument(skip(self, params), fields(user_id = current.id))]
    pub async fn report(&self, current: &CurrentUser, params: ListParams) -> HrResult<AttendanceReport> {
        let query = ListQueryContract::new().validate(&params)?;
        let employee_id = self
            .repos
            .authorize_employee(current, query.employee_id, Action::ViewAttendance)
            .await?;

        let (start, end) = query
            .date_range()
            .unwrap_or_else(|| dates::month_bounds(dates::today()));
        if (end - start).num_days() >= MAX_REPORT_DAYS {
            return Err(HrError::invalid(
                "endDate",
                format!("range must not exceed {} days", MAX_REPORT_DAYS),
            ));
        }

        let user = self.repos.user(employee_id).await?;
        let (classified, records) =
            classify_period(&self.repos, &user, start, end, dates::today()).await?;

        let summary = AttendanceSummary::from_days(&classified);
        let days = classified
            .into_iter()
            .map(|day| {
                let record = records.get(&day.date);
                AttendanceDay {
                    date: day.date,
                    status: day.status,
                    in_time: record.and_then(|r| r.in_time),
                    out_time: record.and_then(|r| r.out_time),
                    is_late_entry: record.map(|r| r.is_late_entry).unwrap_or(false),
                    is_early_exit: record.map(|r| r.is_early_exit).unwrap_or(false),
                }
            })
            .collect();

        Ok(AttendanceReport {
            employee_id,
            start_date: start,
            end_date: end,
            days,
            summary,
        })
    }
}

/// Classify `[start, end]` for one employee, returning the stored rows by day
pub(crate) async fn classify_period(
    repos: &Repositories,
    user: &User,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> HrResult<(Vec<ClassifiedDay>, HashMap<NaiveDate, AttendanceRecord>)> {
    let user_id = user
        .id
        .ok_or_else(|| HrError::Internal("unsaved user".to_string()))?;
    let (_, calendar) = repos.working_calendar(user, start, end).await?;

    let rows = repos
        .attendance
        .list_range(user_id, dates::to_utc_midnight(start), dates::to_utc_midnight(end))
        .await?;
    let records: HashMap<NaiveDate, AttendanceRecord> = rows
        .into_iter()
        .map(|r| (dates::display_date(r.date), r))
        .collect();
    let day_records: HashMap<NaiveDate, DayRecord> = records
        .iter()
        .map(|(date, r)| (*date, r.day_record()))
        .collect();

    let classified = classify_range(start, end, today, &day_records, &calendar);
    Ok((classified, records))
}
