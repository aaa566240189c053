//! Query-string contract shared by every list endpoint
//!
//! `employeeId` (alias `id`), `allEmployees`, `startDate`/`endDate`,
//! `limit`/`offset`, `storeName`, `month`.

use chrono::NaiveDate;
use hr_core::dates;
use hr_core::error::ValidationErrors;
use hr_core::pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT};
use hr_core::traits::Id;
use serde::Deserialize;

use crate::base::{absorb, Contract, ValidationResult};

/// Raw query parameters; everything arrives as text so that bad values
/// surface as field errors rather than extractor rejections
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub employee_id: Option<String>,
    pub id: Option<String>,
    pub all_employees: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub store_name: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub employee_id: Option<Id>,
    pub all_employees: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pagination: Pagination,
    pub store_name: Option<String>,
    /// First day of the requested month
    pub month: Option<NaiveDate>,
}

impl ListQuery {
    /// Explicit date range, or the whole of `month` when only that was given
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date, self.month) {
            (Some(start), Some(end), _) => Some((start, end)),
            (Some(start), None, _) => Some((start, start)),
            (None, Some(end), _) => Some((end, end)),
            (None, None, Some(month)) => Some(dates::month_bounds(month)),
            _ => None,
        }
    }

    /// True when the query reaches only `caller`'s own rows
    pub fn is_own(&self, caller: Id) -> bool {
        self.store_name.is_none()
            && !self.all_employees
            && self.employee_id.map_or(true, |id| id == caller)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ListQueryContract;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListQueryContract {
    pub fn new() -> Self {
        Self
    }

    fn validate_employee(&self, params: &ListParams, errors: &mut ValidationErrors) -> Option<Id> {
        let mut parsed = None;
        for (field, raw) in [("employeeId", &params.employee_id), ("id", &params.id)] {
            let Some(raw) = non_blank(raw) else { continue };
            match raw.parse::<Id>() {
                Ok(id) if id > 0 => match parsed {
                    Some(existing) if existing != id => {
                        errors.add(field, "conflicts with employeeId");
                    }
                    _ => parsed = Some(id),
                },
                _ => errors.add(field, "must be a positive integer"),
            }
        }
        parsed
    }

    fn validate_flag(&self, raw: &Option<String>, errors: &mut ValidationErrors) -> bool {
        match non_blank(raw) {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(_) => {
                errors.add("allEmployees", "must be true or false");
                false
            }
        }
    }

    fn validate_pagination(&self, params: &ListParams, errors: &mut ValidationErrors) -> Pagination {
        let limit = match non_blank(&params.limit) {
            None => DEFAULT_LIMIT,
            Some(raw) => match raw.parse::<i64>() {
                Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
                _ => {
                    errors.add("limit", format!("must be between 1 and {}", MAX_LIMIT));
                    DEFAULT_LIMIT
                }
            },
        };
        let offset = match non_blank(&params.offset) {
            None => 0,
            Some(raw) => match raw.parse::<i64>() {
                Ok(offset) if offset >= 0 => offset,
                _ => {
                    errors.add("offset", "must be greater than or equal to 0");
                    0
                }
            },
        };
        Pagination::new(limit, offset)
    }
}

impl Contract<ListParams> for ListQueryContract {
    type Output = ListQuery;

    fn validate(&self, params: &ListParams) -> ValidationResult<ListQuery> {
        let mut errors = ValidationErrors::new();

        let employee_id = self.validate_employee(params, &mut errors);
        let all_employees = self.validate_flag(&params.all_employees, &mut errors);
        let pagination = self.validate_pagination(params, &mut errors);

        let start_date = non_blank(&params.start_date)
            .and_then(|raw| absorb(dates::parse_date("startDate", raw), &mut errors));
        let end_date = non_blank(&params.end_date)
            .and_then(|raw| absorb(dates::parse_date("endDate", raw), &mut errors));
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("endDate", "must be on or after startDate");
            }
        }
        let month = non_blank(&params.month)
            .and_then(|raw| absorb(dates::parse_month("month", raw), &mut errors));

        if all_employees && employee_id.is_some() {
            errors.add("allEmployees", "cannot be combined with employeeId");
        }

        errors.into_result()?;

        Ok(ListQuery {
            employee_id,
            all_employees,
            start_date,
            end_date,
            pagination,
            store_name: non_blank(&params.store_name).map(str::to_string),
            month,
        })
    }
}
