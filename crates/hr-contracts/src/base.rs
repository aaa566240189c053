//! Base contract system

use chrono::{DateTime, Utc};
use hr_core::dates;
use hr_core::error::{HrError, ValidationErrors};
use rust_decimal::Decimal;

/// Result of contract validation
pub type ValidationResult<T> = Result<T, ValidationErrors>;

/// Turns a raw request into its validated form
pub trait Contract<T>: Send + Sync {
    type Output;

    fn validate(&self, input: &T) -> ValidationResult<Self::Output>;
}

/// Fold a single-field `HrError::Validation` into the running error set
pub(crate) fn absorb<T>(result: Result<T, HrError>, errors: &mut ValidationErrors) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(HrError::Validation(field_errors)) => {
            errors.merge(field_errors);
            None
        }
        Err(other) => {
            errors.add_base(other.to_string());
            None
        }
    }
}

/// Trimmed, non-blank string or a "can't be blank" error
pub(crate) fn required<'a>(
    field: &str,
    value: Option<&'a str>,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, "can't be blank");
            None
        }
    }
}

pub(crate) fn required_date(
    field: &str,
    value: Option<&str>,
    errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
    let raw = required(field, value, errors)?;
    absorb(dates::normalize_submitted(field, raw), errors)
}

pub(crate) fn optional_date(
    field: &str,
    value: Option<&str>,
    errors: &mut ValidationErrors,
) -> Option<DateTime<Utc>> {
    match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => absorb(dates::normalize_submitted(field, raw), errors),
        _ => None,
    }
}

pub(crate) fn non_negative(field: &str, value: Option<Decimal>, errors: &mut ValidationErrors) {
    if let Some(v) = value {
        if v.is_sign_negative() && !v.is_zero() {
            errors.add(field, "must not be negative");
        }
    }
}

pub(crate) fn positive(field: &str, value: Option<Decimal>, errors: &mut ValidationErrors) {
    if let Some(v) = value {
        if v <= Decimal::ZERO {
            errors.add(field, "must be greater than 0");
        }
    }
}

/// Shape of a `NUMERIC(precision, scale)` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeric {
    pub precision: u32,
    pub scale: u32,
}

impl Numeric {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self { precision, scale }
    }

    /// Smallest magnitude the column cannot hold
    pub fn limit(&self) -> Decimal {
        Decimal::from(10_i64.pow(self.precision - self.scale))
    }
}

/// Readings, salaries and other money amounts
pub const AMOUNT: Numeric = Numeric::new(12, 2);
/// Per-kilometre fuel rates
pub const RATE: Numeric = Numeric::new(10, 2);
/// Day and hour counts on a payslip
pub const QUANTITY: Numeric = Numeric::new(6, 2);
/// Overtime multipliers
pub const MULTIPLIER: Numeric = Numeric::new(6, 3);

/// Reject values the column would round or overflow
pub(crate) fn fits(
    field: &str,
    value: Option<Decimal>,
    column: Numeric,
    errors: &mut ValidationErrors,
) {
    let Some(v) = value else { return };
    if v.normalize().scale() > column.scale {
        errors.add(field, format!("must have at most {} decimal places", column.scale));
    } else if v.abs() >= column.limit() {
        errors.add(field, format!("must be less than {}", column.limit()));
    }
}

pub(crate) fn max_length(field: &str, value: Option<&str>, max: usize, errors: &mut ValidationErrors) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.add(field, format!("is too long (maximum is {} characters)", max));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
