//! Calculation input errors

use hr_core::{HrError, ValidationErrors};
use rust_decimal::Decimal;
use thiserror::Error;

/// Inputs a calculator refuses to compute with
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },

    #[error("finalReading must be greater than or equal to initialReading")]
    FinalBeforeInitial,

    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u32 },

    #[error("{field} is too large to calculate")]
    Overflow { field: &'static str },
}

impl CalculationError {
    /// Request field the error is reported against
    pub fn field(&self) -> &'static str {
        match self {
            CalculationError::Negative { field }
            | CalculationError::NotPositive { field }
            | CalculationError::TooLarge { field, .. }
            | CalculationError::Overflow { field } => field,
            CalculationError::FinalBeforeInitial => "finalReading",
        }
    }

    fn message(&self) -> String {
        match self {
            CalculationError::Negative { .. } => "must not be negative".to_string(),
            CalculationError::NotPositive { .. } => "must be greater than 0".to_string(),
            CalculationError::FinalBeforeInitial => {
                "must be greater than or equal to initialReading".to_string()
            }
            CalculationError::TooLarge { max, .. } => format!("must be at most {}", max),
            CalculationError::Overflow { .. } => "is too large to calculate".to_string(),
        }
    }
}

/// Checked `Decimal` arithmetic reporting overflow against `field`
pub(crate) trait Checked: Sized {
    fn mul_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError>;
    fn add_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError>;
    fn sub_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError>;
    fn div_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError>;
}

impl Checked for Decimal {
    fn mul_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError> {
        self.checked_mul(rhs).ok_or(CalculationError::Overflow { field })
    }

    fn add_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError> {
        self.checked_add(rhs).ok_or(CalculationError::Overflow { field })
    }

    fn sub_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError> {
        self.checked_sub(rhs).ok_or(CalculationError::Overflow { field })
    }

    fn div_or(self, rhs: Self, field: &'static str) -> Result<Self, CalculationError> {
        self.checked_div(rhs).ok_or(CalculationError::Overflow { field })
    }
}

impl From<CalculationError> for ValidationErrors {
    fn from(err: CalculationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(err.field(), err.message());
        errors
    }
}

impl From<CalculationError> for HrError {
    fn from(err: CalculationError) -> Self {
        HrError::Validation(err.into())
    }
}
