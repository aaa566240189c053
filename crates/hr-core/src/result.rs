//! Result type alias

use crate::error::HrError;

/// Standard Result type for HR operations
pub type HrResult<T> = Result<T, HrError>;
