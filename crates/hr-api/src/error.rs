//! API error handling
//!
//! Every failure leaves the API as `{ "error", "message" }`; validation
//! failures add the per-field `errors` list.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hr_core::error::{FieldError, HrError, ValidationErrors};
use serde::Serialize;

/// An `HrError` on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub HrError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// A request body or query string that could not be decoded at all
    pub fn malformed(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        ApiError(HrError::Validation(errors))
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::malformed(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self.0 {
            HrError::Validation(errors) => ErrorBody {
                error: self.0.error_code(),
                message: errors.full_messages().join(", "),
                errors: Some(errors.field_errors()),
            },
            HrError::Database(_) | HrError::Internal(_) | HrError::Config(_) => {
                tracing::error!(error = %self.0, "request failed");
                ErrorBody {
                    error: self.0.error_code(),
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
            other => ErrorBody {
                error: other.error_code(),
                message: other.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
