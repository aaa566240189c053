//! Payslip API handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use hr_contracts::payslips::PayslipRequest;
use hr_contracts::query::ListParams;
use hr_core::traits::Id;
use serde::Deserialize;

use super::upserted;
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser, JsonBody, QueryParams};

#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    pub published: Option<bool>,
}

impl PublishRequest {
    /// Only a blank body means "flip"; anything else must parse
    fn from_body(body: &[u8]) -> Result<Option<bool>, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice::<PublishRequest>(body)
            .map(|request| request.published)
            .map_err(|e| {
                ApiError::malformed(format!("Failed to parse the request body as JSON: {}", e))
            })
    }
}

/// POST /api/v1/payslips/preview
pub async fn preview_payslip(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<PayslipRequest>,
) -> ApiResult<impl IntoResponse> {
    let breakdown = state.payslips.preview(&user, request).await?;
    Ok(Json(breakdown))
}

/// POST /api/v1/payslips
pub async fn generate_payslip(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<PayslipRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state.payslips.generate(&user, request).await?;
    Ok(upserted(result))
}

/// PUT /api/v1/payslips/:id/publish
///
/// `{ "published": bool }`; an empty body flips the current state.
pub async fn publish_payslip(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let published = PublishRequest::from_body(&body)?;
    let salary = state.payslips.publish(&user, id, published).await?;
    Ok(Json(salary))
}

/// GET /api/v1/payslips
///
/// With `month` this is one employee's payslip for that month (locked until
/// published); without it, a page of payslips.
pub async fn get_payslips(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<Response> {
    if params.month.is_some() {
        let view = state.payslips.view(&user, params).await?;
        Ok(Json(view).into_response())
    } else {
        let page = state.payslips.list(&user, params).await?;
        Ok(Json(page).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_body() {
        assert_eq!(PublishRequest::from_body(b"").unwrap(), None);
        assert_eq!(PublishRequest::from_body(b" \n").unwrap(), None);
        assert_eq!(PublishRequest::from_body(b"{}").unwrap(), None);
        assert_eq!(
            PublishRequest::from_body(br#"{"published":false}"#).unwrap(),
            Some(false)
        );

        let err = PublishRequest::from_body(br#"{"published":"no"}"#).unwrap_err();
        assert_eq!(err.0.status_code(), 400);
    }
}
