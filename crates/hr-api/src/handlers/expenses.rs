//! Expense API handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use hr_contracts::expenses::{CreateExpenseRequest, UpdateExpenseRequest};
use hr_contracts::query::ListParams;
use hr_core::traits::Id;

use super::upserted;
use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, JsonBody, QueryParams};

/// GET /api/v1/expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    QueryParams(params): QueryParams<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = state.expenses.list(&user, params).await?;
    Ok(Json(page))
}

/// POST /api/v1/expenses
pub async fn submit_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(request): JsonBody<CreateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state.expenses.submit(&user, request).await?;
    Ok(upserted(result))
}

/// PUT /api/v1/expenses/:id
pub async fn update_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    JsonBody(request): JsonBody<UpdateExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let expense = state.expenses.update(&user, id, request).await?;
    Ok(Json(expense))
}
