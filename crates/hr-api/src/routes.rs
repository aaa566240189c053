//! API routes

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{attendance, expenses, leaves, overtime, payslips, settings, users};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .nest("/expenses", expenses_router())
        .nest("/payslips", payslips_router())
        .nest("/attendance", attendance_router())
        .nest("/leaves", leaves_router())
        .nest("/overtime", overtime_router())
        .nest("/settings", settings_router())
        .nest("/users", users_router())
        .route("/notifications", get(users::list_notifications))
}

fn expenses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(expenses::list_expenses).post(expenses::submit_expense))
        .route("/:id", put(expenses::update_expense))
}

fn payslips_router() -> Router<AppState> {
    Router::new()
        .route("/", get(payslips::get_payslips).post(payslips::generate_payslip))
        .route("/preview", post(payslips::preview_payslip))
        .route("/:id/publish", put(payslips::publish_payslip))
}

fn attendance_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(attendance::attendance_report).post(attendance::record_attendance),
    )
}

fn leaves_router() -> Router<AppState> {
    Router::new()
        .route("/", get(leaves::list_leaves).post(leaves::apply_leave))
        .route("/:id/review", put(leaves::review_leave))
}

fn overtime_router() -> Router<AppState> {
    Router::new()
        .route("/", get(overtime::list_overtime).post(overtime::request_overtime))
        .route("/:id/review", put(overtime::review_overtime))
}

fn settings_router() -> Router<AppState> {
    Router::new()
        .route(
            "/holidays",
            get(settings::list_holidays)
                .put(settings::save_holidays)
                .delete(settings::delete_holiday),
        )
        .route(
            "/calendar",
            get(settings::get_calendar)
                .post(settings::create_calendar)
                .put(settings::update_calendar),
        )
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::get_current_user))
        .route("/:id", get(users::get_user).put(users::update_user))
}
