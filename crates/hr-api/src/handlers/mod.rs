//! API request handlers

pub mod attendance;
pub mod expenses;
pub mod leaves;
pub mod overtime;
pub mod payslips;
pub mod settings;
pub mod users;

use axum::{http::StatusCode, Json};
use hr_db::Upserted;

/// 201 for a new row, 200 when an existing one was replaced
pub(crate) fn upserted<T>(result: Upserted<T>) -> (StatusCode, Json<T>) {
    let status = if result.inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(result.record))
}
