//! # hr-contracts
//!
//! Request validation for the HR service.
//!
//! Each contract takes the raw request body (or query string) and either
//! returns a typed, normalized value or every field error it found. Handlers
//! never see a half-validated request.

pub mod attendance;
pub mod base;
pub mod calendar;
pub mod expenses;
pub mod holidays;
pub mod leaves;
pub mod overtime;
pub mod payslips;
pub mod profile;
pub mod query;
pub mod review;

pub use base::{Contract, ValidationResult};
