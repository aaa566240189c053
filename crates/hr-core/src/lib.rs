//! # hr-core
//!
//! Core types, traits, and utilities shared by every HR crate.
//!
//! - Error taxonomy keyed by HTTP status (`HrError`, `ValidationErrors`)
//! - Result alias
//! - Identity and timestamp traits
//! - Limit/offset pagination
//! - Application configuration
//! - UTC-midnight storage and fixed IST display for dates

pub mod config;
pub mod dates;
pub mod error;
pub mod pagination;
pub mod result;
pub mod traits;

pub use error::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
