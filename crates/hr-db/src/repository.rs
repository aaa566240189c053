//! Shared repository types

use chrono::{DateTime, Utc};
use hr_core::error::{HrError, ValidationErrors};
use hr_core::traits::Id;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// The database refused a value the contracts let through
    #[error("Rejected value: {0}")]
    Rejected(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored value: {0}")]
    InvalidData(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// SQLSTATE `numeric_value_out_of_range`
const NUMERIC_OUT_OF_RANGE: &str = "22003";

impl From<sqlx::Error> for RepositoryError {
    /// Check violations and numeric overflow are input problems, not outages
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_check_violation() => RepositoryError::Rejected(db.message().to_string()),
            Some(db) if db.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) => {
                RepositoryError::Rejected(db.message().to_string())
            }
            _ => RepositoryError::Database(err),
        }
    }
}

impl RepositoryError {
    /// Unique violations become `Conflict`; everything else is classified as usual
    pub fn from_write(err: sqlx::Error, conflict: impl Into<String>) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::Conflict(conflict.into()),
            _ => err.into(),
        }
    }
}

impl From<RepositoryError> for HrError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => HrError::not_found("Record", "id", what),
            RepositoryError::Conflict(message) => HrError::conflict(message),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "database failure");
                HrError::Database(e.to_string())
            }
            RepositoryError::Rejected(message) => {
                tracing::warn!(%message, "write rejected by the database");
                let mut errors = ValidationErrors::new();
                errors.add_base("a submitted value is outside the range that can be stored");
                HrError::Validation(errors)
            }
            RepositoryError::InvalidData(message) => {
                tracing::error!(%message, "stored row failed to decode");
                HrError::Internal(message)
            }
        }
    }
}

/// Row-level filter for list queries. `None` fields do not constrain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub user_id: Option<Id>,
    pub store_id: Option<Id>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl RecordFilter {
    pub fn for_user(user_id: Id) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn for_store(store_id: Id) -> Self {
        Self {
            store_id: Some(store_id),
            ..Default::default()
        }
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

/// Outcome of an upsert: the stored row and whether it was newly created
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<T> {
    pub record: T,
    pub inserted: bool,
}

pub(crate) fn parse_text<T: std::str::FromStr>(column: &str, raw: &str) -> RepositoryResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| RepositoryError::InvalidData(format!("{}: {}", column, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_models::Role;

    #[test]
    fn test_error_mapping() {
        let err: HrError = RepositoryError::Conflict("calendar exists".into()).into();
        assert_eq!(err.status_code(), 409);

        let err: HrError = RepositoryError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), 500);

        let err: HrError = RepositoryError::NotFound("7".into()).into();
        assert_eq!(err.status_code(), 404);

        let err: HrError = RepositoryError::Rejected("expenses_rate_check".into()).into();
        assert_eq!(err.status_code(), 400);
        assert!(!err.to_string().contains("expenses_rate_check"));
    }

    #[test]
    fn test_non_unique_write_errors_stay_database_errors() {
        assert!(matches!(
            RepositoryError::from_write(sqlx::Error::RowNotFound, "dup"),
            RepositoryError::Database(_)
        ));
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text::<Role>("role", "HR").unwrap(), Role::Hr);
        assert!(matches!(
            parse_text::<Role>("role", "boss"),
            Err(RepositoryError::InvalidData(_))
        ));
    }
}
