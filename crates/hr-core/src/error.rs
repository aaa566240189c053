//! Core error types for the HR service
//!
//! The taxonomy is flat and keyed by HTTP status: every failure a handler can
//! produce maps onto exactly one of these variants.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all HR operations
#[derive(Error, Debug)]
pub enum HrError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HrError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl ToString) -> Self {
        HrError::NotFound {
            entity,
            field,
            value: value.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        HrError::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HrError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        HrError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        HrError::Validation(errors)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            HrError::Validation(_) => 400,
            HrError::Unauthorized { .. } => 401,
            HrError::Forbidden { .. } => 403,
            HrError::NotFound { .. } => 404,
            HrError::Conflict { .. } => 409,
            HrError::Database(_) | HrError::Internal(_) | HrError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            HrError::NotFound { .. } => "not_found",
            HrError::Unauthorized { .. } => "unauthorized",
            HrError::Forbidden { .. } => "forbidden",
            HrError::Validation(_) => "validation_failed",
            HrError::Conflict { .. } => "conflict",
            HrError::Database(_) => "database_error",
            HrError::Internal(_) => "internal_error",
            HrError::Config(_) => "configuration_error",
        }
    }
}

/// Field-level validation errors collected by contracts
#[derive(Error, Debug, Default, Clone, PartialEq)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// field name -> messages, ordered for stable responses
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a single field
    pub base_errors: Vec<String>,
}

/// One entry of the machine-readable error list returned with a 400
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        let base = self.base_errors.iter().map(|message| FieldError {
            field: "base".to_string(),
            message: message.clone(),
        });
        let fields = self.errors.iter().flat_map(|(field, messages)| {
            messages.iter().map(move |message| FieldError {
                field: field.clone(),
                message: message.clone(),
            })
        });
        base.chain(fields).collect()
    }

    /// `Ok(())` when nothing was collected, otherwise the errors themselves
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
