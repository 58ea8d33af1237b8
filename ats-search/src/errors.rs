use std::borrow::Cow;

use thiserror::Error;

/// Error type returned by the fallible layers of the search stack.
///
/// Query compilation never produces one of these; only storage access,
/// parameter parsing and configuration loading do.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A candidate failed validation before it was written.
    #[error("validation failed")]
    Validation(#[from] ValidationError),

    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The candidate does not exist, or belongs to another tenant.
    #[error("candidate not found")]
    NotFound { candidate_id: Option<String> },

    /// The candidate id is already taken by another tenant's record.
    #[error("candidate {candidate_id} belongs to another tenant")]
    TenantConflict { candidate_id: String },

    /// Invalid search parameters (unknown sort, malformed filter, ...).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file could not be read or resolved.
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

impl SearchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }
}

/// Collection of validation issues encountered while preparing a write.
#[derive(Debug, Error)]
#[error("validation errors: {issues:?}")]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new<I>(issues: I) -> Self
    where
        I: IntoIterator<Item = ValidationIssue>,
    {
        Self {
            issues: issues.into_iter().collect(),
        }
    }

    /// Convenience helper for constructing a single-field validation error.
    pub fn single(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([ValidationIssue::new(field, code, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Detailed validation failure for a single field.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;
