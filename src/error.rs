//! Error types for CRM operations
//!
//! Errors are classified by who can fix them:
//! - Caller errors: invalid input, missing records, insufficient role
//! - Environment errors: database, configuration

use thiserror::Error;

use crate::db::DbError;

/// Error types for CRM operations
#[derive(Debug, Error)]
pub enum CrmError {
    // Caller errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Environment errors
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl CrmError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CrmError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Returns true if the request itself was at fault and retrying it
    /// unchanged will fail the same way.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            CrmError::InvalidInput(_) | CrmError::NotFound { .. } | CrmError::Forbidden(_)
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CrmError::InvalidInput(_) => "Correct the highlighted value and submit again.",
            CrmError::NotFound { .. } => "The record may have been deleted. Refresh and retry.",
            CrmError::Forbidden(_) => "Ask an admin to perform this action.",
            CrmError::Db(_) => "Check that the database file is writable and not locked.",
            CrmError::Config(_) => "Check your configuration in ~/.bdcrm/config.json",
            CrmError::Output(_) => "Check that stdout is writable.",
        }
    }
}

impl From<rusqlite::Error> for CrmError {
    fn from(err: rusqlite::Error) -> Self {
        CrmError::Db(DbError::Sqlite(err))
    }
}

impl From<ParseEnumError> for CrmError {
    fn from(err: ParseEnumError) -> Self {
        CrmError::InvalidInput(err.to_string())
    }
}

/// A string did not name any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

pub type CrmResult<T> = Result<T, CrmError>;

/// Serializable error representation for CLI and API consumers
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    pub error_type: ErrorType,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Caller,
    Environment,
}

impl From<&CrmError> for ErrorPayload {
    fn from(err: &CrmError) -> Self {
        let error_type = if err.is_caller_error() {
            ErrorType::Caller
        } else {
            ErrorType::Environment
        };

        ErrorPayload {
            message: err.to_string(),
            error_type,
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
