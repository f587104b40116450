//! Error type shared by every storage port.

/// Storage failures, with enough context to log something actionable.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// `operation` names the query that failed, for tracing.
    #[error("Database error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },

    /// A JSON column could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored row breaks a catalog rule (e.g. difficulty outside 1..=81).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepoError {
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn constraint(message: impl ToString) -> Self {
        Self::ConstraintViolation(message.to_string())
    }
}
