//! Unified error types for the domain layer
//!
//! Configuration that is merely out of range is clamped by the config structs
//! and never reaches this type. `DomainError` is reserved for malformed input
//! (bad ids, unparseable tags) and broken catalog invariants.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Catalog invariant violation (dangling or self relationship)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for values outside their allowed domain.
    ///
    /// # Example
    /// ```ignore
    /// if !(1..=81).contains(&value) {
    ///     return Err(DomainError::validation("event index must be within 1..=81"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
