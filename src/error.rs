//! Error types for the billing engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the calculators, the store and the configuration loader
//! can report.

use thiserror::Error;

/// The main error type for the billing engine.
///
/// There is no variant for a missing tariff: the settlement calculator falls
/// back to the default session rate. A repeated attendance for the same
/// (session, person) pair is an update, not an error.
///
/// # Example
///
/// ```
/// use academia_billing::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "subscription".to_string(),
///     id: "sub_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "subscription not found: sub_404");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "subscription", "session").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Input was malformed or violated a domain rule.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A settlement status change that the lifecycle does not allow.
    #[error("Invalid settlement transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    /// Shorthand for a [`EngineError::Validation`].
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
