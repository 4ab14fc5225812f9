//! Response types for the billing API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP statuses, and the success payloads that are not
//! plain domain records.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::RateSource;
use crate::engine::SettlementOutcome;
use crate::error::EngineError;
use crate::models::{AuditTrace, InstructorSettlement};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::NotFound { entity, id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "NOT_FOUND",
                    format!("{} not found: {}", entity, id),
                    format!("No {} with id '{}' exists", entity, id),
                ),
            },
            EngineError::Validation { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid field '{}': {}", field, message),
                    field,
                ),
            },
            EngineError::InvalidTransition { from, to } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "INVALID_TRANSITION",
                    format!("Cannot move a settlement from {} to {}", from, to),
                    "Settlement statuses only move forward: draft, issued, paid",
                ),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message,
                ),
            },
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok".
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Body returned by the settlement endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementResponse {
    /// The stored settlement.
    pub settlement: InstructorSettlement,
    /// Attendance rows paid.
    pub attendance_count: u32,
    /// Per-attendee rate used.
    pub rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
    /// The audit trace recording the calculation.
    pub audit_trace: AuditTrace,
}

impl From<SettlementOutcome> for SettlementResponse {
    fn from(outcome: SettlementOutcome) -> Self {
        Self {
            settlement: outcome.settlement,
            attendance_count: outcome.totals.attendance_count,
            rate: outcome.totals.rate,
            rate_source: outcome.totals.rate_source,
            audit_trace: outcome.totals.audit_trace,
        }
    }
}
