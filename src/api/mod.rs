//! HTTP API module for the billing engine.
//!
//! This module provides the REST endpoints for student status, attendance
//! registration, payments, instructor settlements, the cash book, and
//! reports.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, BulkAttendanceRequest, CashFlowQuery, CashMovementRequest,
    PaymentRequest, SettlementRequest, SettlementStatusRequest,
};
pub use response::{ApiError, ApiErrorResponse, HealthResponse, SettlementResponse};
pub use state::AppState;
