//! HTTP request handlers for the billing API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler tags its log events with a per-request correlation id.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{ActivitySummary, DelinquentSubscription, MonthlyCashSummary};
use crate::engine::{StudentStatus, SubscriptionStatement};
use crate::error::EngineError;
use crate::models::{Attendance, CashMovement, InstructorSettlement, Payment};
use crate::store::Store;

use super::request::{
    AttendanceRequest, BulkAttendanceRequest, CashFlowQuery, CashMovementRequest,
    PaymentRequest, SettlementRequest, SettlementStatusRequest,
};
use super::response::{ApiError, ApiErrorResponse, HealthResponse, SettlementResponse};
use super::state::AppState;

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/students/:id/status", get(student_status_handler))
        .route("/subscriptions/:id/statement", get(statement_handler))
        .route(
            "/sessions/:id/attendance",
            get(list_attendance_handler).post(attendance_handler),
        )
        .route("/sessions/:id/attendance/bulk", post(bulk_attendance_handler))
        .route("/payments", post(payment_handler))
        .route("/settlements", post(create_settlement_handler))
        .route("/settlements/:id", get(get_settlement_handler))
        .route("/settlements/:id/recalculate", post(recalculate_settlement_handler))
        .route("/settlements/:id/status", post(settlement_status_handler))
        .route("/cash-movements", post(cash_movement_handler))
        .route("/reports/summary", get(summary_handler))
        .route("/reports/delinquents", get(delinquents_handler))
        .route("/reports/cash-flow", get(cash_flow_handler))
        .with_state(state)
}

/// Unwraps a JSON body or turns the rejection into an API error.
fn json_body<T>(
    correlation_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> ApiResult<T> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the failure
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}

/// Logs a failed request and converts the error for the response.
fn failure(correlation_id: Uuid, err: EngineError) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    err.into()
}

/// Handler for GET /health.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}

/// Handler for GET /students/:id/status.
///
/// Reports the person's most recent subscription.
async fn student_status_handler(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<StudentStatus>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, person_id = %person_id, "Processing student status request");

    let store = state.store().read().await;
    let status = state
        .engine()
        .student_status(&*store, &person_id)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(status))
}

/// Handler for GET /subscriptions/:id/statement.
async fn statement_handler(
    State(state): State<AppState>,
    Path(subscription_id): Path<String>,
) -> ApiResult<Json<SubscriptionStatement>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, subscription_id = %subscription_id, "Processing statement request");

    let start_time = Instant::now();
    let store = state.store().read().await;
    let statement = state
        .engine()
        .subscription_statement(&*store, &subscription_id)
        .map_err(|err| failure(correlation_id, err))?;

    info!(
        correlation_id = %correlation_id,
        subscription_id = %subscription_id,
        classes_used = statement.classes_used,
        outstanding_balance = %statement.outstanding_balance,
        duration_us = start_time.elapsed().as_micros(),
        "Statement completed successfully"
    );
    Ok(Json(statement))
}

/// Handler for GET /sessions/:id/attendance.
async fn list_attendance_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Vec<Attendance>>> {
    let correlation_id = Uuid::new_v4();
    let store = state.store().read().await;
    let rows = store
        .attendance_for_session(&session_id)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(rows))
}

/// Handler for POST /sessions/:id/attendance.
///
/// Registering the same person twice updates the existing row.
async fn attendance_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<AttendanceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Attendance>)> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, session_id = %session_id, "Processing attendance request");

    let request = json_body(correlation_id, payload)?;
    let mut store = state.store().write().await;
    let attendance = state
        .engine()
        .register_attendance(&mut *store, request.into_draft(&session_id))
        .map_err(|err| failure(correlation_id, err))?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

/// Handler for POST /sessions/:id/attendance/bulk.
///
/// Either every entry is stored or none is.
async fn bulk_attendance_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<BulkAttendanceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<Attendance>>)> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, session_id = %session_id, "Processing bulk attendance request");

    let request = json_body(correlation_id, payload)?;
    if request.attendances.is_empty() {
        return Err(ApiErrorResponse::bad_request(ApiError::validation_error(
            "attendances must not be empty",
        )));
    }

    let drafts = request
        .attendances
        .into_iter()
        .map(|entry| entry.into_draft(&session_id))
        .collect();
    let mut store = state.store().write().await;
    let rows = state
        .engine()
        .register_attendances(&mut *store, drafts)
        .map_err(|err| failure(correlation_id, err))?;
    Ok((StatusCode::CREATED, Json(rows)))
}

/// Handler for POST /payments.
async fn payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payment request");

    let request = json_body(correlation_id, payload)?;
    let mut store = state.store().write().await;
    let payment = state
        .engine()
        .record_payment(&mut *store, request.into())
        .map_err(|err| failure(correlation_id, err))?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Handler for POST /settlements.
///
/// Opens a draft settlement and computes its totals.
async fn create_settlement_handler(
    State(state): State<AppState>,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SettlementResponse>)> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing settlement request");

    let request = json_body(correlation_id, payload)?;
    let mut store = state.store().write().await;
    let outcome = state
        .engine()
        .create_settlement(&mut *store, request.into())
        .map_err(|err| failure(correlation_id, err))?;

    if outcome.used_default_rate() && outcome.totals.attendance_count > 0 {
        warn!(
            correlation_id = %correlation_id,
            settlement_id = %outcome.settlement.id,
            "Settlement paid at the default rate"
        );
    }
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Handler for GET /settlements/:id.
async fn get_settlement_handler(
    State(state): State<AppState>,
    Path(settlement_id): Path<String>,
) -> ApiResult<Json<InstructorSettlement>> {
    let correlation_id = Uuid::new_v4();
    let store = state.store().read().await;
    let settlement = store
        .settlement(&settlement_id)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(settlement.clone()))
}

/// Handler for POST /settlements/:id/recalculate.
async fn recalculate_settlement_handler(
    State(state): State<AppState>,
    Path(settlement_id): Path<String>,
) -> ApiResult<Json<SettlementResponse>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, settlement_id = %settlement_id, "Processing recalculation request");

    let mut store = state.store().write().await;
    let outcome = state
        .engine()
        .recalculate_settlement(&mut *store, &settlement_id)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(outcome.into()))
}

/// Handler for POST /settlements/:id/status.
async fn settlement_status_handler(
    State(state): State<AppState>,
    Path(settlement_id): Path<String>,
    payload: Result<Json<SettlementStatusRequest>, JsonRejection>,
) -> ApiResult<Json<InstructorSettlement>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, settlement_id = %settlement_id, "Processing settlement status request");

    let request = json_body(correlation_id, payload)?;
    let mut store = state.store().write().await;
    let settlement = state
        .engine()
        .transition_settlement(&mut *store, &settlement_id, request.status)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(settlement))
}

/// Handler for POST /cash-movements.
///
/// The stored movement carries the derived net and tax amounts.
async fn cash_movement_handler(
    State(state): State<AppState>,
    payload: Result<Json<CashMovementRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CashMovement>)> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing cash movement request");

    let request = json_body(correlation_id, payload)?;
    let mut store = state.store().write().await;
    let movement = state
        .engine()
        .record_cash_movement(&mut *store, request.into())
        .map_err(|err| failure(correlation_id, err))?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Handler for GET /reports/summary.
async fn summary_handler(State(state): State<AppState>) -> ApiResult<Json<ActivitySummary>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing activity summary");

    let store = state.store().read().await;
    let summary = state
        .engine()
        .activity_summary(&*store)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(summary))
}

/// Handler for GET /reports/delinquents.
async fn delinquents_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DelinquentSubscription>>> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing delinquents report");

    let store = state.store().read().await;
    let report = state
        .engine()
        .delinquent_subscriptions(&*store)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(report))
}

/// Handler for GET /reports/cash-flow?organization=.
async fn cash_flow_handler(
    State(state): State<AppState>,
    query: Result<Query<CashFlowQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<MonthlyCashSummary>>> {
    let correlation_id = Uuid::new_v4();
    let Query(query) = query.map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
        ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text()))
    })?;
    info!(correlation_id = %correlation_id, organization = %query.organization, "Processing cash-flow report");

    let store = state.store().read().await;
    let summary = state
        .engine()
        .monthly_cash_summary(&*store, &query.organization)
        .map_err(|err| failure(correlation_id, err))?;
    Ok(Json(summary))
}
