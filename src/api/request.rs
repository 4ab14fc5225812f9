//! Request types for the billing API.
//!
//! This module defines the JSON request bodies and query strings accepted by
//! the write and report endpoints.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::NewSettlement;
use crate::models::{
    AttendanceDraft, AttendanceStatus, CashCategory, CashMovement, MovementType, Payment,
    PaymentMethod, PaymentType, SettlementStatus,
};

/// Request body for `POST /sessions/:id/attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// The attendee.
    pub person_id: String,
    /// Subscription to bill against.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Exchange agreement covering the attendance.
    #[serde(default)]
    pub agreement_id: Option<String>,
    /// Attendance status, present by default.
    #[serde(default)]
    pub status: AttendanceStatus,
    /// Free-form comment.
    #[serde(default)]
    pub comment: String,
}

impl AttendanceRequest {
    /// Builds the upsert draft for `session_id`.
    pub fn into_draft(self, session_id: &str) -> AttendanceDraft {
        AttendanceDraft {
            session_id: session_id.to_string(),
            person_id: self.person_id,
            subscription_id: self.subscription_id,
            agreement_id: self.agreement_id,
            status: self.status,
            comment: self.comment,
        }
    }
}

/// Request body for `POST /sessions/:id/attendance/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAttendanceRequest {
    /// One entry per attendee.
    pub attendances: Vec<AttendanceRequest>,
}

/// Request body for `POST /settlements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// The paying organization.
    pub organization_id: String,
    /// The instructor being paid.
    pub instructor_id: String,
    /// First day of the window.
    pub period_start: NaiveDate,
    /// Last day of the window, inclusive.
    pub period_end: NaiveDate,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl From<SettlementRequest> for NewSettlement {
    fn from(req: SettlementRequest) -> Self {
        Self {
            organization_id: req.organization_id,
            instructor_id: req.instructor_id,
            period_start: req.period_start,
            period_end: req.period_end,
            notes: req.notes,
        }
    }
}

/// Request body for `POST /settlements/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementStatusRequest {
    /// The requested status.
    pub status: SettlementStatus,
}

/// Request body for `POST /cash-movements`.
///
/// Net and tax amounts are not accepted; they are always derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovementRequest {
    /// The organization whose cash book holds the entry.
    pub organization_id: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Cash-book category.
    pub category: CashCategory,
    /// Movement date.
    pub date: NaiveDate,
    /// Gross amount, tax included.
    pub gross_amount: Decimal,
    /// Whether value-added tax is embedded in the gross amount.
    #[serde(default)]
    pub affects_tax: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl From<CashMovementRequest> for CashMovement {
    fn from(req: CashMovementRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: req.organization_id,
            movement_type: req.movement_type,
            category: req.category,
            date: req.date,
            gross_amount: req.gross_amount,
            affects_tax: req.affects_tax,
            net_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            description: req.description,
            created_at: Utc::now(),
        }
    }
}

/// Request body for `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Paying person.
    #[serde(default)]
    pub person_id: Option<String>,
    /// Subscription paid for.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Session paid for.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Sales document settled.
    #[serde(default)]
    pub document_id: Option<String>,
    /// What the payment settles.
    #[serde(rename = "type", default)]
    pub payment_type: PaymentType,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Payment date.
    pub date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// External reference.
    #[serde(default)]
    pub reference: String,
}

impl From<PaymentRequest> for Payment {
    fn from(req: PaymentRequest) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            person_id: req.person_id,
            subscription_id: req.subscription_id,
            session_id: req.session_id,
            document_id: req.document_id,
            payment_type: req.payment_type,
            method: req.method,
            date: req.date,
            amount: req.amount,
            reference: req.reference,
        }
    }
}

/// Query string for `GET /reports/cash-flow`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowQuery {
    /// The organization to summarize.
    pub organization: String,
}
