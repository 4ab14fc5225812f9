//! Instructor tariffs and settlements.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::Period;
use super::organization::default_true;

/// A per-attendee pay rate (tarifa) for instructors.
///
/// A rate without a discipline is the organization's general rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRate {
    /// Unique identifier for the rate.
    pub id: String,
    /// The organization paying the rate.
    pub organization_id: String,
    /// Discipline the rate is specific to; `None` for the general rate.
    #[serde(default)]
    pub discipline_id: Option<String>,
    /// Amount paid per attendee.
    pub amount_per_session: Decimal,
    /// First day the rate applies.
    pub valid_from: NaiveDate,
    /// Last day the rate applies, `None` if open-ended.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Whether the rate is enabled.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl InstructorRate {
    /// Returns true if the rate is active and its window covers `date`.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.valid_from <= date
            && self.valid_until.is_none_or(|until| until >= date)
    }

    /// Returns true for a general (discipline-less) rate.
    pub fn is_general(&self) -> bool {
        self.discipline_id.is_none()
    }
}

/// Lifecycle state of a settlement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    /// Being prepared; totals may still be recomputed.
    #[default]
    Draft,
    /// Sent to the instructor.
    Issued,
    /// Paid out.
    Paid,
}

impl SettlementStatus {
    /// The lowercase name used in payloads and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Draft => "draft",
            SettlementStatus::Issued => "issued",
            SettlementStatus::Paid => "paid",
        }
    }
}

/// An instructor pay statement (liquidación) for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorSettlement {
    /// Unique identifier for the settlement.
    pub id: String,
    /// The paying organization.
    pub organization_id: String,
    /// The instructor being paid.
    pub instructor_id: String,
    /// First day of the liquidation window.
    pub period_start: NaiveDate,
    /// Last day of the liquidation window (inclusive).
    pub period_end: NaiveDate,
    /// Sessions covered by the computed totals.
    #[serde(default)]
    pub session_ids: Vec<String>,
    /// Gross pay.
    #[serde(default)]
    pub gross_amount: Decimal,
    /// Tax withheld from the gross.
    #[serde(default)]
    pub withholding_amount: Decimal,
    /// Amount paid out.
    #[serde(default)]
    pub net_amount: Decimal,
    /// Lifecycle state.
    #[serde(default)]
    pub status: SettlementStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// When the settlement was created.
    pub created_at: DateTime<Utc>,
}

impl InstructorSettlement {
    /// The liquidation window.
    pub fn period(&self) -> Period {
        Period::new(self.period_start, self.period_end)
    }

    /// Checks that the window is not inverted.
    pub fn validate(&self) -> EngineResult<()> {
        if self.period_end < self.period_start {
            return Err(EngineError::validation(
                "period_end",
                format!(
                    "settlement period ends ({}) before it starts ({})",
                    self.period_end, self.period_start
                ),
            ));
        }
        Ok(())
    }

    /// Moves the settlement forward in its lifecycle.
    ///
    /// Statuses only move forward (draft, issued, paid); skipping straight
    /// from draft to paid is allowed. Re-applying the current status is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when asked to move backwards.
    pub fn transition_to(&mut self, status: SettlementStatus) -> EngineResult<()> {
        if status < self.status {
            return Err(EngineError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: status.as_str().to_string(),
            });
        }
        self.status = status;
        Ok(())
    }
}
