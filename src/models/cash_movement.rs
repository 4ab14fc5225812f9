//! Cash-book entries.
//!
//! `net_amount` and `tax_amount` are derived fields. The store recomputes
//! them from `gross_amount` and `affects_tax` on every write, so whatever a
//! caller puts there is overwritten.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::max_cash_amount;
use crate::error::{EngineError, EngineResult};

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Money in.
    Income,
    /// Money out.
    Expense,
}

/// Cash-book category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCategory {
    /// Workshops and classes.
    Workshops,
    /// Rent.
    Rent,
    /// Supplies.
    Supplies,
    /// Professional fees.
    Fees,
    /// Utilities and services.
    Services,
    /// Anything else.
    Other,
}

/// An organization-scoped ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashMovement {
    /// Unique identifier for the movement.
    pub id: String,
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
    /// Gross amount without tax. Derived.
    #[serde(default)]
    pub net_amount: Decimal,
    /// Tax embedded in the gross amount. Derived.
    #[serde(default)]
    pub tax_amount: Decimal,
    /// Free-form description (glosa).
    #[serde(default)]
    pub description: String,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl CashMovement {
    /// The (year, month) bucket this movement is reported under.
    pub fn month(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }

    /// Rejects negative gross amounts and amounts wider than twelve digits.
    pub fn validate(&self) -> EngineResult<()> {
        if self.gross_amount.is_sign_negative() && !self.gross_amount.is_zero() {
            return Err(EngineError::validation(
                "gross_amount",
                format!("gross amount must not be negative, got {}", self.gross_amount),
            ));
        }
        if self.gross_amount > max_cash_amount() {
            return Err(EngineError::validation(
                "gross_amount",
                format!(
                    "gross amount {} exceeds the maximum of {}",
                    self.gross_amount,
                    max_cash_amount()
                ),
            ));
        }
        Ok(())
    }
}
