//! Subscriptions and exchange agreements.
//!
//! A [`Subscription`] links a person to a [`Plan`](super::Plan) for a window
//! of time. Its active period ends on `end_date`, or on "today" while the
//! subscription is open-ended.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::max_payment_amount;
use crate::error::{EngineError, EngineResult};

use super::Period;
use super::organization::default_true;

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Currently running.
    #[default]
    Active,
    /// Temporarily paused.
    Frozen,
    /// Closed.
    Finished,
}

/// A person's enrollment in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for the subscription.
    pub id: String,
    /// The enrolled person.
    pub person_id: String,
    /// The plan being paid for.
    pub plan_id: String,
    /// Exchange agreements attached to this enrollment.
    #[serde(default)]
    pub agreement_ids: Vec<String>,
    /// First day of the subscription.
    pub start_date: NaiveDate,
    /// Last day of the subscription; `None` while open-ended.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Negotiated price replacing the plan price.
    #[serde(default)]
    pub negotiated_price: Option<Decimal>,
    /// Percentage discount (0-100). Takes precedence over `discount_amount`.
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// Fixed discount, used only when no percentage is set.
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Lifecycle state.
    #[serde(default)]
    pub status: SubscriptionStatus,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl Subscription {
    /// The last day counted for entitlement and usage.
    pub fn effective_end(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    /// The `[start_date, end_date_or_today]` window.
    ///
    /// # Example
    ///
    /// ```
    /// use academia_billing::models::{Subscription, SubscriptionStatus};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let subscription = Subscription {
    ///     id: "sub_001".to_string(),
    ///     person_id: "per_001".to_string(),
    ///     plan_id: "plan_2x".to_string(),
    ///     agreement_ids: vec![],
    ///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    ///     end_date: None,
    ///     negotiated_price: None,
    ///     discount_percentage: Decimal::ZERO,
    ///     discount_amount: Decimal::ZERO,
    ///     status: SubscriptionStatus::Active,
    ///     notes: String::new(),
    /// };
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    /// assert_eq!(subscription.active_period(today).end_date, today);
    /// ```
    pub fn active_period(&self, today: NaiveDate) -> Period {
        Period::new(self.start_date, self.effective_end(today))
    }

    /// Checks discount ranges and date ordering.
    ///
    /// Both discounts may be set at once; the balance calculator then uses
    /// the percentage.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(EngineError::validation(
                    "end_date",
                    format!(
                        "subscription '{}' ends ({}) before it starts ({})",
                        self.id, end_date, self.start_date
                    ),
                ));
            }
        }
        if self.discount_percentage.is_sign_negative()
            || self.discount_percentage > Decimal::ONE_HUNDRED
        {
            return Err(EngineError::validation(
                "discount_percentage",
                format!(
                    "subscription '{}' has a discount of {}%, expected 0-100",
                    self.id, self.discount_percentage
                ),
            ));
        }
        if self.discount_amount.is_sign_negative() {
            return Err(EngineError::validation(
                "discount_amount",
                format!("subscription '{}' has a negative discount", self.id),
            ));
        }
        if self.discount_amount > max_payment_amount() {
            return Err(EngineError::validation(
                "discount_amount",
                format!("subscription '{}' discount exceeds {}", self.id, max_payment_amount()),
            ));
        }
        if self.negotiated_price.is_some_and(|p| p.is_sign_negative()) {
            return Err(EngineError::validation(
                "negotiated_price",
                format!("subscription '{}' has a negative negotiated price", self.id),
            ));
        }
        if self.negotiated_price.is_some_and(|p| p > max_payment_amount()) {
            return Err(EngineError::validation(
                "negotiated_price",
                format!(
                    "subscription '{}' negotiated price exceeds {}",
                    self.id,
                    max_payment_amount()
                ),
            ));
        }
        Ok(())
    }
}

/// A barter or courtesy arrangement (convenio). Attendance linked to one does
/// not consume the student's quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeAgreement {
    /// Unique identifier for the agreement.
    pub id: String,
    /// The organization granting it.
    pub organization_id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Informational discount percentage.
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// First valid day.
    pub valid_from: NaiveDate,
    /// Last valid day, `None` if open-ended.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Whether the agreement is in force.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl ExchangeAgreement {
    /// Returns true if the agreement is active and `date` is inside its window.
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.valid_from <= date
            && self.valid_until.is_none_or(|until| until >= date)
    }
}
