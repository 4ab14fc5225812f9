//! Subscription plans.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::max_payment_amount;
use crate::error::{EngineError, EngineResult};

use super::organization::default_true;

/// A priced plan with a weekly class quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique identifier for the plan.
    pub id: String,
    /// The organization selling the plan.
    pub organization_id: String,
    /// Plan name, unique within the organization.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// List price.
    pub price: Decimal,
    /// Nominal duration in days.
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
    /// Classes granted per started week.
    #[serde(default = "default_classes_per_week")]
    pub classes_per_week: u32,
    /// Whether the plan can still be sold.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_duration_days() -> u32 {
    30
}

fn default_classes_per_week() -> u32 {
    1
}

impl Plan {
    /// Checks that quota, duration and price are usable.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the weekly quota or duration is zero, or the
    /// price is negative or above the payment cap.
    pub fn validate(&self) -> EngineResult<()> {
        if self.classes_per_week == 0 {
            return Err(EngineError::validation(
                "classes_per_week",
                format!("plan '{}' must grant at least one class per week", self.id),
            ));
        }
        if self.duration_days == 0 {
            return Err(EngineError::validation(
                "duration_days",
                format!("plan '{}' must last at least one day", self.id),
            ));
        }
        if self.price.is_sign_negative() {
            return Err(EngineError::validation(
                "price",
                format!("plan '{}' cannot have a negative price", self.id),
            ));
        }
        if self.price > max_payment_amount() {
            return Err(EngineError::validation(
                "price",
                format!(
                    "plan '{}' price {} exceeds the maximum of {}",
                    self.id,
                    self.price,
                    max_payment_amount()
                ),
            ));
        }
        Ok(())
    }
}
