//! Payments and sales documents.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a payment settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Pays towards a subscription.
    #[default]
    Subscription,
    /// Pays a single drop-in class. Never counted against a subscription.
    Class,
    /// Anything else.
    Other,
}

/// How the money arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Bank transfer.
    Transfer,
    /// Card.
    Card,
}

/// A recorded payment.
///
/// # Example
///
/// ```
/// use academia_billing::models::{Payment, PaymentMethod, PaymentType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let payment = Payment {
///     id: "pay_001".to_string(),
///     person_id: Some("per_001".to_string()),
///     subscription_id: None,
///     session_id: None,
///     document_id: None,
///     payment_type: PaymentType::Subscription,
///     method: PaymentMethod::Transfer,
///     date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
///     amount: Decimal::new(20000, 0),
///     reference: String::new(),
/// };
/// assert!(payment.counts_towards_subscription());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier for the payment.
    pub id: String,
    /// Paying person.
    #[serde(default)]
    pub person_id: Option<String>,
    /// Subscription paid for.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Session paid for (drop-in classes).
    #[serde(default)]
    pub session_id: Option<String>,
    /// Sales document the payment settles.
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
    /// External reference (transfer id, receipt number).
    #[serde(default)]
    pub reference: String,
}

impl Payment {
    /// Class payments settle per-session fees, everything else can settle a
    /// subscription.
    pub fn counts_towards_subscription(&self) -> bool {
        self.payment_type != PaymentType::Class
    }
}

/// Lifecycle state of a sales document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Not yet issued.
    #[default]
    Draft,
    /// Issued to the customer.
    Issued,
    /// Fully paid.
    Paid,
    /// Voided.
    Void,
}

/// An invoice or receipt, optionally tied to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesDocument {
    /// Unique identifier for the document.
    pub id: String,
    /// Issuing organization.
    pub organization_id: String,
    /// Subscription invoiced, if any.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Document number, unique within the organization.
    pub number: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Invoiced total.
    pub total_amount: Decimal,
    /// Lifecycle state.
    #[serde(default)]
    pub status: DocumentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_payment_with_type_field() {
        let json = r#"{
            "id": "pay_002",
            "person_id": "per_001",
            "type": "class",
            "method": "cash",
            "date": "2025-01-10",
            "amount": "5000"
        }"#;
        let payment: Payment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.payment_type, PaymentType::Class);
        assert_eq!(payment.method, PaymentMethod::Cash);
        assert!(!payment.counts_towards_subscription());
    }

    #[test]
    fn test_payment_type_defaults_to_subscription() {
        let json = r#"{
            "id": "pay_003",
            "method": "card",
            "date": "2025-01-10",
            "amount": "10000.50"
        }"#;
        let payment: Payment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.payment_type, PaymentType::Subscription);
        assert_eq!(payment.amount, Decimal::new(1000050, 2));
    }
}
