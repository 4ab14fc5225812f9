//! Subscription target amount and outstanding balance.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, Payment, Plan, Subscription};

use super::money::{checked_money_sum, non_negative_money, round_money};

/// The result of a balance calculation, including the audit steps.
#[derive(Debug, Clone)]
pub struct BalanceResult {
    /// Negotiated price, or the plan price.
    pub base_amount: Decimal,
    /// Discount taken off the base amount.
    pub discount: Decimal,
    /// What the subscription should cost, never negative.
    pub target_amount: Decimal,
    /// Sum of the payments counted towards the subscription.
    pub amount_paid: Decimal,
    /// `max(0, target - paid)`.
    pub outstanding_balance: Decimal,
    /// Ids of the payments that were summed.
    pub counted_payment_ids: Vec<String>,
    /// The audit steps recording this calculation.
    pub audit_steps: Vec<AuditStep>,
}

/// The price the discount applies to: the negotiated price when present,
/// otherwise the plan price.
pub fn base_amount(subscription: &Subscription, plan: &Plan) -> Decimal {
    subscription.negotiated_price.unwrap_or(plan.price)
}

/// The discount on `base`.
///
/// A non-zero percentage wins; the fixed amount is only used when the
/// percentage is zero.
pub fn discount_for(subscription: &Subscription, base: Decimal) -> Decimal {
    if !subscription.discount_percentage.is_zero() {
        round_money(base * subscription.discount_percentage / Decimal::ONE_HUNDRED)
    } else {
        round_money(subscription.discount_amount)
    }
}

/// What the subscription should cost after discounts, floored at zero.
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::target_amount;
/// use academia_billing::models::{Plan, Subscription, SubscriptionStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let plan = Plan {
///     id: "plan_2x".to_string(),
///     organization_id: "org_estudio".to_string(),
///     name: "Plan 2 clases".to_string(),
///     description: String::new(),
///     price: Decimal::new(50000, 0),
///     duration_days: 30,
///     classes_per_week: 2,
///     active: true,
/// };
/// let subscription = Subscription {
///     id: "sub_001".to_string(),
///     person_id: "per_001".to_string(),
///     plan_id: "plan_2x".to_string(),
///     agreement_ids: vec![],
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     end_date: None,
///     negotiated_price: None,
///     discount_percentage: Decimal::new(10, 0),
///     discount_amount: Decimal::ZERO,
///     status: SubscriptionStatus::Active,
///     notes: String::new(),
/// };
///
/// assert_eq!(target_amount(&subscription, &plan), Decimal::new(45000, 0));
/// ```
pub fn target_amount(subscription: &Subscription, plan: &Plan) -> Decimal {
    let base = base_amount(subscription, plan);
    non_negative_money(base - discount_for(subscription, base))
}

/// Sums the payments that settle a subscription.
///
/// `payments` is the union of the payments linked to the subscription's
/// person, to the subscription itself, and to sales documents of the
/// subscription. Duplicates (the same payment reached through more than one
/// link) are counted once and class payments are skipped.
///
/// # Errors
///
/// Returns `CalculationError` if the total overflows.
pub fn amount_paid(payments: &[Payment]) -> EngineResult<Decimal> {
    checked_money_sum(counted_payments(payments).map(|p| p.amount), "amount paid")
        .map(round_money)
}

fn counted_payments(payments: &[Payment]) -> impl Iterator<Item = &Payment> {
    let mut seen = HashSet::new();
    payments
        .iter()
        .filter(move |p| seen.insert(p.id.as_str()))
        .filter(|p| p.counts_towards_subscription())
}

/// `max(0, target - paid)`.
pub fn outstanding_balance(target: Decimal, paid: Decimal) -> Decimal {
    non_negative_money(target - paid)
}

/// Computes the target amount, payments and outstanding balance.
///
/// # Arguments
///
/// * `subscription` - The subscription being billed
/// * `plan` - The subscription's plan
/// * `payments` - The union of payments linked to the subscription
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns `CalculationError` if the counted payments overflow when summed.
pub fn calculate_balance(
    subscription: &Subscription,
    plan: &Plan,
    payments: &[Payment],
    step_number: u32,
) -> EngineResult<BalanceResult> {
    let base = base_amount(subscription, plan);
    let discount = discount_for(subscription, base);
    let target = non_negative_money(base - discount);

    let counted: Vec<&Payment> = counted_payments(payments).collect();
    let paid = round_money(checked_money_sum(
        counted.iter().map(|p| p.amount),
        "amount paid",
    )?);
    let outstanding = outstanding_balance(target, paid);

    let (base_source, discount_kind) = (
        if subscription.negotiated_price.is_some() {
            "negotiated_price"
        } else {
            "plan_price"
        },
        if !subscription.discount_percentage.is_zero() {
            "percentage"
        } else if !subscription.discount_amount.is_zero() {
            "amount"
        } else {
            "none"
        },
    );

    let target_step = AuditStep {
        step_number,
        rule_id: "target_amount".to_string(),
        rule_name: "Target Amount".to_string(),
        input: serde_json::json!({
            "subscription_id": subscription.id,
            "base_amount": base.to_string(),
            "base_source": base_source,
            "discount_percentage": subscription.discount_percentage.to_string(),
            "discount_amount": subscription.discount_amount.to_string()
        }),
        output: serde_json::json!({
            "discount": discount.to_string(),
            "discount_kind": discount_kind,
            "target_amount": target.to_string()
        }),
        reasoning: format!(
            "${} ({}) - ${} discount ({}) = ${}",
            base, base_source, discount, discount_kind, target
        ),
    };

    let skipped = payments.len() - counted.len();
    let counted_payment_ids: Vec<String> = counted.iter().map(|p| p.id.clone()).collect();

    let balance_step = AuditStep {
        step_number: step_number + 1,
        rule_id: "outstanding_balance".to_string(),
        rule_name: "Outstanding Balance".to_string(),
        input: serde_json::json!({
            "target_amount": target.to_string(),
            "payments": counted_payment_ids,
            "payments_skipped": skipped
        }),
        output: serde_json::json!({
            "amount_paid": paid.to_string(),
            "outstanding_balance": outstanding.to_string()
        }),
        reasoning: format!(
            "${} target - ${} paid across {} payments = ${} outstanding",
            target,
            paid,
            counted.len(),
            outstanding
        ),
    };

    Ok(BalanceResult {
        base_amount: base,
        discount,
        target_amount: target,
        amount_paid: paid,
        outstanding_balance: outstanding,
        counted_payment_ids,
        audit_steps: vec![target_step, balance_step],
    })
}
