//! Class entitlement and usage.
//!
//! A subscription grants `classes_per_week` classes for every started week of
//! its active period. Usage counts the attendance of the subscription's
//! person inside that period, except attendance covered by an exchange
//! agreement.

use chrono::NaiveDate;

use crate::models::{AttendanceEntry, AuditStep, Period, Plan, Subscription};

/// The result of an entitlement calculation, including the audit steps.
#[derive(Debug, Clone)]
pub struct EntitlementResult {
    /// The window the figures were computed over.
    pub period: Period,
    /// Days in the window, at least 1.
    pub days: i64,
    /// Started weeks in the window, at least 1.
    pub weeks: u32,
    /// Classes granted for the window.
    pub classes_entitled: u32,
    /// Quota-consuming attendance in the window.
    pub classes_used: u32,
    /// `max(0, entitled - used)`.
    pub classes_available: u32,
    /// `max(0, used - entitled)`.
    pub classes_overconsumed: u32,
    /// The audit steps recording this calculation.
    pub audit_steps: Vec<AuditStep>,
}

/// Number of started weeks in `days` days, never less than 1.
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::weeks_in_period;
///
/// assert_eq!(weeks_in_period(1), 1);
/// assert_eq!(weeks_in_period(7), 1);
/// assert_eq!(weeks_in_period(8), 2);
/// assert_eq!(weeks_in_period(28), 4);
/// ```
pub fn weeks_in_period(days: i64) -> u32 {
    let weeks = (days.max(1) + 6) / 7;
    u32::try_from(weeks.max(1)).unwrap_or(u32::MAX)
}

/// Classes a plan grants over `days` days.
pub fn classes_for_days(plan: &Plan, days: i64) -> u32 {
    plan.classes_per_week.saturating_mul(weeks_in_period(days))
}

/// Classes the subscription grants over `[start_date, end_date_or_today]`.
pub fn classes_entitled(subscription: &Subscription, plan: &Plan, today: NaiveDate) -> u32 {
    classes_for_days(plan, subscription.active_period(today).days())
}

/// Counts the attendance that consumes the subscription's quota.
///
/// An entry counts when it belongs to the subscription's person, its session
/// date falls inside the active period, and no exchange agreement covers it.
/// Entries for other people are ignored, so callers may pass a wider set.
pub fn classes_used(
    subscription: &Subscription,
    attendance: &[AttendanceEntry],
    today: NaiveDate,
) -> u32 {
    let period = subscription.active_period(today);
    let used = attendance
        .iter()
        .filter(|entry| consumes_quota(entry, subscription, &period))
        .count();
    u32::try_from(used).unwrap_or(u32::MAX)
}

fn consumes_quota(entry: &AttendanceEntry, subscription: &Subscription, period: &Period) -> bool {
    entry.attendance.person_id == subscription.person_id
        && period.contains_date(entry.session_date)
        && !entry.attendance.is_agreement_covered()
}

/// Computes entitlement, usage, remaining classes and over-consumption.
///
/// At most one of `classes_available` and `classes_overconsumed` is non-zero.
///
/// # Arguments
///
/// * `subscription` - The subscription being measured
/// * `plan` - The subscription's plan
/// * `attendance` - Attendance of the subscription's person
/// * `today` - Substituted for a missing end date
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::calculate_entitlement;
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
///     end_date: Some(NaiveDate::from_ymd_opt(2025, 1, 28).unwrap()),
///     negotiated_price: None,
///     discount_percentage: Decimal::ZERO,
///     discount_amount: Decimal::ZERO,
///     status: SubscriptionStatus::Active,
///     notes: String::new(),
/// };
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
/// let result = calculate_entitlement(&subscription, &plan, &[], today, 1);
/// assert_eq!(result.classes_entitled, 8);
/// assert_eq!(result.classes_available, 8);
/// ```
pub fn calculate_entitlement(
    subscription: &Subscription,
    plan: &Plan,
    attendance: &[AttendanceEntry],
    today: NaiveDate,
    step_number: u32,
) -> EntitlementResult {
    let period = subscription.active_period(today);
    let days = period.days();
    let weeks = weeks_in_period(days);
    let entitled = classes_for_days(plan, days);

    let used = classes_used(subscription, attendance, today);
    let agreement_covered = attendance
        .iter()
        .filter(|entry| {
            entry.attendance.person_id == subscription.person_id
                && period.contains_date(entry.session_date)
                && entry.attendance.is_agreement_covered()
        })
        .count();

    let available = entitled.saturating_sub(used);
    let overconsumed = used.saturating_sub(entitled);

    let end_source = if subscription.end_date.is_some() {
        "end_date"
    } else {
        "today"
    };

    let entitled_step = AuditStep {
        step_number,
        rule_id: "classes_entitled".to_string(),
        rule_name: "Classes Entitled".to_string(),
        input: serde_json::json!({
            "subscription_id": subscription.id,
            "start_date": period.start_date.to_string(),
            "end_date": period.end_date.to_string(),
            "end_source": end_source,
            "classes_per_week": plan.classes_per_week
        }),
        output: serde_json::json!({
            "days": days,
            "weeks": weeks,
            "classes_entitled": entitled
        }),
        reasoning: format!(
            "{} days ({} to {}) = {} started weeks x {} classes/week = {} classes",
            days, period.start_date, period.end_date, weeks, plan.classes_per_week, entitled
        ),
    };

    let used_step = AuditStep {
        step_number: step_number + 1,
        rule_id: "classes_used".to_string(),
        rule_name: "Classes Used".to_string(),
        input: serde_json::json!({
            "person_id": subscription.person_id,
            "start_date": period.start_date.to_string(),
            "end_date": period.end_date.to_string()
        }),
        output: serde_json::json!({
            "classes_used": used,
            "agreement_covered": agreement_covered,
            "classes_available": available,
            "classes_overconsumed": overconsumed
        }),
        reasoning: format!(
            "{} attendances counted, {} covered by exchange agreements excluded; {} available, {} over quota",
            used, agreement_covered, available, overconsumed
        ),
    };

    EntitlementResult {
        period,
        days,
        weeks,
        classes_entitled: entitled,
        classes_used: used,
        classes_available: available,
        classes_overconsumed: overconsumed,
        audit_steps: vec![entitled_step, used_step],
    }
}
