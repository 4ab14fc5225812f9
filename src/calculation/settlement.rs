//! Instructor settlement (liquidation) totals.
//!
//! An instructor is paid per attendee: every attendance row at a session they
//! taught inside the settlement window counts once. The per-attendee rate is
//! resolved once, from the earliest counted session.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceEntry, AuditStep, AuditTrace, AuditWarning, InstructorRate, InstructorSettlement};

use super::money::{round_money, withholding_rate};
use super::tariff::{RateSource, resolve_tariff};

/// Warning code recorded when attendance was paid at the default rate.
pub const DEFAULT_RATE_WARNING: &str = "DEFAULT_RATE_APPLIED";

/// Computed settlement figures. The caller decides whether to persist them.
#[derive(Debug, Clone)]
pub struct SettlementTotals {
    /// Number of attendance rows paid.
    pub attendance_count: u32,
    /// Distinct sessions behind the counted attendance, oldest first.
    pub session_ids: Vec<String>,
    /// Per-attendee rate.
    pub rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
    /// `round2(rate * attendance_count)`.
    pub gross: Decimal,
    /// `round2(gross * 0.145)`.
    pub withholding: Decimal,
    /// `round2(gross - withholding)`.
    pub net: Decimal,
    /// The audit trace recording this calculation.
    pub audit_trace: AuditTrace,
}

/// Picks the attendance a settlement pays for, oldest session first.
///
/// An entry qualifies when the settlement's instructor is the session's
/// primary instructor, the session date is inside
/// `[period_start, period_end]`, and the session's discipline belongs to the
/// settlement's organization. Ties on date are broken by registration time.
pub fn select_attendance<'a>(
    settlement: &InstructorSettlement,
    entries: &'a [AttendanceEntry],
) -> Vec<&'a AttendanceEntry> {
    let period = settlement.period();
    let mut selected: Vec<&AttendanceEntry> = entries
        .iter()
        .filter(|entry| {
            entry.instructor_id.as_deref() == Some(settlement.instructor_id.as_str())
                && period.contains_date(entry.session_date)
                && entry.organization_id == settlement.organization_id
        })
        .collect();
    selected.sort_by(|a, b| {
        a.session_date
            .cmp(&b.session_date)
            .then(a.attendance.registered_at.cmp(&b.attendance.registered_at))
            .then(a.attendance.id.cmp(&b.attendance.id))
    });
    selected
}

/// Computes the gross, withholding and net pay for a settlement.
///
/// The settlement itself is not modified.
///
/// # Errors
///
/// Returns `CalculationError` if the gross amount overflows or the attendance
/// count does not fit in a `u32`.
///
/// # Arguments
///
/// * `settlement` - The settlement whose window and instructor are used
/// * `entries` - Candidate attendance; non-qualifying entries are ignored
/// * `rates` - The organization's tariffs
/// * `default_rate` - Used when there is no attendance or no tariff applies
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::compute_settlement_totals;
/// use academia_billing::models::{InstructorSettlement, SettlementStatus};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let settlement = InstructorSettlement {
///     id: "liq_001".to_string(),
///     organization_id: "org_estudio".to_string(),
///     instructor_id: "per_profe".to_string(),
///     period_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     period_end: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
///     session_ids: vec![],
///     gross_amount: Decimal::ZERO,
///     withholding_amount: Decimal::ZERO,
///     net_amount: Decimal::ZERO,
///     status: SettlementStatus::Draft,
///     notes: String::new(),
///     created_at: Utc::now(),
/// };
///
/// let totals = compute_settlement_totals(&settlement, &[], &[], Decimal::new(3743, 0)).unwrap();
/// assert_eq!(totals.attendance_count, 0);
/// assert_eq!(totals.gross, Decimal::ZERO);
/// ```
pub fn compute_settlement_totals(
    settlement: &InstructorSettlement,
    entries: &[AttendanceEntry],
    rates: &[InstructorRate],
    default_rate: Decimal,
) -> EngineResult<SettlementTotals> {
    let mut trace = AuditTrace::default();
    let selected = select_attendance(settlement, entries);
    let attendance_count =
        u32::try_from(selected.len()).map_err(|_| EngineError::CalculationError {
            message: format!("{} attendances exceed the countable range", selected.len()),
        })?;

    let mut session_ids: Vec<String> = Vec::new();
    for entry in &selected {
        if !session_ids.contains(&entry.attendance.session_id) {
            session_ids.push(entry.attendance.session_id.clone());
        }
    }

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "settlement_attendance".to_string(),
        rule_name: "Settlement Attendance".to_string(),
        input: serde_json::json!({
            "instructor_id": settlement.instructor_id,
            "organization_id": settlement.organization_id,
            "period_start": settlement.period_start.to_string(),
            "period_end": settlement.period_end.to_string(),
            "candidates": entries.len()
        }),
        output: serde_json::json!({
            "attendance_count": attendance_count,
            "sessions": session_ids
        }),
        reasoning: format!(
            "{} attendances across {} sessions taught between {} and {}",
            attendance_count,
            session_ids.len(),
            settlement.period_start,
            settlement.period_end
        ),
    });

    let (rate, rate_source) = match selected.first() {
        Some(earliest) => {
            let resolution = resolve_tariff(
                rates,
                &settlement.organization_id,
                Some(earliest.discipline_id.as_str()),
                earliest.session_date,
                default_rate,
                trace.next_step_number(),
            );
            trace.steps.push(resolution.audit_step);
            (resolution.rate, resolution.source)
        }
        None => (default_rate, RateSource::Default),
    };

    if attendance_count > 0 && rate_source == RateSource::Default {
        trace.warnings.push(AuditWarning::new(
            DEFAULT_RATE_WARNING,
            format!(
                "No tariff configured for this period; paid at the default rate of ${}",
                rate
            ),
            "medium",
        ));
    }

    let gross = rate
        .checked_mul(Decimal::from(attendance_count))
        .map(round_money)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "gross pay overflows for {} attendances at ${}",
                attendance_count, rate
            ),
        })?;
    let withholding = round_money(gross * withholding_rate());
    let net = round_money(gross - withholding);

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "gross_pay".to_string(),
        rule_name: "Gross Pay".to_string(),
        input: serde_json::json!({
            "rate": rate.to_string(),
            "attendance_count": attendance_count
        }),
        output: serde_json::json!({
            "gross": gross.to_string()
        }),
        reasoning: format!("${} x {} attendances = ${}", rate, attendance_count, gross),
    });

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "withholding".to_string(),
        rule_name: "Instructor Withholding".to_string(),
        input: serde_json::json!({
            "gross": gross.to_string(),
            "withholding_rate": withholding_rate().to_string()
        }),
        output: serde_json::json!({
            "withholding": withholding.to_string(),
            "net": net.to_string()
        }),
        reasoning: format!(
            "${} x {} = ${} withheld; ${} net",
            gross,
            withholding_rate(),
            withholding,
            net
        ),
    });

    Ok(SettlementTotals {
        attendance_count,
        session_ids,
        rate,
        rate_source,
        gross,
        withholding,
        net,
        audit_trace: trace,
    })
}
