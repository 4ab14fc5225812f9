//! Aggregate reports over balances and the cash book.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{CashMovement, MovementType};

use super::money::{checked_money_sum, round_money};

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCashSummary {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Sum of gross income.
    pub income: Decimal,
    /// Sum of gross expenses.
    pub expense: Decimal,
    /// `income - expense`.
    pub balance: Decimal,
}

/// A subscription that still owes money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelinquentSubscription {
    /// The subscription.
    pub subscription_id: String,
    /// The student.
    pub person_id: String,
    /// The student's display name.
    pub person_name: String,
    /// The plan's name.
    pub plan_name: String,
    /// Outstanding balance, always positive.
    pub outstanding_balance: Decimal,
}

/// Global activity counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Number of class sessions.
    pub total_sessions: usize,
    /// Number of attendance rows.
    pub total_attendance: usize,
    /// Sum of gross income across all cash movements.
    pub total_income: Decimal,
    /// Sum of gross expenses across all cash movements.
    pub total_expense: Decimal,
}

/// Groups movements by (year, month), oldest month first.
///
/// Amounts are summed on the gross, tax included.
///
/// # Errors
///
/// Returns `CalculationError` if a month's totals overflow.
pub fn monthly_cash_summary(movements: &[CashMovement]) -> EngineResult<Vec<MonthlyCashSummary>> {
    let mut months: BTreeMap<(i32, u32), Vec<&CashMovement>> = BTreeMap::new();
    for movement in movements {
        months.entry(movement.month()).or_default().push(movement);
    }

    months
        .into_iter()
        .map(|((year, month), entries)| {
            let (income, expense) = split_totals(entries.into_iter())?;
            let balance = income
                .checked_sub(expense)
                .ok_or_else(|| EngineError::CalculationError {
                    message: format!("cash balance for {}-{:02} overflows", year, month),
                })?;
            Ok(MonthlyCashSummary {
                year,
                month,
                income: round_money(income),
                expense: round_money(expense),
                balance: round_money(balance),
            })
        })
        .collect()
}

/// Sums gross income and expense across movements.
///
/// # Errors
///
/// Returns `CalculationError` if either total overflows.
pub fn cash_totals(movements: &[CashMovement]) -> EngineResult<(Decimal, Decimal)> {
    let (income, expense) = split_totals(movements.iter())?;
    Ok((round_money(income), round_money(expense)))
}

fn split_totals<'a, I>(movements: I) -> EngineResult<(Decimal, Decimal)>
where
    I: Iterator<Item = &'a CashMovement> + Clone,
{
    let gross_of = |kind: MovementType| {
        movements
            .clone()
            .filter(move |m| m.movement_type == kind)
            .map(|m| m.gross_amount)
    };
    let income = checked_money_sum(gross_of(MovementType::Income), "cash income")?;
    let expense = checked_money_sum(gross_of(MovementType::Expense), "cash expense")?;
    Ok((income, expense))
}

/// Keeps only positive balances, largest debt first.
///
/// Ties keep subscription id order so the report is stable.
pub fn delinquents(mut candidates: Vec<DelinquentSubscription>) -> Vec<DelinquentSubscription> {
    candidates.retain(|c| c.outstanding_balance > Decimal::ZERO);
    candidates.sort_by(|a, b| {
        b.outstanding_balance
            .cmp(&a.outstanding_balance)
            .then_with(|| a.subscription_id.cmp(&b.subscription_id))
    });
    candidates
}
