//! Calculation logic for the billing core.
//!
//! This module contains the pure calculators: money rounding, class
//! entitlement and usage, subscription balances, instructor tariff lookup,
//! settlement totals, cash-flow normalization, and the aggregate reports.
//! None of them touch storage or read the clock; callers pass "today" in.

mod balance;
mod cash_flow;
mod entitlement;
mod money;
mod reporting;
mod settlement;
mod tariff;

pub use balance::{
    BalanceResult, amount_paid, base_amount, calculate_balance, discount_for,
    outstanding_balance, target_amount,
};
pub use cash_flow::{TaxBreakdown, normalize, split_tax};
pub use entitlement::{
    EntitlementResult, calculate_entitlement, classes_entitled, classes_for_days, classes_used,
    weeks_in_period,
};
pub use money::{
    checked_money_sum, default_session_rate, max_cash_amount, max_payment_amount,
    non_negative_money, round_money, vat_rate, withholding_rate,
};
pub use reporting::{
    ActivitySummary, DelinquentSubscription, MonthlyCashSummary, cash_totals, delinquents,
    monthly_cash_summary,
};
pub use settlement::{
    DEFAULT_RATE_WARNING, SettlementTotals, compute_settlement_totals, select_attendance,
};
pub use tariff::{RateSource, TariffResolution, resolve_rate, resolve_tariff};
