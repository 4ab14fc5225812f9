//! Monetary constants and rounding.
//!
//! All money is carried as [`Decimal`] and rounded to cents, half away from
//! zero, right after every multiplication or division. Rounded values are
//! rescaled to exactly two decimal places so `5000` is reported as `5000.00`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

/// Returns the share of gross instructor pay withheld for tax: 14.5%.
pub fn withholding_rate() -> Decimal {
    Decimal::new(145, 3)
}

/// Returns the value-added tax rate embedded in taxed cash movements: 19%.
pub fn vat_rate() -> Decimal {
    Decimal::new(19, 2)
}

/// Returns the per-attendee rate paid when no tariff applies.
pub fn default_session_rate() -> Decimal {
    Decimal::new(3743, 0)
}

/// Returns the largest amount a single payment may carry: ten digits, two
/// of them cents.
pub fn max_payment_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Returns the largest gross a single cash movement may carry: twelve
/// digits, two of them cents.
pub fn max_cash_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Adds up money amounts without overflowing.
///
/// # Errors
///
/// Returns `CalculationError` naming `what` if the running total leaves the
/// range of [`Decimal`].
pub fn checked_money_sum<I>(amounts: I, what: &str) -> EngineResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("{} overflows adding ${} to ${}", what, amount, total),
            })
    })
}

/// Rounds to cents using round-half-up and fixes the scale at 2.
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap()).to_string(), "0.13");
/// assert_eq!(round_money(Decimal::from_str("-0.125").unwrap()).to_string(), "-0.13");
/// assert_eq!(round_money(Decimal::from(5000)).to_string(), "5000.00");
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Clamps a money amount at zero and rounds it.
pub fn non_negative_money(value: Decimal) -> Decimal {
    round_money(value.max(Decimal::ZERO))
}
