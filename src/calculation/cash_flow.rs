//! Cash-flow entry normalization.
//!
//! Taxed movements carry value-added tax inside the gross amount. The net is
//! recovered by dividing by `1 + VAT` and the tax is whatever remains, so
//! `net + tax == gross` always holds after rounding.

use rust_decimal::Decimal;

use crate::models::CashMovement;

use super::money::{round_money, vat_rate};

/// The net and tax components of a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBreakdown {
    /// Amount without tax.
    pub net: Decimal,
    /// Tax embedded in the gross amount.
    pub tax: Decimal,
}

/// Splits `gross` into net and tax.
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::split_tax;
/// use rust_decimal::Decimal;
///
/// let split = split_tax(Decimal::new(119000, 0), true);
/// assert_eq!(split.net.to_string(), "100000.00");
/// assert_eq!(split.tax.to_string(), "19000.00");
///
/// let untaxed = split_tax(Decimal::new(5000, 0), false);
/// assert_eq!(untaxed.tax.to_string(), "0.00");
/// ```
pub fn split_tax(gross: Decimal, affects_tax: bool) -> TaxBreakdown {
    if affects_tax {
        let net = round_money(gross / (Decimal::ONE + vat_rate()));
        let tax = round_money(gross - net);
        TaxBreakdown { net, tax }
    } else {
        TaxBreakdown {
            net: round_money(gross),
            tax: round_money(Decimal::ZERO),
        }
    }
}

/// Recomputes a movement's derived `net_amount` and `tax_amount`.
///
/// Whatever the caller put in the derived fields is overwritten.
pub fn normalize(movement: &mut CashMovement) {
    let split = split_tax(movement.gross_amount, movement.affects_tax);
    movement.net_amount = split.net;
    movement.tax_amount = split.tax;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CashCategory, MovementType};
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_movement(gross: &str, affects_tax: bool) -> CashMovement {
        CashMovement {
            id: "mov_001".to_string(),
            organization_id: "org_estudio".to_string(),
            movement_type: MovementType::Income,
            category: CashCategory::Workshops,
            date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            gross_amount: dec(gross),
            affects_tax,
            net_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            description: "Taller de verano".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_taxed_movement_is_split() {
        let mut movement = create_test_movement("119000", true);
        normalize(&mut movement);
        assert_eq!(movement.tax_amount, dec("19000.00"));
        assert_eq!(movement.net_amount, dec("100000.00"));
    }

    #[test]
    fn test_untaxed_movement_keeps_gross() {
        let mut movement = create_test_movement("45000", false);
        normalize(&mut movement);
        assert_eq!(movement.net_amount, dec("45000.00"));
        assert_eq!(movement.tax_amount, Decimal::ZERO);
    }

    #[test]
    fn test_normalize_overwrites_caller_values() {
        let mut movement = create_test_movement("119000", true);
        movement.net_amount = dec("1");
        movement.tax_amount = dec("2");
        normalize(&mut movement);
        assert_eq!(movement.net_amount, dec("100000.00"));

        movement.affects_tax = false;
        normalize(&mut movement);
        assert_eq!(movement.net_amount, dec("119000.00"));
        assert_eq!(movement.tax_amount, Decimal::ZERO);
    }

    #[test]
    fn test_inexact_division_rounds_half_up() {
        // 1000 / 1.19 = 840.336... -> 840.34, tax 159.66
        let split = split_tax(dec("1000"), true);
        assert_eq!(split.net, dec("840.34"));
        assert_eq!(split.tax, dec("159.66"));
    }

    proptest! {
        #[test]
        fn prop_components_sum_to_gross(cents in 0i64..1_000_000_000, taxed in any::<bool>()) {
            let gross = Decimal::new(cents, 2);
            let split = split_tax(gross, taxed);
            prop_assert_eq!(split.net + split.tax, gross);
            prop_assert!(split.tax >= Decimal::ZERO);
        }
    }
}
