//! Instructor tariff resolution.
//!
//! This module picks the per-attendee rate that applies to a discipline on a
//! date, falling back to the organization's general rate and then to the
//! default session rate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, InstructorRate};

/// Where a resolved rate came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateSource {
    /// A configured tariff.
    Configured {
        /// The tariff's id.
        rate_id: String,
        /// Its discipline, `None` for a general rate.
        discipline_id: Option<String>,
    },
    /// No tariff applied; the default session rate was used.
    Default,
}

/// The result of resolving a tariff, including the audit step.
#[derive(Debug, Clone)]
pub struct TariffResolution {
    /// The rate paid per attendee.
    pub rate: Decimal,
    /// Where the rate came from.
    pub source: RateSource,
    /// The audit step recording this lookup.
    pub audit_step: AuditStep,
}

/// Finds the tariff for `discipline_id` on `date`.
///
/// Candidates are active rates of the organization whose window covers
/// `date`. With a discipline, rates for that discipline and general rates
/// compete; without one, only general rates qualify. The latest `valid_from`
/// wins. On a tie a discipline rate beats a general one, and after that the
/// rate listed last wins.
///
/// Returns `None` when nothing matches.
///
/// # Examples
///
/// ```
/// use academia_billing::calculation::resolve_rate;
/// use academia_billing::models::InstructorRate;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let general = InstructorRate {
///     id: "tar_general".to_string(),
///     organization_id: "org_estudio".to_string(),
///     discipline_id: None,
///     amount_per_session: Decimal::new(5000, 0),
///     valid_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     valid_until: None,
///     active: true,
/// };
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let rates = [general];
/// let found = resolve_rate(&rates, "org_estudio", Some("disc_yoga"), date).unwrap();
/// assert_eq!(found.id, "tar_general");
/// ```
pub fn resolve_rate<'a>(
    rates: &'a [InstructorRate],
    organization_id: &str,
    discipline_id: Option<&str>,
    date: NaiveDate,
) -> Option<&'a InstructorRate> {
    rates
        .iter()
        .filter(|rate| rate.organization_id == organization_id && rate.is_effective_on(date))
        .filter(|rate| match (discipline_id, rate.discipline_id.as_deref()) {
            (_, None) => true,
            (Some(wanted), Some(own)) => wanted == own,
            (None, Some(_)) => false,
        })
        .max_by_key(|rate| (rate.valid_from, !rate.is_general()))
}

/// Resolves a tariff, substituting `default_rate` when none matches.
pub fn resolve_tariff(
    rates: &[InstructorRate],
    organization_id: &str,
    discipline_id: Option<&str>,
    date: NaiveDate,
    default_rate: Decimal,
    step_number: u32,
) -> TariffResolution {
    let input = serde_json::json!({
        "organization_id": organization_id,
        "discipline_id": discipline_id,
        "date": date.to_string(),
        "candidates": rates.len()
    });

    match resolve_rate(rates, organization_id, discipline_id, date) {
        Some(rate) => {
            let scope = match &rate.discipline_id {
                Some(discipline) => format!("discipline '{}'", discipline),
                None => "general".to_string(),
            };
            let audit_step = AuditStep {
                step_number,
                rule_id: "tariff_lookup".to_string(),
                rule_name: "Tariff Lookup".to_string(),
                input,
                output: serde_json::json!({
                    "rate": rate.amount_per_session.to_string(),
                    "source": "configured",
                    "rate_id": rate.id,
                    "valid_from": rate.valid_from.to_string()
                }),
                reasoning: format!(
                    "Using {} tariff '{}' effective {}: ${} per attendee",
                    scope, rate.id, rate.valid_from, rate.amount_per_session
                ),
            };
            TariffResolution {
                rate: rate.amount_per_session,
                source: RateSource::Configured {
                    rate_id: rate.id.clone(),
                    discipline_id: rate.discipline_id.clone(),
                },
                audit_step,
            }
        }
        None => {
            let audit_step = AuditStep {
                step_number,
                rule_id: "tariff_lookup".to_string(),
                rule_name: "Tariff Lookup".to_string(),
                input,
                output: serde_json::json!({
                    "rate": default_rate.to_string(),
                    "source": "default"
                }),
                reasoning: format!(
                    "No active tariff on {} - using default rate ${} per attendee",
                    date, default_rate
                ),
            };
            TariffResolution {
                rate: default_rate,
                source: RateSource::Default,
                audit_step,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rate(
        id: &str,
        discipline: Option<&str>,
        amount: &str,
        from: NaiveDate,
        until: Option<NaiveDate>,
    ) -> InstructorRate {
        InstructorRate {
            id: id.to_string(),
            organization_id: "org_estudio".to_string(),
            discipline_id: discipline.map(str::to_string),
            amount_per_session: dec(amount),
            valid_from: from,
            valid_until: until,
            active: true,
        }
    }

    #[test]
    fn test_discipline_rate_wins_over_older_general() {
        let rates = vec![
            rate("tar_general", None, "3743", date(2024, 1, 1), None),
            rate("tar_yoga", Some("disc_yoga"), "6000", date(2025, 1, 1), None),
        ];
        let found = resolve_rate(&rates, "org_estudio", Some("disc_yoga"), date(2025, 2, 1));
        assert_eq!(found.unwrap().id, "tar_yoga");
    }

    #[test]
    fn test_newer_general_wins_over_older_discipline() {
        let rates = vec![
            rate("tar_yoga", Some("disc_yoga"), "6000", date(2024, 1, 1), None),
            rate("tar_general", None, "5000", date(2025, 1, 1), None),
        ];
        let found = resolve_rate(&rates, "org_estudio", Some("disc_yoga"), date(2025, 2, 1));
        assert_eq!(found.unwrap().id, "tar_general");
    }

    #[test]
    fn test_discipline_wins_tie_on_valid_from() {
        let rates = vec![
            rate("tar_yoga", Some("disc_yoga"), "6000", date(2025, 1, 1), None),
            rate("tar_general", None, "5000", date(2025, 1, 1), None),
        ];
        let found = resolve_rate(&rates, "org_estudio", Some("disc_yoga"), date(2025, 2, 1));
        assert_eq!(found.unwrap().id, "tar_yoga");
    }

    #[test]
    fn test_without_discipline_only_general_rates_qualify() {
        let rates = vec![rate("tar_yoga", Some("disc_yoga"), "6000", date(2025, 1, 1), None)];
        assert!(resolve_rate(&rates, "org_estudio", None, date(2025, 2, 1)).is_none());
    }

    #[test]
    fn test_other_discipline_rates_are_ignored() {
        let rates = vec![
            rate("tar_pilates", Some("disc_pilates"), "7000", date(2025, 1, 1), None),
            rate("tar_general", None, "5000", date(2024, 1, 1), None),
        ];
        let found = resolve_rate(&rates, "org_estudio", Some("disc_yoga"), date(2025, 2, 1));
        assert_eq!(found.unwrap().id, "tar_general");
    }

    #[test]
    fn test_expired_and_inactive_rates_are_ignored() {
        let mut inactive = rate("tar_inactive", None, "9000", date(2025, 1, 1), None);
        inactive.active = false;
        let rates = vec![
            rate("tar_expired", None, "8000", date(2025, 1, 1), Some(date(2025, 1, 31))),
            inactive,
        ];
        assert!(resolve_rate(&rates, "org_estudio", None, date(2025, 2, 1)).is_none());
        assert_eq!(
            resolve_rate(&rates, "org_estudio", None, date(2025, 1, 31))
                .unwrap()
                .id,
            "tar_expired"
        );
    }

    #[test]
    fn test_future_rates_are_ignored() {
        let rates = vec![rate("tar_future", None, "8000", date(2025, 6, 1), None)];
        assert!(resolve_rate(&rates, "org_estudio", None, date(2025, 5, 31)).is_none());
    }

    #[test]
    fn test_other_organization_rates_are_ignored() {
        let mut foreign = rate("tar_foreign", None, "8000", date(2025, 1, 1), None);
        foreign.organization_id = "org_otra".to_string();
        let rates = [foreign];
        assert!(resolve_rate(&rates, "org_estudio", None, date(2025, 2, 1)).is_none());
    }

    #[test]
    fn test_resolve_tariff_falls_back_to_default() {
        let resolution = resolve_tariff(&[], "org_estudio", Some("disc_yoga"), date(2025, 2, 1), dec("3743"), 2);
        assert_eq!(resolution.rate, dec("3743"));
        assert_eq!(resolution.source, RateSource::Default);
        assert_eq!(resolution.audit_step.step_number, 2);
        assert_eq!(resolution.audit_step.output["source"], "default");
    }

    #[test]
    fn test_resolve_tariff_reports_configured_rate() {
        let rates = vec![rate("tar_general", None, "5000", date(2025, 1, 1), None)];
        let resolution = resolve_tariff(&rates, "org_estudio", None, date(2025, 2, 1), dec("3743"), 1);
        assert_eq!(resolution.rate, dec("5000"));
        assert_eq!(
            resolution.source,
            RateSource::Configured {
                rate_id: "tar_general".to_string(),
                discipline_id: None,
            }
        );
        assert!(resolution.audit_step.reasoning.contains("general"));
    }
}
