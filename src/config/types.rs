//! Configuration types for a studio.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::calculation::default_session_rate;
use crate::models::{Discipline, InstructorRate, Organization, Plan};

fn default_true() -> bool {
    true
}

/// The organization file (`organization.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationConfig {
    /// Organization id.
    pub id: String,
    /// Trading name.
    pub name: String,
    /// Registered legal name.
    #[serde(default)]
    pub legal_name: String,
    /// Tax identifier (RUT).
    pub tax_id: String,
    /// Contact address.
    #[serde(default)]
    pub contact_email: String,
    /// Rate paid per attendee when no tariff applies.
    #[serde(default)]
    pub default_session_rate: Option<Decimal>,
}

impl OrganizationConfig {
    /// Builds the organization record.
    pub fn to_organization(&self) -> Organization {
        Organization {
            id: self.id.clone(),
            name: self.name.clone(),
            legal_name: self.legal_name.clone(),
            tax_id: self.tax_id.clone(),
            contact_email: self.contact_email.clone(),
        }
    }
}

/// A discipline entry in `disciplines.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DisciplineConfig {
    /// Discipline id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional level label.
    #[serde(default)]
    pub level: String,
    /// Whether it is still offered.
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Disciplines configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DisciplinesConfig {
    /// The disciplines offered.
    pub disciplines: Vec<DisciplineConfig>,
}

/// A plan entry in `plans.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanConfig {
    /// Plan id.
    pub id: String,
    /// Plan name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// List price.
    pub price: Decimal,
    /// Nominal duration in days.
    pub duration_days: u32,
    /// Classes granted per started week.
    pub classes_per_week: u32,
    /// Whether it can still be sold.
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Plans configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PlansConfig {
    /// The plans sold.
    pub plans: Vec<PlanConfig>,
}

/// One file under `rates/`: the tariff table from `valid_from` on.
#[derive(Debug, Clone, Deserialize)]
pub struct RateFileConfig {
    /// First day the table applies.
    pub valid_from: NaiveDate,
    /// Last day the table applies, open-ended if absent.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// The general per-attendee rate.
    #[serde(default)]
    pub general: Option<Decimal>,
    /// Discipline id to per-attendee rate.
    #[serde(default)]
    pub disciplines: BTreeMap<String, Decimal>,
}

impl RateFileConfig {
    /// Expands the table into tariff records, general rate first.
    pub fn to_rates(&self, organization_id: &str) -> Vec<InstructorRate> {
        let general = self.general.map(|amount| InstructorRate {
            id: format!("tar_{}_general", self.valid_from),
            organization_id: organization_id.to_string(),
            discipline_id: None,
            amount_per_session: amount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            active: true,
        });
        let specific = self.disciplines.iter().map(|(discipline, amount)| InstructorRate {
            id: format!("tar_{}_{}", self.valid_from, discipline),
            organization_id: organization_id.to_string(),
            discipline_id: Some(discipline.clone()),
            amount_per_session: *amount,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            active: true,
        });
        general.into_iter().chain(specific).collect()
    }
}

/// The complete studio configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    organization: OrganizationConfig,
    disciplines: Vec<DisciplineConfig>,
    plans: Vec<PlanConfig>,
    /// Rate tables sorted oldest first.
    rates: Vec<RateFileConfig>,
}

impl StudioConfig {
    /// Creates a StudioConfig from its component parts.
    pub fn new(
        organization: OrganizationConfig,
        disciplines: Vec<DisciplineConfig>,
        plans: Vec<PlanConfig>,
        rates: Vec<RateFileConfig>,
    ) -> Self {
        let mut sorted_rates = rates;
        sorted_rates.sort_by(|a, b| a.valid_from.cmp(&b.valid_from));
        Self {
            organization,
            disciplines,
            plans,
            rates: sorted_rates,
        }
    }

    /// Returns the organization settings.
    pub fn organization(&self) -> &OrganizationConfig {
        &self.organization
    }

    /// The rate paid when no tariff applies, after any override.
    pub fn default_session_rate(&self) -> Decimal {
        self.organization
            .default_session_rate
            .unwrap_or_else(default_session_rate)
    }

    /// Discipline records owned by the organization.
    pub fn disciplines(&self) -> Vec<Discipline> {
        self.disciplines
            .iter()
            .map(|d| Discipline {
                id: d.id.clone(),
                organization_id: self.organization.id.clone(),
                name: d.name.clone(),
                level: d.level.clone(),
                active: d.active,
            })
            .collect()
    }

    /// Plan records owned by the organization.
    pub fn plans(&self) -> Vec<Plan> {
        self.plans
            .iter()
            .map(|p| Plan {
                id: p.id.clone(),
                organization_id: self.organization.id.clone(),
                name: p.name.clone(),
                description: p.description.clone(),
                price: p.price,
                duration_days: p.duration_days,
                classes_per_week: p.classes_per_week,
                active: p.active,
            })
            .collect()
    }

    /// Every tariff from every rate table, oldest table first.
    pub fn instructor_rates(&self) -> Vec<InstructorRate> {
        self.rates
            .iter()
            .flat_map(|table| table.to_rates(&self.organization.id))
            .collect()
    }

    /// Returns all rate tables.
    pub fn rate_tables(&self) -> &[RateFileConfig] {
        &self.rates
    }
}
