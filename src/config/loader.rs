//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a studio's
//! reference data from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::Plan;
use crate::store::MemoryStore;

use super::types::{DisciplinesConfig, OrganizationConfig, PlansConfig, RateFileConfig, StudioConfig};

/// Loads and provides access to a studio's configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/estudio/
/// ├── organization.yaml   # Organization metadata and default session rate
/// ├── disciplines.yaml    # Disciplines offered
/// ├── plans.yaml          # Plans (price, duration, weekly quota)
/// └── rates/
///     └── 2025-01-01.yaml # Instructor rate table effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use academia_billing::config::ConfigLoader;
/// use academia_billing::store::MemoryStore;
///
/// let loader = ConfigLoader::load("./config/estudio").unwrap();
/// println!("Loaded studio: {}", loader.organization().name);
///
/// let mut store = MemoryStore::new();
/// loader.seed(&mut store).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: StudioConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/estudio")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A plan has a zero quota or duration
    /// - A rate table ends before it starts
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let organization = Self::load_yaml::<OrganizationConfig>(&path.join("organization.yaml"))?;
        let disciplines = Self::load_yaml::<DisciplinesConfig>(&path.join("disciplines.yaml"))?;
        let plans = Self::load_yaml::<PlansConfig>(&path.join("plans.yaml"))?;
        let rates = Self::load_rates(&path.join("rates"))?;

        let config = StudioConfig::new(organization, disciplines.disciplines, plans.plans, rates);
        for plan in config.plans() {
            plan.validate()?;
        }
        for table in config.rate_tables() {
            if table.valid_until.is_some_and(|until| until < table.valid_from) {
                return Err(EngineError::validation(
                    "valid_until",
                    format!(
                        "rate table from {} ends before it starts",
                        table.valid_from
                    ),
                ));
            }
        }

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate tables from the rates directory.
    fn load_rates(rates_dir: &Path) -> EngineResult<Vec<RateFileConfig>> {
        let rates_dir_str = rates_dir.display().to_string();

        if !rates_dir.exists() {
            return Err(EngineError::ConfigNotFound {
                path: rates_dir_str,
            });
        }

        let entries = fs::read_dir(rates_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut rates = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                rates.push(Self::load_yaml::<RateFileConfig>(&path)?);
            }
        }

        if rates.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rate files found)", rates_dir_str),
            });
        }

        Ok(rates)
    }

    /// Returns the underlying studio configuration.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Returns the organization settings.
    pub fn organization(&self) -> &OrganizationConfig {
        self.config.organization()
    }

    /// The rate paid per attendee when no tariff applies.
    pub fn default_session_rate(&self) -> Decimal {
        self.config.default_session_rate()
    }

    /// Gets a plan by id.
    pub fn get_plan(&self, id: &str) -> EngineResult<Plan> {
        self.config
            .plans()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found("plan", id))
    }

    /// Loads the organization, disciplines, plans and tariffs into a store.
    pub fn seed(&self, store: &mut MemoryStore) -> EngineResult<()> {
        store.insert_organization(self.config.organization().to_organization())?;
        for discipline in self.config.disciplines() {
            store.insert_discipline(discipline)?;
        }
        for plan in self.config.plans() {
            store.insert_plan(plan)?;
        }
        for rate in self.config.instructor_rates() {
            store.insert_rate(rate)?;
        }
        Ok(())
    }
}
