//! Configuration loading for a studio.
//!
//! This module loads a studio's reference data from YAML files: the
//! organization, its disciplines and plans, and the instructor tariff tables.
//!
//! # Example
//!
//! ```no_run
//! use academia_billing::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/estudio").unwrap();
//! println!("Loaded studio: {}", config.organization().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DisciplineConfig, DisciplinesConfig, OrganizationConfig, PlanConfig, PlansConfig,
    RateFileConfig, StudioConfig,
};
