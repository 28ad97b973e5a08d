//! Team configuration loading from config.toml
//!
//! The `[[members]]` tables seed team profiles and their payroll settings on first run.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Team members to seed
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

/// Configuration for a single team member
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MemberConfig {
    /// Display name, used to detect already-seeded members
    pub name: String,
    /// Job title
    pub position: Option<String>,
    /// Linked Discord user ID
    pub discord_id: Option<String>,
    /// Monthly base salary
    pub base_salary: Option<f64>,
    /// Fixed monthly bonus
    pub bonus_salary: Option<f64>,
    /// KPI bonus base
    pub kpi_bonus: Option<f64>,
    /// Base salary exempt from insurance
    pub insurance_threshold: Option<f64>,
    /// Insurance rate in percent
    pub insurance_percent: Option<f64>,
    /// Tax rate in percent
    pub tax_percent: Option<f64>,
    /// Flat bonus per delivered content item, by content type
    #[serde(default)]
    pub content_rates: BTreeMap<String, f64>,
}

/// Loads team configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads team configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}
