//! CLI command handlers for `Akiko`.
//!
//! Each command is implemented in its own submodule.

pub mod check;
pub mod config;
pub mod tally;

use akiko::config::Config;
use akiko::core::classify::RuleSet;
use akiko::core::import::load_catalog;
use akiko::core::models::{CreditRequirements, KnownCourses};
use akiko::error;

/// Inputs shared by `tally` and `check`
pub struct ProgramData {
    /// Course catalog
    pub catalog: KnownCourses,
    /// Requirement table
    pub requirements: CreditRequirements,
    /// Classification rules
    pub rules: RuleSet,
}

fn require_path<'a>(value: &'a str, key: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!(
            "✗ No {key} configured. Pass --{key} or run `akiko config set {key} PATH`."
        ))
    } else {
        Ok(value)
    }
}

/// Load catalog, requirement table and rules from the configured paths
///
/// # Errors
/// Returns a user-facing message if any file is missing or malformed
pub fn load_program(config: &Config) -> Result<ProgramData, String> {
    let catalog_path = require_path(&config.paths.catalog, "catalog")?;
    let requirements_path = require_path(&config.paths.requirements, "requirements")?;
    let rules_path = require_path(&config.paths.rules, "rules")?;

    let catalog = load_catalog(catalog_path).map_err(|e| {
        error!("Failed to load catalog {catalog_path}: {e}");
        format!("✗ Failed to load catalog {catalog_path}: {e}")
    })?;
    let requirements = CreditRequirements::load(requirements_path).map_err(|e| {
        error!("Failed to load requirements {requirements_path}: {e}");
        format!("✗ Failed to load requirements {requirements_path}: {e}")
    })?;
    let rules = RuleSet::load(rules_path).map_err(|e| {
        error!("Failed to load rules {rules_path}: {e}");
        format!("✗ Failed to load rules {rules_path}: {e}")
    })?;

    Ok(ProgramData {
        catalog,
        requirements,
        rules,
    })
}
