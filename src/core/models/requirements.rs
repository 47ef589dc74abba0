//! Credit requirement tables

use super::ids::{CellId, ColumnId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// Upper bound of a credit range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Bound {
    /// Capped at the given number of credits
    Bounded(f64),
    /// No cap
    #[default]
    Unbounded,
}

impl Bound {
    /// Clamp `value` to this bound
    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        match self {
            Self::Bounded(max) => value.min(max),
            Self::Unbounded => value,
        }
    }

    /// The cap, if any
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Bounded(max) => Some(max),
            Self::Unbounded => None,
        }
    }
}

impl From<Option<f64>> for Bound {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}

impl From<Bound> for Option<f64> {
    fn from(bound: Bound) -> Self {
        bound.value()
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(max) => write!(f, "{max}"),
            Self::Unbounded => f.write_str("-"),
        }
    }
}

/// Minimum and optional maximum credits for a cell or a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditRange {
    /// Credits required
    pub min: f64,
    /// Credits that count at most
    #[serde(default)]
    pub max: Bound,
}

impl CreditRange {
    /// Create a range
    #[must_use]
    pub const fn new(min: f64, max: Bound) -> Self {
        Self { min, max }
    }

    /// A range where min and max are both `credits`
    #[must_use]
    pub const fn exact(credits: f64) -> Self {
        Self {
            min: credits,
            max: Bound::Bounded(credits),
        }
    }
}

/// Per-program credit requirements.
///
/// Every cell's column is expected to have a column entry; [`validate`]
/// reports cells that break this.
///
/// [`validate`]: Self::validate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditRequirements {
    /// Per-cell ranges
    #[serde(default)]
    pub cells: BTreeMap<CellId, CreditRange>,
    /// Per-column ranges
    #[serde(default)]
    pub columns: BTreeMap<ColumnId, CreditRange>,
    /// Exact target for all compulsory columns together
    #[serde(rename = "compulsory")]
    pub compulsory_min: f64,
    /// Exact target for all elective columns together
    #[serde(rename = "elective")]
    pub elective_min: f64,
}

impl CreditRequirements {
    /// Parse a requirement table from TOML
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed or a cell/column id is invalid
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load a requirement table from a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Look up a cell's range
    #[must_use]
    pub fn cell(&self, id: &CellId) -> Option<&CreditRange> {
        self.cells.get(id)
    }

    /// Look up a column's range
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&CreditRange> {
        self.columns.get(&id)
    }

    /// Check the table for contract violations
    ///
    /// # Errors
    /// Returns `Err` with one message per problem: a cell without a column
    /// entry, a negative or non-finite figure, or `min` above `max`
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        for (cell_id, range) in &self.cells {
            if !self.columns.contains_key(&cell_id.column()) {
                problems.push(format!(
                    "Cell '{cell_id}': no entry for column '{}'",
                    cell_id.column()
                ));
            }
            check_range(&format!("Cell '{cell_id}'"), range, &mut problems);
        }

        for (column_id, range) in &self.columns {
            check_range(&format!("Column '{column_id}'"), range, &mut problems);
        }

        for (label, value) in [
            ("compulsory", self.compulsory_min),
            ("elective", self.elective_min),
        ] {
            if !value.is_finite() || value < 0.0 {
                problems.push(format!("Invalid {label} target: {value}"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

fn check_range(label: &str, range: &CreditRange, problems: &mut Vec<String>) {
    if !range.min.is_finite() || range.min < 0.0 {
        problems.push(format!("{label}: invalid min {}", range.min));
    }
    if let Bound::Bounded(max) = range.max {
        if !max.is_finite() || max < 0.0 {
            problems.push(format!("{label}: invalid max {max}"));
        } else if range.min > max {
            problems.push(format!("{label}: min {} exceeds max {max}", range.min));
        }
    }
}
