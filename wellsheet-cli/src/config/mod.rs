//! Load configuration
//!
//! Defaults reproduce the classic setup: `table.xlsx` loaded into the
//! `ursip` table of the `ursip` database, `company` kept out of the crossed
//! columns. Values can come from a TOML file and be overridden on the
//! command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::sheet::{ExcludeSet, HeaderLayout};
use crate::storage::FailurePolicy;

/// Settings for one load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// SQLite database path (or `:memory:`)
    pub database: String,
    /// Table receiving the rows
    pub table: String,
    /// Workbook to load
    pub source: PathBuf,
    /// Worksheet name, first sheet when unset
    pub sheet: Option<String>,
    /// Categories never crossed into sub-columns
    pub exclude: Vec<String>,
    /// 0-based row of the first header row
    pub header_row: usize,
    /// 0-based first column of the header and data
    pub first_column: usize,
    pub failure_policy: FailurePolicy,
    pub dates: DateSettings,
    pub report: ReportSettings,
}

/// Month the synthesized dates fall in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateSettings {
    pub year: i32,
    pub month: u32,
    /// Fixed RNG seed for reproducible loads
    pub seed: Option<u64>,
}

/// Columns the totals report is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportSettings {
    /// Identifier column reported as `company`
    pub id_column: String,
    /// Result groups reported side by side (`fact`, `forecast`)
    pub result_groups: Vec<String>,
    /// Measure summed into `total_qliq`
    pub liquid_measure: String,
    /// Measure summed into `total_qoil`
    pub oil_measure: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            database: "ursip".to_string(),
            table: "ursip".to_string(),
            source: PathBuf::from("table.xlsx"),
            sheet: None,
            exclude: vec!["company".to_string()],
            header_row: 0,
            first_column: 1,
            failure_policy: FailurePolicy::default(),
            dates: DateSettings::default(),
            report: ReportSettings::default(),
        }
    }
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            year: 2023,
            month: 5,
            seed: None,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            id_column: "company".to_string(),
            result_groups: vec!["fact".to_string(), "forecast".to_string()],
            liquid_measure: "Qliq".to_string(),
            oil_measure: "Qoil".to_string(),
        }
    }
}

impl LoadConfig {
    /// Load from `path`, or from the default config file when it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would only fail halfway through a load
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            bail!("Table name cannot be empty");
        }
        if NaiveDate::from_ymd_opt(self.dates.year, self.dates.month, 1).is_none() {
            bail!(
                "Invalid date month: {}-{:02}",
                self.dates.year,
                self.dates.month
            );
        }
        if self.report.result_groups.is_empty() {
            bail!("At least one report result group is required");
        }
        Ok(())
    }

    pub fn exclude_set(&self) -> ExcludeSet {
        ExcludeSet::new(self.exclude.iter().cloned())
    }

    pub fn header_layout(&self) -> HeaderLayout {
        HeaderLayout {
            first_row: self.header_row,
            first_column: self.first_column,
        }
    }
}

/// `~/.config/wellsheet/config.toml`
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wellsheet").join("config.toml"))
}
