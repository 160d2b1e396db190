//! Core data structures and types for air-quality processing.
//!
//! Defines pollutant identities, column roles, labeling and export choices,
//! and the processing statistics reported by both pipelines.

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PM25_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pm2\.?5").expect("static pattern"));
static PM10_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pm10").expect("static pattern"));
static NO2_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no2").expect("static pattern"));

/// Pollutants recognised by the cleaner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PollutantKind {
    Pm25,
    Pm10,
    No2,
    Unknown,
}

impl PollutantKind {
    /// Canonical display name written to the `Pollutant Name` column
    pub fn display_name(&self) -> &'static str {
        match self {
            PollutantKind::Pm25 => "PM2.5",
            PollutantKind::Pm10 => "PM10",
            PollutantKind::No2 => "NO2",
            PollutantKind::Unknown => "Unknown",
        }
    }

    /// Prefix used for generated sample IDs
    pub fn sample_prefix(&self) -> &'static str {
        match self {
            PollutantKind::Pm25 => "PM25",
            PollutantKind::Pm10 => "PM10",
            PollutantKind::No2 => "NO2",
            PollutantKind::Unknown => "UNKNOWN",
        }
    }

    /// Detect the pollutant from a source file name.
    ///
    /// Only the final path component is inspected, so directory names
    /// never influence the result.
    pub fn from_file_name(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if PM25_PATTERN.is_match(&name) {
            PollutantKind::Pm25
        } else if PM10_PATTERN.is_match(&name) {
            PollutantKind::Pm10
        } else if NO2_PATTERN.is_match(&name) {
            PollutantKind::No2
        } else {
            PollutantKind::Unknown
        }
    }

    /// Parse a user-supplied pollutant name leniently (`pm 2.5`, `PM25`, `no2`)
    pub fn parse_lenient(input: &str) -> Self {
        let normalized: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "PM2.5" | "PM25" => PollutantKind::Pm25,
            "PM10" => PollutantKind::Pm10,
            "NO2" => PollutantKind::No2,
            _ => PollutantKind::Unknown,
        }
    }
}

impl fmt::Display for PollutantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Semantic column roles resolved from a table's header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Date,
    Value,
    State,
    County,
    City,
    Site,
    Latitude,
    Longitude,
}

impl ColumnRole {
    /// Location roles in grouping order
    pub const LOCATION_ROLES: [ColumnRole; 6] = [
        ColumnRole::State,
        ColumnRole::County,
        ColumnRole::City,
        ColumnRole::Site,
        ColumnRole::Latitude,
        ColumnRole::Longitude,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Value => "value",
            ColumnRole::State => "state",
            ColumnRole::County => "county",
            ColumnRole::City => "city",
            ColumnRole::Site => "site",
            ColumnRole::Latitude => "latitude",
            ColumnRole::Longitude => "longitude",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sampling frequency of the source downloads, used in output names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Frequency {
    Daily,
    Hourly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Hourly => "hourly",
        }
    }
}

/// Rule mapping a pollutant name to its wide-table column label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum LabelScheme {
    /// "Pollutant A (NO2)", "Pollutant B (PM2.5)", ... in sorted name order
    #[default]
    Sequential,
    /// The pollutant name itself
    Direct,
}

/// Shape of the reshaper's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ExportMode {
    /// One combined wide table
    #[default]
    SingleTable,
    /// One table per location
    Partitioned,
}

/// File format written by the output sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub sources_loaded: usize,
    pub sources_failed: usize,
    pub rows_in: usize,
    pub rows_out: usize,
    pub outputs: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
