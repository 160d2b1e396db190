//! Configuration management and validation.
//!
//! Every choice the cleaner and reshaper need is carried by an explicit
//! configuration struct resolved before a run starts. The fixed column
//! vocabularies live in immutable [`ColumnPriorities`] and
//! [`AnnotationRules`] values so the transforms stay pure and testable
//! with alternative tables.

use crate::constants::{
    CITY_CANDIDATES, COUNTY_CANDIDATES, DATE_CANDIDATES, DEFAULT_MAX_CONCURRENT_SOURCES,
    DENY_LIST_COLUMNS, LATITUDE_CANDIDATES, LONGITUDE_CANDIDATES, NUMERIC_METRIC_COLUMNS,
    POLLUTANT_NAME_COLUMN, SAMPLE_ID_COLUMN, SITE_CANDIDATES, STATE_CANDIDATES, VALUE_CANDIDATES,
};
use crate::error::{AqsError, Result};
use crate::models::{ColumnRole, ExportMode, Frequency, LabelScheme, OutputFormat, PollutantKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Candidate column names per semantic role, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPriorities {
    pub date: Vec<String>,
    pub value: Vec<String>,
    pub state: Vec<String>,
    pub county: Vec<String>,
    pub city: Vec<String>,
    pub site: Vec<String>,
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    /// Column whose values become the wide table's columns
    pub pivot_key: String,
}

impl Default for ColumnPriorities {
    fn default() -> Self {
        Self {
            date: owned(DATE_CANDIDATES),
            value: owned(VALUE_CANDIDATES),
            state: owned(STATE_CANDIDATES),
            county: owned(COUNTY_CANDIDATES),
            city: owned(CITY_CANDIDATES),
            site: owned(SITE_CANDIDATES),
            latitude: owned(LATITUDE_CANDIDATES),
            longitude: owned(LONGITUDE_CANDIDATES),
            pivot_key: POLLUTANT_NAME_COLUMN.to_string(),
        }
    }
}

impl ColumnPriorities {
    /// Candidates for a role
    pub fn candidates(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Date => &self.date,
            ColumnRole::Value => &self.value,
            ColumnRole::State => &self.state,
            ColumnRole::County => &self.county,
            ColumnRole::City => &self.city,
            ColumnRole::Site => &self.site,
            ColumnRole::Latitude => &self.latitude,
            ColumnRole::Longitude => &self.longitude,
        }
    }
}

/// Fixed rules applied by the record annotator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRules {
    pub deny_list: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub sample_id_column: String,
    pub pollutant_column: String,
}

impl Default for AnnotationRules {
    fn default() -> Self {
        Self {
            deny_list: owned(DENY_LIST_COLUMNS),
            numeric_columns: owned(NUMERIC_METRIC_COLUMNS),
            sample_id_column: SAMPLE_ID_COLUMN.to_string(),
            pollutant_column: POLLUTANT_NAME_COLUMN.to_string(),
        }
    }
}

/// Row filter requested for a cleaning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// `state`, `city`, `county`, `site` or `coordinates`
    pub kind: String,
    pub keyword: String,
}

impl FilterSpec {
    pub fn new(kind: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            keyword: keyword.into(),
        }
    }
}

/// Configuration for the cleaning pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Source tables in selection order
    pub sources: Vec<PathBuf>,

    /// Output directory for the cleaned table
    pub output_dir: PathBuf,

    pub frequency: Frequency,

    /// Concatenate every source instead of writing only the first
    pub combine: bool,

    /// Explicit pollutant per source file name, taking precedence over detection
    pub pollutant_overrides: BTreeMap<String, PollutantKind>,

    pub filter: Option<FilterSpec>,

    pub output_format: OutputFormat,

    /// Maximum sources read and annotated concurrently
    pub max_concurrent_sources: usize,

    pub annotation: AnnotationRules,

    pub columns: ColumnPriorities,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            output_dir: PathBuf::from("."),
            frequency: Frequency::Daily,
            combine: true,
            pollutant_overrides: BTreeMap::new(),
            filter: None,
            output_format: OutputFormat::Csv,
            max_concurrent_sources: DEFAULT_MAX_CONCURRENT_SOURCES.min(num_cpus::get()).max(1),
            annotation: AnnotationRules::default(),
            columns: ColumnPriorities::default(),
        }
    }
}

impl CleanerConfig {
    pub fn with_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_combine(mut self, combine: bool) -> Self {
        self.combine = combine;
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_pollutant_override(
        mut self,
        file_name: impl Into<String>,
        pollutant: PollutantKind,
    ) -> Self {
        self.pollutant_overrides.insert(file_name.into(), pollutant);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_max_concurrent_sources(mut self, max_sources: usize) -> Self {
        self.max_concurrent_sources = max_sources;
        self
    }

    /// Pollutant for a source: explicit override by file name, otherwise detection
    pub fn pollutant_for(&self, source: &Path) -> PollutantKind {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match self.pollutant_overrides.get(&file_name) {
            Some(kind) => {
                debug!("Pollutant override for {}: {}", file_name, kind);
                *kind
            }
            None => PollutantKind::from_file_name(source),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AqsError::Configuration {
                message: "at least one source file is required".to_string(),
            });
        }
        if self.max_concurrent_sources == 0 {
            return Err(AqsError::Configuration {
                message: "max_concurrent_sources must be at least 1".to_string(),
            });
        }
        if let Some(filter) = &self.filter {
            if filter.keyword.trim().is_empty() {
                return Err(AqsError::Configuration {
                    message: format!("filter '{}' needs a non-empty keyword", filter.kind),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for the reshaping pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReshapeConfig {
    /// Cleaned (usually combined) long table
    pub input: PathBuf,

    pub output_dir: PathBuf,

    /// Explicit date column; takes precedence over the date candidates
    pub date_column: Option<String>,

    /// Explicit value column; takes precedence over the value candidates
    pub value_column: Option<String>,

    pub label_scheme: LabelScheme,

    pub export_mode: ExportMode,

    pub output_format: OutputFormat,

    pub columns: ColumnPriorities,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_dir: PathBuf::from("."),
            date_column: None,
            value_column: None,
            label_scheme: LabelScheme::Sequential,
            export_mode: ExportMode::SingleTable,
            output_format: OutputFormat::Csv,
            columns: ColumnPriorities::default(),
        }
    }
}

impl ReshapeConfig {
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_value_column(mut self, column: impl Into<String>) -> Self {
        self.value_column = Some(column.into());
        self
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    pub fn with_label_scheme(mut self, scheme: LabelScheme) -> Self {
        self.label_scheme = scheme;
        self
    }

    pub fn with_export_mode(mut self, mode: ExportMode) -> Self {
        self.export_mode = mode;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(AqsError::Configuration {
                message: "an input table is required".to_string(),
            });
        }
        for (flag, column) in [("date", &self.date_column), ("value", &self.value_column)] {
            if column.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(AqsError::Configuration {
                    message: format!("{} column override must not be empty", flag),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_priorities_match_vocabulary() {
        let priorities = ColumnPriorities::default();
        assert_eq!(
            priorities.candidates(ColumnRole::Date),
            ["Date", "Date Local", "Date Observed", "Date GMT"]
        );
        assert_eq!(priorities.candidates(ColumnRole::Value), ["Arithmetic Mean"]);
        assert_eq!(
            priorities.candidates(ColumnRole::Longitude),
            ["Longitude", "Site Longitude", "Lon", "Long"]
        );
        assert_eq!(priorities.pivot_key, "Pollutant Name");
    }

    #[test]
    fn test_pollutant_override_takes_precedence() {
        let config = CleanerConfig::default()
            .with_pollutant_override("site_data.csv", PollutantKind::No2);

        assert_eq!(
            config.pollutant_for(Path::new("/tmp/site_data.csv")),
            PollutantKind::No2
        );
        assert_eq!(
            config.pollutant_for(Path::new("/tmp/daily_pm10.csv")),
            PollutantKind::Pm10
        );
        assert_eq!(
            config.pollutant_for(Path::new("/tmp/other.csv")),
            PollutantKind::Unknown
        );
    }

    #[test]
    fn test_cleaner_validation() {
        assert!(CleanerConfig::default().validate().is_err());

        let config = CleanerConfig::default().with_sources(vec![PathBuf::from("a.csv")]);
        assert!(config.validate().is_ok());

        let config = config.clone().with_max_concurrent_sources(0);
        assert!(matches!(
            config.validate(),
            Err(AqsError::Configuration { .. })
        ));

        let config = CleanerConfig::default()
            .with_sources(vec![PathBuf::from("a.csv")])
            .with_filter(FilterSpec::new("state", "  "));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reshape_validation() {
        assert!(ReshapeConfig::default().validate().is_err());

        let config = ReshapeConfig::default().with_input("combined.csv");
        assert!(config.validate().is_ok());

        let config = config.with_value_column(" ");
        assert!(config.validate().is_err());
    }
}
