//! Command-line argument definitions and their mapping onto pipeline
//! configuration.

use crate::config::{CleanerConfig, FilterSpec, ReshapeConfig};
use crate::models::{ExportMode, Frequency, LabelScheme, OutputFormat, PollutantKind};

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aqs_processor")]
#[command(about = "Clean EPA AQS air-quality downloads and reshape them into wide tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate, combine and filter raw download files into one long table
    Clean(CleanArgs),
    /// Pivot a cleaned long table into a wide per-location table
    Reshape(ReshapeArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CleanArgs {
    /// Source files, directories or glob patterns, in selection order
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for the cleaned table
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Sampling frequency of the downloads
    #[arg(long, value_enum, default_value_t = Frequency::Daily)]
    pub frequency: Frequency,

    /// Write only the first source instead of combining all of them
    #[arg(long)]
    pub no_combine: bool,

    /// Pollutant for a source file, overriding detection (FILE=KIND, e.g. site.csv=pm2.5)
    #[arg(long = "pollutant", value_name = "FILE=KIND", value_parser = parse_pollutant_override)]
    pub pollutants: Vec<(String, PollutantKind)>,

    /// Filter type: state, city, county, site or coordinates
    #[arg(long, requires = "filter_keyword")]
    pub filter_type: Option<String>,

    /// Filter keyword; "lat, lon" for coordinates
    #[arg(long, requires = "filter_type", allow_hyphen_values = true)]
    pub filter_keyword: Option<String>,

    /// Output file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Maximum sources loaded at once
    #[arg(long)]
    pub max_concurrent: Option<usize>,
}

#[derive(ClapArgs, Debug)]
pub struct ReshapeArgs {
    /// Cleaned long table (CSV or Parquet)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Value column to pivot, overriding the default candidates
    #[arg(long)]
    pub value_column: Option<String>,

    /// Date column, overriding the default candidates
    #[arg(long)]
    pub date_column: Option<String>,

    /// Pollutant column labels
    #[arg(long, value_enum, default_value_t = LabelScheme::Sequential)]
    pub labels: LabelScheme,

    /// Single wide table or one table per location
    #[arg(long, value_enum, default_value_t = ExportMode::SingleTable)]
    pub export_mode: ExportMode,

    /// Output file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl CleanArgs {
    pub fn to_config(&self) -> CleanerConfig {
        let mut config = CleanerConfig::default()
            .with_sources(self.inputs.clone())
            .with_output_dir(&self.output)
            .with_frequency(self.frequency)
            .with_combine(!self.no_combine)
            .with_output_format(self.format);

        for (file_name, pollutant) in &self.pollutants {
            config = config.with_pollutant_override(file_name.clone(), *pollutant);
        }
        if let (Some(kind), Some(keyword)) = (&self.filter_type, &self.filter_keyword) {
            config = config.with_filter(FilterSpec::new(kind.clone(), keyword.clone()));
        }
        if let Some(max) = self.max_concurrent {
            config = config.with_max_concurrent_sources(max);
        }
        config
    }
}

impl ReshapeArgs {
    pub fn to_config(&self) -> ReshapeConfig {
        let mut config = ReshapeConfig::default()
            .with_input(&self.input)
            .with_output_dir(&self.output)
            .with_label_scheme(self.labels)
            .with_export_mode(self.export_mode)
            .with_output_format(self.format);

        if let Some(column) = &self.value_column {
            config = config.with_value_column(column.clone());
        }
        if let Some(column) = &self.date_column {
            config = config.with_date_column(column.clone());
        }
        config
    }
}

/// Parse `FILE=KIND` into a file name and pollutant
fn parse_pollutant_override(raw: &str) -> std::result::Result<(String, PollutantKind), String> {
    let (file_name, kind) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FILE=KIND, got '{}'", raw))?;

    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(format!("missing file name in '{}'", raw));
    }

    let pollutant = PollutantKind::parse_lenient(kind);
    if pollutant == PollutantKind::Unknown && !kind.trim().eq_ignore_ascii_case("unknown") {
        return Err(format!(
            "unrecognised pollutant '{}' (expected pm2.5, pm10, no2 or unknown)",
            kind.trim()
        ));
    }
    Ok((file_name.to_string(), pollutant))
}
