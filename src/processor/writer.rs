//! Output sinks for cleaned and wide tables
//!
//! Every table the pipelines produce goes through a [`TableSink`]. The
//! file sink writes CSV or Parquet into a directory; the memory sink keeps
//! tables for inspection in tests.

use crate::constants::{CLEANED_SUFFIX, UNKNOWN_POLLUTANT_TOKEN, WIDE_BY_LOCATION_SUFFIX, WIDE_SUFFIX};
use crate::error::Result;
use crate::models::{Frequency, OutputFormat};
use crate::normalize::{sanitize_file_stem, text_cells};

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for named output tables
pub trait TableSink {
    /// Write `frame` under `name` (a file stem) and return where it went
    fn write_table(&mut self, name: &str, frame: &mut DataFrame) -> Result<PathBuf>;
}

/// Writes tables as files in one directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a table named `name` would be written to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_file_stem(name), self.format.extension()))
    }
}

impl TableSink for FileSink {
    fn write_table(&mut self, name: &str, frame: &mut DataFrame) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let file = File::create(&path)?;

        match self.format {
            OutputFormat::Csv => {
                CsvWriter::new(file).include_header(true).finish(frame)?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(file).finish(frame)?;
            }
        }

        debug!("Wrote {} rows to {}", frame.height(), path.display());
        Ok(path)
    }
}

/// Keeps written tables in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub tables: Vec<(String, DataFrame)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&DataFrame> {
        self.tables
            .iter()
            .find(|(table_name, _)| table_name == name)
            .map(|(_, frame)| frame)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tables.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl TableSink for MemorySink {
    fn write_table(&mut self, name: &str, frame: &mut DataFrame) -> Result<PathBuf> {
        self.tables.push((name.to_string(), frame.clone()));
        Ok(PathBuf::from(name))
    }
}

/// Stem of the cleaned table: `{frequency}_{tokens}_cleaned`.
///
/// Tokens are the distinct pollutant names in order of first appearance
/// with dots and spaces removed.
pub fn cleaned_table_name(
    frequency: Frequency,
    cleaned: &DataFrame,
    pollutant_column: &str,
) -> Result<String> {
    let mut tokens: Vec<String> = Vec::new();
    if cleaned.get_column_index(pollutant_column).is_some() {
        for name in text_cells(cleaned.column(pollutant_column)?)?.into_iter().flatten() {
            let token: String = name.chars().filter(|c| *c != '.' && *c != ' ').collect();
            if !token.is_empty() && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }

    let tokens = if tokens.is_empty() {
        UNKNOWN_POLLUTANT_TOKEN.to_string()
    } else {
        tokens.join("_")
    };
    Ok(format!("{}_{}_{}", frequency.as_str(), tokens, CLEANED_SUFFIX))
}

/// Base name of an input table (its file stem)
pub fn input_base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "table".to_string())
}

/// Stem of the single wide table: `{base}_wide`
pub fn wide_table_name(input: &Path) -> String {
    format!("{}_{}", input_base_name(input), WIDE_SUFFIX)
}

/// Directory holding the per-location tables: `{base}_wide_by_location`
pub fn partition_dir(output_dir: &Path, input: &Path) -> PathBuf {
    output_dir.join(format!("{}_{}", input_base_name(input), WIDE_BY_LOCATION_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use polars::prelude::{ParquetReader, SerReader};
    use tempfile::TempDir;

    #[test]
    fn test_cleaned_table_name_tokens_in_first_appearance_order() {
        let cleaned = df!(
            "Sample ID" => ["PM25-0001", "NO2-0001", "PM25-0001"],
            "Pollutant Name" => ["PM2.5", "NO2", "PM2.5"]
        )
        .unwrap();

        let name = cleaned_table_name(Frequency::Daily, &cleaned, "Pollutant Name").unwrap();
        assert_eq!(name, "daily_PM25_NO2_cleaned");
    }

    #[test]
    fn test_cleaned_table_name_without_pollutants() {
        let empty = df!("Pollutant Name" => Vec::<String>::new()).unwrap();
        let name = cleaned_table_name(Frequency::Hourly, &empty, "Pollutant Name").unwrap();
        assert_eq!(name, "hourly_Unknown_cleaned");
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Maryland-Baltimore"), "Maryland-Baltimore");
        assert_eq!(sanitize_file_stem("A/B: C?"), "A_B_ C_");
    }

    #[test]
    fn test_wide_names() {
        let input = Path::new("/data/daily_PM25_NO2_cleaned.csv");
        assert_eq!(wide_table_name(input), "daily_PM25_NO2_cleaned_wide");
        assert_eq!(
            partition_dir(Path::new("/out"), input),
            PathBuf::from("/out/daily_PM25_NO2_cleaned_wide_by_location")
        );
    }

    #[test]
    fn test_file_sink_writes_csv_with_empty_missing_cells() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(temp_dir.path().join("out"), OutputFormat::Csv);
        let mut frame = df!(
            "Date Local" => ["2025-01-10", "2025-01-11"],
            "NO2" => [Some(15.2), None]
        )
        .unwrap();

        let path = sink.write_table("Maryland/Baltimore", &mut frame).unwrap();

        assert_eq!(path, temp_dir.path().join("out").join("Maryland_Baltimore.csv"));
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Date Local,NO2");
        assert_eq!(lines[1], "2025-01-10,15.2");
        assert_eq!(lines[2], "2025-01-11,");
    }

    #[test]
    fn test_file_sink_writes_parquet() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(temp_dir.path(), OutputFormat::Parquet);
        let mut frame = df!("NO2" => [15.2, 11.0]).unwrap();

        let path = sink.write_table("wide", &mut frame).unwrap();
        assert_eq!(path.extension().unwrap(), "parquet");
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let read_back = ParquetReader::new(File::open(&path).unwrap())
            .finish()
            .unwrap();
        assert!(read_back.equals_missing(&frame));
    }

    #[test]
    fn test_memory_sink_keeps_tables() {
        let mut sink = MemorySink::new();
        let mut frame = df!("x" => [1i64]).unwrap();
        sink.write_table("first", &mut frame).unwrap();

        assert_eq!(sink.names(), vec!["first"]);
        assert!(sink.table("first").unwrap().equals_missing(&frame));
        assert!(sink.table("second").is_none());
    }
}
