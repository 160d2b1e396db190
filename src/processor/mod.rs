//! Pipeline orchestration.
//!
//! [`CleaningProcessor`] discovers and loads the selected sources, combines
//! the annotated batches, applies the optional filter and writes the
//! cleaned table. [`ReshapeProcessor`] reads a cleaned table, pivots and
//! labels it, and writes either one wide table or one table per location.

pub mod discovery;
pub mod loader;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    discovery::SourceDiscovery,
    loader::{SourceLoader, read_csv_source},
    writer::{FileSink, TableSink, cleaned_table_name, partition_dir, wide_table_name},
};

use crate::cleaner::{apply_filter, combine_batches};
use crate::config::{CleanerConfig, ReshapeConfig};
use crate::error::{AqsError, Result};
use crate::models::{ExportMode, ProcessingStats};
use crate::reshape::reshape_table;
use crate::schema::ColumnResolver;

use colored::*;
use polars::prelude::{DataFrame, ParquetReader, SerReader};
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Runs the cleaning pipeline
#[derive(Debug)]
pub struct CleaningProcessor {
    config: CleanerConfig,
    loader: SourceLoader,
}

impl CleaningProcessor {
    /// Create a processor, rejecting invalid configuration up front
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;
        let loader = SourceLoader::new(config.clone());
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean and write the combined table to the configured output directory
    pub async fn process(&self) -> Result<ProcessingStats> {
        let mut sink = FileSink::new(&self.config.output_dir, self.config.output_format);
        self.process_into(&mut sink).await
    }

    /// Clean and hand the combined table to `sink`
    pub async fn process_into(&self, sink: &mut dyn TableSink) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting AQS cleaning".bright_green().bold());
        println!(
            "  {} {}",
            "Frequency:".bright_cyan(),
            self.config.frequency.as_str()
        );
        println!(
            "  {} {}",
            "Output:".bright_cyan(),
            self.config.output_dir.display()
        );

        println!("\n{}", "Discovering sources...".bright_yellow());
        let sources = SourceDiscovery::new(self.config.sources.clone()).discover()?;
        println!(
            "  {} {} source files",
            "Found".bright_green(),
            sources.len().to_string().bright_white().bold()
        );
        if sources.is_empty() {
            return Err(AqsError::NoUsableSources {
                reason: "no source files matched the given inputs".to_string(),
            });
        }

        println!("\n{}", "Loading and annotating...".bright_yellow());
        let report = self.loader.load_all(&sources).await;
        let rows_in = report.rows_loaded();
        let sources_failed = report.failures.len();
        let sources_loaded = report.batches.len();

        if report.batches.is_empty() {
            return Err(AqsError::NoUsableSources {
                reason: format!("all {} sources failed to load", sources.len()),
            });
        }

        let batches: Vec<DataFrame> = report.batches.into_iter().map(|b| b.frame).collect();
        let mut cleaned = combine_batches(batches, self.config.combine)?;

        if let Some(filter) = &self.config.filter {
            let resolver = ColumnResolver::new(self.config.columns.clone());
            cleaned = apply_filter(cleaned, filter, &resolver)?;
        }

        let name = cleaned_table_name(
            self.config.frequency,
            &cleaned,
            &self.config.annotation.pollutant_column,
        )?;
        let output = sink.write_table(&name, &mut cleaned)?;

        let stats = ProcessingStats {
            sources_loaded,
            sources_failed,
            rows_in,
            rows_out: cleaned.height(),
            outputs: vec![output],
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        print_summary("Cleaning Summary", &stats);
        Ok(stats)
    }
}

/// Runs the reshaping pipeline
#[derive(Debug)]
pub struct ReshapeProcessor {
    config: ReshapeConfig,
}

impl ReshapeProcessor {
    /// Create a processor, rejecting invalid configuration up front
    pub fn new(config: ReshapeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReshapeConfig {
        &self.config
    }

    /// Reshape and write to the configured output directory
    pub async fn process(&self) -> Result<ProcessingStats> {
        let dir = match self.config.export_mode {
            ExportMode::SingleTable => self.config.output_dir.clone(),
            ExportMode::Partitioned => partition_dir(&self.config.output_dir, &self.config.input),
        };
        let mut sink = FileSink::new(dir, self.config.output_format);
        self.process_into(&mut sink).await
    }

    /// Reshape and hand the wide table(s) to `sink`
    pub async fn process_into(&self, sink: &mut dyn TableSink) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        println!("{}", "Starting AQS reshape".bright_green().bold());
        println!(
            "  {} {}",
            "Input:".bright_cyan(),
            self.config.input.display()
        );
        println!(
            "  {} {:?}",
            "Export mode:".bright_cyan(),
            self.config.export_mode
        );

        let input = self.config.input.clone();
        let long = tokio::task::spawn_blocking(move || read_table(&input))
            .await
            .map_err(|e| AqsError::SourceRead {
                path: self.config.input.clone(),
                reason: format!("reader task failed: {}", e),
            })??;
        let rows_in = long.height();
        debug!("Read {} rows x {} columns", rows_in, long.width());

        let wide = reshape_table(long, &self.config)?;
        println!(
            "  {} {} pollutant columns, {} rows",
            "Pivoted".bright_green(),
            wide.labels.len().to_string().bright_white().bold(),
            wide.frame.height().to_string().bright_white().bold()
        );

        let mut outputs = Vec::new();
        match self.config.export_mode {
            ExportMode::SingleTable => {
                let mut frame = wide.frame.clone();
                outputs.push(sink.write_table(&wide_table_name(&self.config.input), &mut frame)?);
            }
            ExportMode::Partitioned => {
                for mut partition in wide.partitions()? {
                    outputs.push(sink.write_table(&partition.name, &mut partition.frame)?);
                }
            }
        }

        let stats = ProcessingStats {
            sources_loaded: 1,
            sources_failed: 0,
            rows_in,
            rows_out: wide.frame.height(),
            outputs,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        print_summary("Reshape Summary", &stats);
        Ok(stats)
    }
}

/// Read a cleaned table; Parquet by extension, CSV otherwise
fn read_table(path: &Path) -> Result<DataFrame> {
    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if !is_parquet {
        return read_csv_source(path);
    }

    let source_error = |reason: String| AqsError::SourceRead {
        path: path.to_path_buf(),
        reason,
    };
    let file = File::open(path).map_err(|e| source_error(e.to_string()))?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| source_error(e.to_string()))
}

fn print_summary(title: &str, stats: &ProcessingStats) {
    println!("\n{}", title.bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Sources loaded:".bright_cyan(),
        stats.sources_loaded.to_string().bright_white()
    );
    if stats.sources_failed > 0 {
        println!(
            "  {} {}",
            "Sources failed:".bright_red(),
            stats.sources_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} in, {} out",
        "Rows:".bright_cyan(),
        stats.rows_in.to_string().bright_white(),
        stats.rows_out.to_string().bright_white().bold()
    );
    for output in &stats.outputs {
        println!("  {} {}", "Wrote".bright_green(), output.display());
    }
}
