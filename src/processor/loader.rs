//! Concurrent source loading and annotation
//!
//! Each source is read and annotated on the blocking pool. Up to
//! `max_concurrent_sources` run at once and results come back in
//! selection order. A source that cannot be read is logged and counted
//! but never stops the remaining sources.

use crate::cleaner::RecordAnnotator;
use crate::config::CleanerConfig;
use crate::error::{AqsError, Result};
use crate::models::PollutantKind;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, error, warn};

/// One annotated source table
#[derive(Debug, Clone)]
pub struct LoadedBatch {
    pub path: PathBuf,
    pub pollutant: PollutantKind,
    pub frame: DataFrame,
}

/// Outcome of loading every selected source
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Annotated batches in selection order
    pub batches: Vec<LoadedBatch>,
    pub failures: Vec<AqsError>,
}

impl LoadReport {
    pub fn rows_loaded(&self) -> usize {
        self.batches.iter().map(|b| b.frame.height()).sum()
    }
}

/// Reads and annotates source tables
#[derive(Debug, Clone)]
pub struct SourceLoader {
    config: CleanerConfig,
    annotator: RecordAnnotator,
}

impl SourceLoader {
    pub fn new(config: CleanerConfig) -> Self {
        let annotator = RecordAnnotator::new(config.annotation.clone());
        Self { config, annotator }
    }

    /// Load every source, preserving selection order
    pub async fn load_all(&self, sources: &[PathBuf]) -> LoadReport {
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Loading sources");

        let concurrent_limit = self.config.max_concurrent_sources.max(1);
        debug!(
            "Loading {} sources with concurrency {}",
            sources.len(),
            concurrent_limit
        );

        let results: Vec<Result<LoadedBatch>> = stream::iter(sources.iter().cloned())
            .map(|path| {
                let pollutant = self.config.pollutant_for(&path);
                let annotator = self.annotator.clone();
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = path.file_name() {
                        pb.set_message(format!("Loading: {}", file_name.to_string_lossy()));
                    }

                    let task_path = path.clone();
                    let result = task::spawn_blocking(move || {
                        load_and_annotate(&task_path, pollutant, &annotator)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(AqsError::SourceRead {
                            path: path.clone(),
                            reason: format!("loader task failed: {}", e),
                        })
                    });

                    pb.inc(1);
                    result
                }
            })
            .buffered(concurrent_limit)
            .collect()
            .await;

        pb.finish_and_clear();

        let mut report = LoadReport::default();
        for result in results {
            match result {
                Ok(batch) => {
                    debug!(
                        "Loaded {} ({} rows as {})",
                        batch.path.display(),
                        batch.frame.height(),
                        batch.pollutant
                    );
                    report.batches.push(batch);
                }
                Err(e) => {
                    error!("{}", e);
                    report.failures.push(e);
                }
            }
        }
        report
    }
}

fn load_and_annotate(
    path: &Path,
    pollutant: PollutantKind,
    annotator: &RecordAnnotator,
) -> Result<LoadedBatch> {
    if pollutant == PollutantKind::Unknown {
        warn!(
            "Could not determine pollutant for {}, labelling rows as Unknown",
            path.display()
        );
    }

    let raw = read_csv_source(path)?;
    let frame = annotator.annotate(raw, pollutant)?;

    Ok(LoadedBatch {
        path: path.to_path_buf(),
        pollutant,
        frame,
    })
}

/// Read a CSV table with a header row.
///
/// Column types are inferred over the whole file so a late cell never
/// conflicts with a type guessed from the leading rows.
pub fn read_csv_source(path: &Path) -> Result<DataFrame> {
    let source_error = |reason: String| AqsError::SourceRead {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(source_error("file does not exist".to_string()));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| source_error(e.to_string()))
}
