//! Per-source record annotation.
//!
//! Removes low-information columns, stamps every row with a batch-local
//! sample ID and the pollutant's display name, and rounds the metric
//! columns. Sample numbering restarts for every batch and is never
//! renumbered after combination.

use crate::config::AnnotationRules;
use crate::constants::SAMPLE_SEQUENCE_WIDTH;
use crate::error::Result;
use crate::models::PollutantKind;
use crate::normalize::rounded_numeric;
use polars::prelude::*;
use tracing::debug;

/// Annotates one raw batch with sample IDs and pollutant identity
#[derive(Debug, Clone, Default)]
pub struct RecordAnnotator {
    rules: AnnotationRules,
}

impl RecordAnnotator {
    pub fn new(rules: AnnotationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &AnnotationRules {
        &self.rules
    }

    /// Annotate a raw batch for `pollutant`.
    ///
    /// Output columns: `Sample ID`, `Pollutant Name`, then every remaining
    /// original column in its original relative order. Existing columns
    /// with the two inserted names are replaced.
    pub fn annotate(&self, mut df: DataFrame, pollutant: PollutantKind) -> Result<DataFrame> {
        let removable = self.rules.deny_list.iter().chain([
            &self.rules.sample_id_column,
            &self.rules.pollutant_column,
        ]);
        for name in removable {
            if df.get_column_index(name).is_some() {
                df.drop_in_place(name)?;
                debug!("Dropped column '{}'", name);
            }
        }

        for name in &self.rules.numeric_columns {
            if df.get_column_index(name).is_some() {
                let rounded = rounded_numeric(df.column(name)?)?;
                df.with_column(rounded)?;
            }
        }

        let height = df.height();
        let sample_ids: Vec<String> = (1..=height)
            .map(|i| sample_id(pollutant, i))
            .collect();
        let names = vec![pollutant.display_name(); height];

        df.insert_column(
            0,
            Series::new(self.rules.sample_id_column.as_str().into(), sample_ids),
        )?;
        df.insert_column(
            1,
            Series::new(self.rules.pollutant_column.as_str().into(), names),
        )?;

        debug!(
            "Annotated {} rows as {} ({} columns)",
            height,
            pollutant,
            df.width()
        );
        Ok(df)
    }
}

/// Sample ID for the 1-based row `position` within a batch
pub fn sample_id(pollutant: PollutantKind, position: usize) -> String {
    format!(
        "{}-{:0width$}",
        pollutant.sample_prefix(),
        position,
        width = SAMPLE_SEQUENCE_WIDTH
    )
}
