//! Pollutant column labeling.
//!
//! Labels are assigned over the pollutant names sorted ascending, so the
//! mapping depends only on the set of names and never on row order.

use crate::constants::SEQUENTIAL_LABEL_LETTERS;
use crate::error::{AqsError, Result};
use crate::models::LabelScheme;
use crate::reshape::pivot::PivotTable;
use crate::schema::column_names;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Pollutant name to column label mapping, in label order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollutantLabels {
    scheme: LabelScheme,
    entries: Vec<(String, String)>,
}

impl PollutantLabels {
    /// Build labels for a set of pollutant names
    pub fn build<I, S>(pollutants: I, scheme: LabelScheme) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = pollutants
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();

        if scheme == LabelScheme::Sequential && sorted.len() > SEQUENTIAL_LABEL_LETTERS.len() {
            return Err(AqsError::TooManyPollutants {
                found: sorted.len(),
                max: SEQUENTIAL_LABEL_LETTERS.len(),
            });
        }

        let entries = sorted
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let label = match scheme {
                    LabelScheme::Sequential => {
                        format!("Pollutant {} ({})", SEQUENTIAL_LABEL_LETTERS[i], name)
                    }
                    LabelScheme::Direct => name.clone(),
                };
                (name, label)
            })
            .collect();

        Ok(Self { scheme, entries })
    }

    pub fn scheme(&self) -> LabelScheme {
        self.scheme
    }

    pub fn label_for(&self, pollutant: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == pollutant)
            .map(|(_, label)| label.as_str())
    }

    /// Labels in assignment order
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, label)| label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rename the pivot's pollutant columns and reorder the frame.
    ///
    /// Resulting order: date, pollutant columns in label order, then every
    /// remaining column in its prior relative order.
    pub fn apply(&self, table: PivotTable) -> Result<DataFrame> {
        let PivotTable {
            mut frame, columns, ..
        } = table;

        for (name, label) in &self.entries {
            if name != label && frame.get_column_index(name).is_some() {
                frame.rename(name, label.as_str().into())?;
            }
        }

        let mut order: Vec<String> = vec![columns.date.clone()];
        order.extend(
            self.labels()
                .into_iter()
                .filter(|label| frame.get_column_index(label).is_some())
                .map(str::to_string),
        );
        let rest: Vec<String> = column_names(&frame)
            .into_iter()
            .filter(|name| !order.contains(name))
            .collect();
        order.extend(rest);

        debug!("Labeled wide table columns: {:?}", order);
        Ok(frame.select(order)?)
    }
}
