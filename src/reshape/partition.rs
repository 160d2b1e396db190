//! Per-location partitioning of the wide table.
//!
//! Splits the labeled wide table by its location columns and names each
//! partition after its key values. Names are file-safe and capped at 31
//! characters, the spreadsheet sheet-name limit; names that collide after
//! sanitizing or truncation get a `~N` suffix instead of overwriting an
//! earlier partition.

use crate::constants::{
    ALL_PARTITION_NAME, MAX_PARTITION_NAME_LEN, PARTITION_NAME_SEPARATOR, UNNAMED_PARTITION_NAME,
};
use crate::error::Result;
use crate::normalize::{sanitize_file_stem, text_cells};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Location values identifying one partition, in grouping order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    values: Vec<Option<String>>,
}

impl LocationKey {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Non-missing values joined by `-`, made file-safe and truncated to
    /// the sheet-name limit
    pub fn partition_name(&self) -> String {
        let joined = self
            .values
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(PARTITION_NAME_SEPARATOR);

        if joined.is_empty() {
            UNNAMED_PARTITION_NAME.to_string()
        } else {
            truncate_chars(&sanitize_file_stem(&joined), MAX_PARTITION_NAME_LEN)
        }
    }
}

/// A named slice of the wide table
#[derive(Debug, Clone)]
pub struct Partition {
    pub name: String,
    pub key: LocationKey,
    pub frame: DataFrame,
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Make `name` unique among `taken` by replacing its tail with `~2`, `~3`, ...
fn disambiguate(name: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&name) {
        return name;
    }
    (2usize..)
        .map(|n| {
            let suffix = format!("~{}", n);
            let keep = MAX_PARTITION_NAME_LEN.saturating_sub(suffix.chars().count());
            format!("{}{}", truncate_chars(&name, keep), suffix)
        })
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(name)
}

/// Split `wide` into one partition per distinct location tuple.
///
/// Partitions appear in the table's row order and together contain every
/// row exactly once. Without location columns the whole table is a single
/// partition named `All`.
pub fn partition_by_location(wide: &DataFrame, location_columns: &[String]) -> Result<Vec<Partition>> {
    if location_columns.is_empty() {
        return Ok(vec![Partition {
            name: ALL_PARTITION_NAME.to_string(),
            key: LocationKey::new(Vec::new()),
            frame: wide.clone(),
        }]);
    }

    let frames = wide.partition_by_stable(location_columns.to_vec(), true)?;
    let mut taken = HashSet::new();
    let mut partitions = Vec::with_capacity(frames.len());

    for frame in frames {
        let key = LocationKey::new(
            location_columns
                .iter()
                .map(|name| first_text(&frame, name))
                .collect::<Result<Vec<_>>>()?,
        );

        let base = key.partition_name();
        let name = disambiguate(base.clone(), &taken);
        if name != base {
            warn!(
                "Partition name '{}' already used, writing {:?} as '{}'",
                base,
                key.values(),
                name
            );
        }
        taken.insert(name.clone());

        debug!("Partition '{}': {} rows", name, frame.height());
        partitions.push(Partition { name, key, frame });
    }

    Ok(partitions)
}

fn first_text(frame: &DataFrame, column: &str) -> Result<Option<String>> {
    let head = frame.column(column)?.head(Some(1));
    Ok(text_cells(&head)?.into_iter().next().flatten())
}
