//! Reshaping pipeline stages.
//!
//! Turns a cleaned long table into a wide table with one row per
//! location and date and one column per pollutant ([`pivot`]), renames the
//! pollutant columns ([`labels`]) and optionally splits the result by
//! location ([`partition`]).

pub mod labels;
pub mod partition;
pub mod pivot;

pub use labels::PollutantLabels;
pub use partition::{LocationKey, Partition, partition_by_location};
pub use pivot::{PivotColumns, PivotTable, pivot_wide};

use crate::config::ReshapeConfig;
use crate::error::Result;
use crate::models::ColumnRole;
use crate::schema::ColumnResolver;
use polars::prelude::DataFrame;
use tracing::debug;

const STAGE: &str = "reshape";

/// Labeled wide table ready for export
#[derive(Debug, Clone)]
pub struct WideTable {
    pub frame: DataFrame,
    pub date_column: String,
    /// Location columns present in the table, in grouping order
    pub location_columns: Vec<String>,
    pub labels: PollutantLabels,
}

impl WideTable {
    /// Split into per-location partitions
    pub fn partitions(&self) -> Result<Vec<Partition>> {
        partition_by_location(&self.frame, &self.location_columns)
    }
}

/// Resolve the columns a pivot needs from a long table's header
pub fn resolve_pivot_columns(
    long: &DataFrame,
    config: &ReshapeConfig,
    resolver: &ColumnResolver,
) -> Result<PivotColumns> {
    let date = resolver.require(long, ColumnRole::Date, config.date_column.as_deref(), STAGE)?;
    let value = resolver.require(long, ColumnRole::Value, config.value_column.as_deref(), STAGE)?;
    let key = resolver.require_pivot_key(long, STAGE)?;

    let locations = resolver
        .resolve(long)
        .location_columns()
        .into_iter()
        .filter(|name| *name != date && *name != value && *name != key)
        .collect();

    Ok(PivotColumns {
        date,
        value,
        key,
        locations,
    })
}

/// Pivot and label a cleaned long table
pub fn reshape_table(long: DataFrame, config: &ReshapeConfig) -> Result<WideTable> {
    let resolver = ColumnResolver::new(config.columns.clone());
    let columns = resolve_pivot_columns(&long, config, &resolver)?;
    debug!("Pivot columns: {:?}", columns);

    let table = pivot_wide(long, &columns)?;
    let labels = PollutantLabels::build(&table.pollutants, config.label_scheme)?;
    let frame = labels.apply(table)?;

    Ok(WideTable {
        frame,
        date_column: columns.date,
        location_columns: columns.locations,
        labels,
    })
}
