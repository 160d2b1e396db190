//! Long-to-wide pivot.
//!
//! Groups the long table by location and date and spreads the pollutant
//! key into one column per distinct pollutant. Each cell is the mean of
//! the non-null values observed for that group and pollutant, so duplicate
//! observations collapse into a single row.

use crate::error::Result;
use crate::normalize::{calendar_dates, rounded_numeric, text_cells};
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

/// Columns driving a pivot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotColumns {
    pub date: String,
    pub value: String,
    /// Column whose distinct values become output columns
    pub key: String,
    /// Present location columns in grouping order
    pub locations: Vec<String>,
}

impl PivotColumns {
    /// Grouping columns: locations followed by the date
    pub fn grouping(&self) -> Vec<String> {
        let mut grouping = self.locations.clone();
        grouping.push(self.date.clone());
        grouping
    }
}

/// Result of a pivot, before labeling
#[derive(Debug, Clone)]
pub struct PivotTable {
    /// Grouping columns followed by one column per pollutant (named by pollutant)
    pub frame: DataFrame,
    pub columns: PivotColumns,
    /// Distinct pollutant names, sorted ascending
    pub pollutants: Vec<String>,
}

/// Pivot `df` into one row per distinct grouping tuple.
///
/// Dates are reduced to calendar dates and values are rounded to three
/// decimals before grouping; unparsable cells become nulls. Null grouping
/// values form their own group. Rows without a pivot key cannot be placed
/// in any pollutant column and are dropped. Output rows are sorted by the
/// grouping tuple.
pub fn pivot_wide(mut df: DataFrame, columns: &PivotColumns) -> Result<PivotTable> {
    let dates = calendar_dates(df.column(&columns.date)?)?;
    df.with_column(dates)?;

    let values = rounded_numeric(df.column(&columns.value)?)?;
    df.with_column(values)?;

    let keys = text_cells(df.column(&columns.key)?)?;
    let pollutants: Vec<String> = keys
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let unkeyed = keys.iter().filter(|key| key.is_none()).count();
    let keyed: BooleanChunked = keys.iter().map(Option::is_some).collect();
    df.with_column(Series::new(columns.key.as_str().into(), keys))?;
    let df = if unkeyed > 0 {
        debug!("Dropping {} rows without a '{}' value", unkeyed, columns.key);
        df.filter(&keyed)?
    } else {
        df
    };

    let grouping: Vec<Expr> = columns
        .grouping()
        .iter()
        .map(|name| col(name.as_str()))
        .collect();

    let cells: Vec<Expr> = pollutants
        .iter()
        .map(|pollutant| {
            col(columns.value.as_str())
                .filter(col(columns.key.as_str()).eq(lit(pollutant.as_str())))
                .mean()
                .alias(pollutant.as_str())
        })
        .collect();

    let rows_in = df.height();
    let frame = df
        .lazy()
        .group_by_stable(grouping.clone())
        .agg(cells)
        .sort_by_exprs(grouping, SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    debug!(
        "Pivoted {} rows into {} wide rows with {} pollutant columns",
        rows_in,
        frame.height(),
        pollutants.len()
    );

    Ok(PivotTable {
        frame,
        columns: columns.clone(),
        pollutants,
    })
}
