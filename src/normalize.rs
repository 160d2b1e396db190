//! Cell-level normalization shared by the cleaner and the reshaper.
//!
//! Numeric cells are coerced to `f64` and rounded to three fractional
//! digits with round-half-to-even applied to the scaled value. Date cells
//! are reduced to a calendar date. Unparsable cells become nulls; nothing
//! here fails on bad cell content.

use crate::constants::ROUNDING_DECIMALS;
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Round to three decimals, ties to even
pub fn round_measurement(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(ROUNDING_DECIMALS);
    (value * scale).round_ties_even() / scale
}

/// Parse a date cell, discarding any time of day
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Coerce a column to `f64`, nulling unparsable cells, and round every value
pub fn rounded_numeric(column: &Column) -> Result<Series> {
    let name = column.name().clone();
    let numeric = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    let rounded: Float64Chunked = numeric
        .f64()?
        .into_iter()
        .map(|v| v.map(round_measurement))
        .collect();

    Ok(rounded.with_name(name).into_series())
}

/// Reduce a column to a `Date` column, nulling unparsable cells
pub fn calendar_dates(column: &Column) -> Result<Series> {
    let name = column.name().clone();
    match column.dtype() {
        DataType::Date => return Ok(column.as_materialized_series().clone()),
        DataType::Datetime(_, _) => {
            return Ok(column.as_materialized_series().cast(&DataType::Date)?);
        }
        _ => {}
    }

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let text = column.as_materialized_series().cast(&DataType::String)?;

    let days: Int32Chunked = text
        .str()?
        .into_iter()
        .map(|cell| {
            cell.and_then(parse_calendar_date)
                .map(|date| (date - epoch).num_days() as i32)
        })
        .collect();

    Ok(days.with_name(name).into_series().cast(&DataType::Date)?)
}

/// Render every cell of a column as text; nulls stay `None`
pub fn text_cells(column: &Column) -> Result<Vec<Option<String>>> {
    let text = column.as_materialized_series().cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|cell| cell.map(str::to_string))
        .collect())
}

/// Replace characters that are unsafe in file names with `_`
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
