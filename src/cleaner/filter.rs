//! Location filtering for cleaned batches.
//!
//! Text predicates (`state`, `city`, `county`, `site`) are case-insensitive
//! substring matches against the resolved column for that role. The
//! `coordinates` predicate compares latitude and longitude rounded to three
//! decimals. Unknown filter kinds and absent target columns leave the
//! table untouched; a malformed coordinate keyword is an error.

use crate::config::FilterSpec;
use crate::error::{AqsError, Result};
use crate::models::ColumnRole;
use crate::normalize::{round_measurement, rounded_numeric, text_cells};
use crate::schema::ColumnResolver;
use polars::prelude::*;
use tracing::{debug, warn};

/// Predicate selected by a filter keyword type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    State,
    City,
    County,
    Site,
    Coordinates,
}

impl FilterKind {
    /// Parse a keyword type; `None` for anything unrecognised
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "state" => Some(FilterKind::State),
            "city" => Some(FilterKind::City),
            "county" => Some(FilterKind::County),
            "site" => Some(FilterKind::Site),
            "coordinates" => Some(FilterKind::Coordinates),
            _ => None,
        }
    }

    fn role(&self) -> Option<ColumnRole> {
        match self {
            FilterKind::State => Some(ColumnRole::State),
            FilterKind::City => Some(ColumnRole::City),
            FilterKind::County => Some(ColumnRole::County),
            FilterKind::Site => Some(ColumnRole::Site),
            FilterKind::Coordinates => None,
        }
    }
}

/// Parse a `"<lat>, <lon>"` keyword
pub fn parse_coordinates(keyword: &str) -> Result<(f64, f64)> {
    let invalid = |reason: &str| AqsError::InvalidFilter {
        keyword: keyword.to_string(),
        reason: format!("{} (expected format: 39.290, -76.610)", reason),
    };

    let parts: Vec<&str> = keyword.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(invalid("expected exactly one comma"));
    }

    let lat: f64 = parts[0]
        .parse()
        .map_err(|_| invalid("latitude is not a number"))?;
    let lon: f64 = parts[1]
        .parse()
        .map_err(|_| invalid("longitude is not a number"))?;

    if !lat.is_finite() || !lon.is_finite() {
        return Err(invalid("coordinates must be finite"));
    }
    Ok((lat, lon))
}

/// Apply `spec` to `df`.
///
/// Returns the input unchanged for an unknown kind or when the target
/// column is absent. Rows with a missing target cell never match.
pub fn apply_filter(
    df: DataFrame,
    spec: &FilterSpec,
    resolver: &ColumnResolver,
) -> Result<DataFrame> {
    let Some(kind) = FilterKind::parse(&spec.kind) else {
        warn!("Unknown filter type '{}', leaving table unfiltered", spec.kind);
        return Ok(df);
    };

    let resolved = resolver.resolve(&df);
    let mask = match kind.role() {
        Some(role) => {
            let Some(column) = resolved.get(role) else {
                warn!("No {} column present, leaving table unfiltered", role);
                return Ok(df);
            };
            text_mask(df.column(column)?, &spec.keyword)?
        }
        None => {
            let (lat, lon) = parse_coordinates(&spec.keyword)?;
            let (Some(lat_column), Some(lon_column)) = (
                resolved.get(ColumnRole::Latitude),
                resolved.get(ColumnRole::Longitude),
            ) else {
                warn!("Latitude/longitude columns not present, leaving table unfiltered");
                return Ok(df);
            };
            coordinate_mask(df.column(lat_column)?, df.column(lon_column)?, lat, lon)?
        }
    };

    let filtered = df.filter(&mask)?;
    debug!(
        "Filter {:?} '{}' kept {} of {} rows",
        kind,
        spec.keyword,
        filtered.height(),
        df.height()
    );
    Ok(filtered)
}

fn text_mask(column: &Column, keyword: &str) -> Result<BooleanChunked> {
    let needle = keyword.trim().to_lowercase();
    Ok(text_cells(column)?
        .iter()
        .map(|cell| {
            cell.as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        })
        .collect())
}

fn coordinate_mask(lat: &Column, lon: &Column, target_lat: f64, target_lon: f64) -> Result<BooleanChunked> {
    let target_lat = round_measurement(target_lat);
    let target_lon = round_measurement(target_lon);
    let lats = rounded_numeric(lat)?;
    let lons = rounded_numeric(lon)?;

    Ok(lats
        .f64()?
        .into_iter()
        .zip(lons.f64()?.into_iter())
        .map(|(lat, lon)| lat == Some(target_lat) && lon == Some(target_lon))
        .collect())
}
