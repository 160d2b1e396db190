//! Column role resolution.
//!
//! Maps a table's actual column names onto the semantic roles the
//! pipelines need, using the priority lists in [`ColumnPriorities`]. The
//! resolver never inspects cell values and never mutates the table.

use crate::config::ColumnPriorities;
use crate::error::{AqsError, Result};
use crate::models::ColumnRole;
use polars::prelude::DataFrame;
use std::collections::HashSet;
use tracing::debug;

/// Column name chosen for each role, `None` when unresolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub date: Option<String>,
    pub value: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub site: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl ResolvedColumns {
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Date => self.date.as_deref(),
            ColumnRole::Value => self.value.as_deref(),
            ColumnRole::State => self.state.as_deref(),
            ColumnRole::County => self.county.as_deref(),
            ColumnRole::City => self.city.as_deref(),
            ColumnRole::Site => self.site.as_deref(),
            ColumnRole::Latitude => self.latitude.as_deref(),
            ColumnRole::Longitude => self.longitude.as_deref(),
        }
    }

    /// Present location columns in grouping order (state ... longitude)
    pub fn location_columns(&self) -> Vec<String> {
        ColumnRole::LOCATION_ROLES
            .iter()
            .filter_map(|role| self.get(*role).map(str::to_string))
            .collect()
    }
}

/// Resolves semantic roles against a set of column names
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    priorities: ColumnPriorities,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new(ColumnPriorities::default())
    }
}

impl ColumnResolver {
    pub fn new(priorities: ColumnPriorities) -> Self {
        Self { priorities }
    }

    pub fn priorities(&self) -> &ColumnPriorities {
        &self.priorities
    }

    /// First candidate for `role` present in `columns`
    pub fn resolve_role<S: AsRef<str>>(&self, columns: &[S], role: ColumnRole) -> Option<String> {
        let present: HashSet<&str> = columns.iter().map(|c| c.as_ref()).collect();
        self.priorities
            .candidates(role)
            .iter()
            .find(|candidate| present.contains(candidate.as_str()))
            .cloned()
    }

    /// Resolve every role against a column name list
    pub fn resolve_names<S: AsRef<str>>(&self, columns: &[S]) -> ResolvedColumns {
        let resolved = ResolvedColumns {
            date: self.resolve_role(columns, ColumnRole::Date),
            value: self.resolve_role(columns, ColumnRole::Value),
            state: self.resolve_role(columns, ColumnRole::State),
            county: self.resolve_role(columns, ColumnRole::County),
            city: self.resolve_role(columns, ColumnRole::City),
            site: self.resolve_role(columns, ColumnRole::Site),
            latitude: self.resolve_role(columns, ColumnRole::Latitude),
            longitude: self.resolve_role(columns, ColumnRole::Longitude),
        };
        debug!("Resolved columns: {:?}", resolved);
        resolved
    }

    /// Resolve every role against a frame's header
    pub fn resolve(&self, df: &DataFrame) -> ResolvedColumns {
        self.resolve_names(&column_names(df))
    }

    /// Resolve a role that the caller cannot proceed without.
    ///
    /// An explicit override must name a present column and takes
    /// precedence; otherwise the first priority-list match is used.
    /// Anything else is a [`AqsError::MissingColumn`] naming the role.
    pub fn require(
        &self,
        df: &DataFrame,
        role: ColumnRole,
        override_column: Option<&str>,
        stage: &'static str,
    ) -> Result<String> {
        let columns = column_names(df);
        if let Some(name) = override_column {
            return if columns.iter().any(|c| c == name) {
                Ok(name.to_string())
            } else {
                Err(AqsError::override_missing(stage, role.name(), name))
            };
        }

        self.resolve_role(&columns, role).ok_or_else(|| {
            let candidates: Vec<&str> = self
                .priorities
                .candidates(role)
                .iter()
                .map(String::as_str)
                .collect();
            AqsError::unresolved(stage, role.name(), &candidates)
        })
    }

    /// Ensure the pivot key column is present and return its name
    pub fn require_pivot_key(&self, df: &DataFrame, stage: &'static str) -> Result<String> {
        let key = &self.priorities.pivot_key;
        if df.get_column_index(key).is_some() {
            Ok(key.clone())
        } else {
            Err(AqsError::MissingColumn {
                stage,
                role: "pivot key".to_string(),
                detail: format!("'{}' not present (run the cleaner first)", key),
            })
        }
    }
}

/// Owned copy of a frame's column names
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_first_candidate_wins() {
        let resolver = ColumnResolver::default();
        let columns = ["Date GMT", "Date Local", "Lat", "Site Latitude"];

        assert_eq!(
            resolver.resolve_role(&columns, ColumnRole::Date).as_deref(),
            Some("Date Local")
        );
        assert_eq!(
            resolver
                .resolve_role(&columns, ColumnRole::Latitude)
                .as_deref(),
            Some("Site Latitude")
        );
        assert_eq!(resolver.resolve_role(&columns, ColumnRole::State), None);
    }

    #[test]
    fn test_location_columns_follow_grouping_order() {
        let resolver = ColumnResolver::default();
        let columns = ["Longitude", "City Name", "State", "Site Number", "Latitude"];
        let resolved = resolver.resolve_names(&columns);

        assert_eq!(
            resolved.location_columns(),
            vec!["State", "City Name", "Site Number", "Latitude", "Longitude"]
        );
        assert_eq!(resolved.county, None);
    }

    #[test]
    fn test_override_takes_precedence_over_priority_list() {
        let df = df!("Arithmetic Mean" => [1.0], "1st Max Value" => [3.0]).unwrap();
        let resolver = ColumnResolver::default();

        assert_eq!(
            resolver
                .require(&df, ColumnRole::Value, None, "reshape")
                .unwrap(),
            "Arithmetic Mean"
        );
        assert_eq!(
            resolver
                .require(&df, ColumnRole::Value, Some("1st Max Value"), "reshape")
                .unwrap(),
            "1st Max Value"
        );
    }

    #[test]
    fn test_require_uses_override_when_unresolved() {
        let df = df!("Day" => ["2025-01-10"], "1st Max Value" => [3.0]).unwrap();
        let resolver = ColumnResolver::default();

        let value = resolver
            .require(&df, ColumnRole::Value, Some("1st Max Value"), "reshape")
            .unwrap();
        assert_eq!(value, "1st Max Value");

        let err = resolver
            .require(&df, ColumnRole::Date, None, "reshape")
            .unwrap_err();
        match err {
            AqsError::MissingColumn { stage, role, .. } => {
                assert_eq!(stage, "reshape");
                assert_eq!(role, "date");
            }
            other => panic!("Expected MissingColumn error, got {:?}", other),
        }

        let err = resolver
            .require(&df, ColumnRole::Date, Some("Sample Date"), "reshape")
            .unwrap_err();
        assert!(err.to_string().contains("Sample Date"));
    }

    #[test]
    fn test_require_pivot_key() {
        let resolver = ColumnResolver::default();
        let without = df!("Date" => ["2025-01-10"]).unwrap();
        let with = df!("Pollutant Name" => ["NO2"]).unwrap();

        assert!(matches!(
            resolver.require_pivot_key(&without, "reshape"),
            Err(AqsError::MissingColumn { .. })
        ));
        assert_eq!(
            resolver.require_pivot_key(&with, "reshape").unwrap(),
            "Pollutant Name"
        );
    }
}
