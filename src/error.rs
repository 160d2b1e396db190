//! Error handling for cleaning and reshaping operations.
//!
//! Structural problems (missing columns, malformed filters, too many
//! pollutants for the label alphabet) are fatal and carry the stage and
//! column that triggered them. Cell-level parse failures never surface
//! here; they become nulls in the output.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AqsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("{stage}: required {role} column could not be resolved ({detail})")]
    MissingColumn {
        stage: &'static str,
        role: String,
        detail: String,
    },

    #[error("Invalid filter keyword '{keyword}': {reason}")]
    InvalidFilter { keyword: String, reason: String },

    #[error(
        "labeling: {found} distinct pollutants exceed the {max} sequential labels available; use direct labels instead"
    )]
    TooManyPollutants { found: usize, max: usize },

    #[error("Failed to read source {path}: {reason}")]
    SourceRead { path: PathBuf, reason: String },

    #[error("No usable sources: {reason}")]
    NoUsableSources { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AqsError {
    /// Missing-column error for a role with no candidate present in the table
    pub fn unresolved(stage: &'static str, role: impl Into<String>, candidates: &[&str]) -> Self {
        AqsError::MissingColumn {
            stage,
            role: role.into(),
            detail: if candidates.is_empty() {
                "no candidate names configured and no override given".to_string()
            } else {
                format!("none of [{}] present", candidates.join(", "))
            },
        }
    }

    /// Missing-column error for an explicit override that names an absent column
    pub fn override_missing(stage: &'static str, role: impl Into<String>, column: &str) -> Self {
        AqsError::MissingColumn {
            stage,
            role: role.into(),
            detail: format!("override column '{}' not found", column),
        }
    }
}

pub type Result<T> = std::result::Result<T, AqsError>;
