//! AQS Processor Library
//!
//! Cleans EPA Air Quality System (AQS) download files and reshapes them
//! into wide tables for analysis.
//!
//! The cleaning pipeline annotates each source with sample IDs and its
//! pollutant, combines the sources in selection order and optionally
//! filters by location. The reshaping pipeline pivots the cleaned long
//! table into one row per location and date with one column per
//! pollutant, labels those columns and exports one table or one table
//! per location.

pub mod cleaner;
pub mod cli {
    pub mod args;
    pub mod commands;
}
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod normalize;
pub mod processor;
pub mod reshape;
pub mod schema;

pub use config::{CleanerConfig, ReshapeConfig};
pub use error::{AqsError, Result};
pub use models::{PollutantKind, ProcessingStats};
pub use processor::{CleaningProcessor, ReshapeProcessor};
