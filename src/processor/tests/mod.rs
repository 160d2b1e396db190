//! Pipeline tests for the processor module
//!
//! Exercises both pipelines end to end against small AQS-style CSV
//! downloads written to temporary directories.

pub mod error_handling;

use std::fs;
use std::path::{Path, PathBuf};

/// Daily PM2.5 download for two Maryland sites
pub const DAILY_PM25_CSV: &str = "\
State Name,County Name,City Name,Site Num,Latitude,Longitude,Date Local,Arithmetic Mean,1st Max Value,AQI,Datum
Maryland,Baltimore (City),Baltimore,0040,39.2904,-76.6104,2025-01-10,9.8067,12.1,41,WGS84
Maryland,Baltimore,Essex,0013,39.3101,-76.4744,2025-01-10,7.1999,9.0,30,WGS84
";

/// Daily NO2 download covering the Baltimore site and a Virginia site
pub const DAILY_NO2_CSV: &str = "\
State Name,County Name,City Name,Site Num,Latitude,Longitude,Date Local,Arithmetic Mean,1st Max Value,Event Type
Maryland,Baltimore (City),Baltimore,0040,39.2904,-76.6104,2025-01-10,15.2,22.0,None
Virginia,Richmond City,Richmond,0005,37.5407,-77.436,2025-01-10,11.0,14.0,None
";

/// Write a source file into `dir` and return its path
pub fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
