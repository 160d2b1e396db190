//! Source discovery for cleaning runs
//!
//! Expands the user's input arguments into an ordered list of source
//! tables. Plain files are kept as given, directories are walked for CSV
//! files, and arguments containing glob metacharacters are expanded as
//! patterns. Argument order is the selection order; within a directory or
//! pattern, files are sorted by path.

use crate::constants::SOURCE_EXTENSION;
use crate::error::{AqsError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expands input arguments into source files
#[derive(Debug)]
pub struct SourceDiscovery {
    inputs: Vec<PathBuf>,
}

impl SourceDiscovery {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self { inputs }
    }

    /// Discover sources in selection order, without duplicates.
    ///
    /// Paths that do not exist and are not patterns are passed through so
    /// the loader reports them as failed sources.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut seen = HashSet::new();
        let mut sources = Vec::new();

        for input in &self.inputs {
            let expanded = if input.is_dir() {
                discover_directory(input)
            } else if is_pattern(input) {
                discover_pattern(input)?
            } else {
                vec![input.clone()]
            };

            if expanded.is_empty() {
                warn!("No source files found for input: {}", input.display());
            }

            for path in expanded {
                if seen.insert(path.clone()) {
                    sources.push(path);
                } else {
                    debug!("Skipping duplicate source: {}", path.display());
                }
            }
        }

        debug!("Discovered {} source files", sources.len());
        Ok(sources)
    }
}

fn discover_directory(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

fn discover_pattern(pattern: &Path) -> Result<Vec<PathBuf>> {
    let pattern_str = pattern.to_string_lossy();
    let paths = glob::glob(&pattern_str).map_err(|e| AqsError::Configuration {
        message: format!("invalid input pattern '{}': {}", pattern_str, e),
    })?;

    let mut files: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable match for '{}': {}", pattern_str, e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    Ok(files)
}

fn is_pattern(path: &Path) -> bool {
    path.to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}

/// Check if a path has the source extension (case-insensitive)
fn is_source_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "Date Local,Arithmetic Mean\n").unwrap();
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_directory_is_walked_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("downloads");
        touch(&root.join("daily_pm10.csv"));
        touch(&root.join("2024").join("daily_no2.CSV"));
        touch(&root.join("daily_88101.csv"));
        fs::write(root.join("notes.txt"), "ignore me").unwrap();

        let sources = SourceDiscovery::new(vec![root]).discover().unwrap();

        assert_eq!(
            file_names(&sources),
            vec!["daily_no2.CSV", "daily_88101.csv", "daily_pm10.csv"]
        );
    }

    #[test]
    fn test_argument_order_is_selection_order() {
        let temp_dir = TempDir::new().unwrap();
        let pm25 = temp_dir.path().join("pm25.csv");
        let no2 = temp_dir.path().join("no2.csv");
        touch(&pm25);
        touch(&no2);

        let sources = SourceDiscovery::new(vec![pm25.clone(), no2.clone(), pm25.clone()])
            .discover()
            .unwrap();

        assert_eq!(sources, vec![pm25, no2]);
    }

    #[test]
    fn test_glob_pattern_expansion() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("hourly_no2_2024.csv"));
        touch(&temp_dir.path().join("hourly_no2_2023.csv"));
        touch(&temp_dir.path().join("daily_no2_2024.csv"));

        let pattern = temp_dir.path().join("hourly_*.csv");
        let sources = SourceDiscovery::new(vec![pattern]).discover().unwrap();

        assert_eq!(
            file_names(&sources),
            vec!["hourly_no2_2023.csv", "hourly_no2_2024.csv"]
        );
    }

    #[test]
    fn test_missing_file_passes_through() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.csv");

        let sources = SourceDiscovery::new(vec![missing.clone()]).discover().unwrap();
        assert_eq!(sources, vec![missing]);
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let result = SourceDiscovery::new(vec![PathBuf::from("data/[unclosed.csv")]).discover();
        assert!(matches!(result, Err(AqsError::Configuration { .. })));
    }
}
