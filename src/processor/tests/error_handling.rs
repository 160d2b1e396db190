//! Error handling tests

use super::{DAILY_PM25_CSV, write_source};
use crate::config::{CleanerConfig, FilterSpec, ReshapeConfig};
use crate::error::AqsError;
use crate::models::LabelScheme;
use crate::processor::writer::MemorySink;
use crate::processor::{CleaningProcessor, ReshapeProcessor};
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let result = CleaningProcessor::new(CleanerConfig::default());

    match result.unwrap_err() {
        AqsError::Configuration { message } => {
            assert!(message.contains("source"));
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[tokio::test]
async fn test_all_sources_failing() {
    let temp_dir = TempDir::new().unwrap();
    let config = CleanerConfig::default().with_sources(vec![
        temp_dir.path().join("missing_pm25.csv"),
        temp_dir.path().join("missing_no2.csv"),
    ]);
    let processor = CleaningProcessor::new(config).unwrap();

    let mut sink = MemorySink::new();
    let result = processor.process_into(&mut sink).await;

    match result.unwrap_err() {
        AqsError::NoUsableSources { reason } => {
            assert!(reason.contains('2'));
        }
        _ => panic!("Expected NoUsableSources error"),
    }
    assert!(sink.tables.is_empty());
}

#[tokio::test]
async fn test_invalid_csv_source_is_counted() {
    let temp_dir = TempDir::new().unwrap();
    let good = write_source(temp_dir.path(), "daily_pm25.csv", DAILY_PM25_CSV);
    let empty = write_source(temp_dir.path(), "daily_no2.csv", "");

    let config = CleanerConfig::default().with_sources(vec![good, empty]);
    let mut sink = MemorySink::new();
    let stats = CleaningProcessor::new(config)
        .unwrap()
        .process_into(&mut sink)
        .await
        .unwrap();

    assert_eq!(stats.sources_loaded, 1);
    assert_eq!(stats.sources_failed, 1);
    assert_eq!(stats.rows_out, 2);
}

#[tokio::test]
async fn test_malformed_coordinates_abort_cleaning() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(temp_dir.path(), "daily_pm25.csv", DAILY_PM25_CSV);

    let config = CleanerConfig::default()
        .with_sources(vec![source])
        .with_filter(FilterSpec::new("coordinates", "39.290 -76.610"));
    let mut sink = MemorySink::new();
    let result = CleaningProcessor::new(config)
        .unwrap()
        .process_into(&mut sink)
        .await;

    match result.unwrap_err() {
        AqsError::InvalidFilter { keyword, .. } => {
            assert_eq!(keyword, "39.290 -76.610");
        }
        _ => panic!("Expected InvalidFilter error"),
    }
    assert!(sink.tables.is_empty());
}

#[tokio::test]
async fn test_reshape_missing_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("absent.csv");
    let processor = ReshapeProcessor::new(ReshapeConfig::default().with_input(&input)).unwrap();

    let mut sink = MemorySink::new();
    match processor.process_into(&mut sink).await.unwrap_err() {
        AqsError::SourceRead { path, .. } => assert_eq!(path, input),
        _ => panic!("Expected SourceRead error"),
    }
}

#[tokio::test]
async fn test_reshape_without_pollutant_column_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    // Raw download that never went through the cleaner
    let raw = write_source(temp_dir.path(), "daily_pm25.csv", DAILY_PM25_CSV);
    let processor = ReshapeProcessor::new(ReshapeConfig::default().with_input(raw)).unwrap();

    let mut sink = MemorySink::new();
    match processor.process_into(&mut sink).await.unwrap_err() {
        AqsError::MissingColumn { stage, role, .. } => {
            assert_eq!(stage, "reshape");
            assert_eq!(role, "pivot key");
        }
        _ => panic!("Expected MissingColumn error"),
    }
    assert!(sink.tables.is_empty());
}

#[tokio::test]
async fn test_too_many_pollutants_for_sequential_labels() {
    let temp_dir = TempDir::new().unwrap();
    let mut contents = String::from("Pollutant Name,Date Local,Arithmetic Mean\n");
    for i in 0..9 {
        contents.push_str(&format!("P{},2025-01-10,{}.0\n", i, i));
    }
    let input = write_source(temp_dir.path(), "many.csv", &contents);

    let sequential = ReshapeProcessor::new(ReshapeConfig::default().with_input(&input)).unwrap();
    let mut sink = MemorySink::new();
    match sequential.process_into(&mut sink).await.unwrap_err() {
        AqsError::TooManyPollutants { found, max } => {
            assert_eq!(found, 9);
            assert_eq!(max, 8);
        }
        _ => panic!("Expected TooManyPollutants error"),
    }

    let direct = ReshapeProcessor::new(
        ReshapeConfig::default()
            .with_input(PathBuf::from(&input))
            .with_label_scheme(LabelScheme::Direct),
    )
    .unwrap();
    let mut sink = MemorySink::new();
    let stats = direct.process_into(&mut sink).await.unwrap();
    assert_eq!(stats.rows_out, 1);
}
