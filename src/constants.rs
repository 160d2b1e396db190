//! Application constants for the AQS processor
//!
//! Column vocabularies, deny-lists, label alphabets and naming conventions
//! for EPA AQS daily and hourly download files. These are the defaults
//! behind [`crate::config::ColumnPriorities`] and
//! [`crate::config::AnnotationRules`]; the pipeline reads them through
//! those structs rather than directly.

// =============================================================================
// Column Role Priorities
// =============================================================================

/// Candidate names for the observation date, in priority order
pub const DATE_CANDIDATES: &[&str] = &["Date", "Date Local", "Date Observed", "Date GMT"];

/// Candidate names for the pivoted measurement value
pub const VALUE_CANDIDATES: &[&str] = &["Arithmetic Mean"];

pub const STATE_CANDIDATES: &[&str] = &["State Name", "State"];
pub const COUNTY_CANDIDATES: &[&str] = &["County Name", "County"];
pub const CITY_CANDIDATES: &[&str] = &["City Name", "City"];
pub const SITE_CANDIDATES: &[&str] = &["Site Num", "Site Number"];
pub const LATITUDE_CANDIDATES: &[&str] = &["Latitude", "Site Latitude", "Lat"];
pub const LONGITUDE_CANDIDATES: &[&str] = &["Longitude", "Site Longitude", "Lon", "Long"];

// =============================================================================
// Annotation
// =============================================================================

/// Column inserted first by the annotator
pub const SAMPLE_ID_COLUMN: &str = "Sample ID";

/// Column inserted second by the annotator; also the reshaper's pivot key
pub const POLLUTANT_NAME_COLUMN: &str = "Pollutant Name";

/// Low-information columns removed during cleaning
pub const DENY_LIST_COLUMNS: &[&str] = &[
    "Pollutant Standard",
    "Date Last Change",
    "Event Type",
    "AQI",
    "CBSA",
    "Datum",
];

/// Metric columns coerced to numeric and rounded during cleaning
pub const NUMERIC_METRIC_COLUMNS: &[&str] =
    &["Arithmetic Mean", "1st Max Value", "1st Max Daily Value"];

/// Fractional digits kept for every rounded measurement
pub const ROUNDING_DECIMALS: i32 = 3;

/// Width of the zero-padded sample sequence number
pub const SAMPLE_SEQUENCE_WIDTH: usize = 4;

// =============================================================================
// Labels and Partitions
// =============================================================================

/// Letters available to the sequential label scheme
pub const SEQUENTIAL_LABEL_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Maximum partition name length (spreadsheet sheet-name limit)
pub const MAX_PARTITION_NAME_LEN: usize = 31;

/// Separator between key values in a partition name
pub const PARTITION_NAME_SEPARATOR: &str = "-";

/// Partition name used when the wide table has no location columns
pub const ALL_PARTITION_NAME: &str = "All";

/// Partition name used when every key value of a partition is missing
pub const UNNAMED_PARTITION_NAME: &str = "Sheet1";

// =============================================================================
// Output Naming
// =============================================================================

pub const CLEANED_SUFFIX: &str = "cleaned";
pub const WIDE_SUFFIX: &str = "wide";
pub const WIDE_BY_LOCATION_SUFFIX: &str = "wide_by_location";

/// Token used in cleaned file names when no pollutant is present
pub const UNKNOWN_POLLUTANT_TOKEN: &str = "Unknown";

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default number of sources read and annotated concurrently
pub const DEFAULT_MAX_CONCURRENT_SOURCES: usize = 4;

/// File extension picked up when a directory is given as input
pub const SOURCE_EXTENSION: &str = "csv";
