// src/utils/constants.rs

/// Cell values that mean "no data". They never add or remove evidence.
pub const ABSENT_VALUES: [&str; 7] = ["", "NONE", "#N/A", "NA", " ", "  ", "-"];

/// Combined field length that counts as one unit of evidence.
pub const LENGTH_SCALE_DIVISOR: f64 = 20.0;

/// Factor applied to a pair when two values are identical.
pub const EXACT_MATCH_FACTOR: f64 = 2.0;

/// Floor of the factor for partial matches; the edit similarity is added on top.
pub const PARTIAL_MATCH_BASE: f64 = 0.5;

pub const DEFAULT_TEXT_WEIGHT: f64 = 1.0;
pub const DEFAULT_TEXT_EXACT_MATCH_WEIGHT: f64 = 1.5;

/// Weights for the normalized registration code comparison.
pub const UEN_STRIPPED_WEIGHT: f64 = 3.0;
pub const UEN_STRIPPED_EXACT_MATCH_WEIGHT: f64 = 3.0;

/// Weights for the raw registration code comparison (exact matches only).
pub const UEN_RAW_WEIGHT: f64 = 0.0;
pub const UEN_RAW_EXACT_MATCH_WEIGHT: f64 = 4.0;

pub const DEFAULT_ID_COLUMN: usize = 1;
pub const DEFAULT_SOURCE_COLUMN: usize = 2;
pub const DEFAULT_COLUMNS: &str = "uen:3,text:4,text:5,text:6:0.5:0.5";
pub const DEFAULT_OUTPUT_PATH: &str = "output.csv";
pub const DEFAULT_SCORE_HEADER: &str = "Similarity Score";
