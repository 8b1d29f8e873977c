//! Error types for rust_chipseq

use thiserror::Error;

/// Main error type for ChIP-seq signal operations
#[derive(Error, Debug)]
pub enum ChipseqError {
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("Length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: String, got: String },

    #[error("Invalid feature: {reason}")]
    InvalidFeature { reason: String },

    #[error("Invalid row order: {reason}")]
    InvalidRowOrder { reason: String },

    #[error("Annotation lookup failed: {reason}")]
    Annotation { reason: String },

    #[error("Rendering failed: {reason}")]
    Render { reason: String },

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Result type alias for ChIP-seq signal operations
pub type Result<T> = std::result::Result<T, ChipseqError>;
