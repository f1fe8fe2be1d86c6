//! Errors raised while reading, parsing and writing script data.

use thiserror::Error;

/// Data-level failures.
///
/// `MalformedRow` and `LabelParse` are recoverable: the loader logs them
/// and skips the row. The rest abort the run.
#[derive(Debug, Error)]
pub enum DataError {
    /// A raw training line did not split into the expected number of fields.
    #[error("Malformed row at line {line}: expected {expected} tab-separated fields, found {found}")]
    MalformedRow {
        line:     usize,
        expected: usize,
        found:    usize,
    },

    /// An emotions field could not be turned into six intensities.
    #[error("Cannot parse emotions '{value}': {reason}")]
    LabelParse {
        value:  String,
        reason: String,
    },

    /// A required column is missing from a file header.
    #[error("Column '{0}' not found in header")]
    MissingColumn(String),

    /// The submission template and the predictions disagree on row count.
    #[error("Row count mismatch: template has {expected} rows, got {actual} predictions")]
    RowCountMismatch {
        expected: usize,
        actual:   usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DataError {
    pub fn label_parse(value: &str, reason: impl Into<String>) -> Self {
        Self::LabelParse { value: value.to_string(), reason: reason.into() }
    }
}
