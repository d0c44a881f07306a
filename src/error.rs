use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures talking to the processing backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with an `{"error": ...}` body or an error status.
    #[error("{0}")]
    Backend(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response from backend: {0}")]
    Decode(String),

    #[error("Could not read upload file: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejections raised locally, before an upload touches the network.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Please upload a CSV file")]
    InvalidFileType,

    #[error("Could not read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("TIMESTAMP column not found in CSV")]
    MissingTimestampColumn,

    #[error("No Strain(n) columns found in CSV")]
    NoStrainColumns,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DataError {
    #[error("timestamp column has {timestamps} samples but value column has {values}")]
    LengthMismatch { timestamps: usize, values: usize },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
