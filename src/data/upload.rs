use std::path::{Path, PathBuf};

use crate::api::models::UploadKind;
use crate::error::UploadError;

// ---------------------------------------------------------------------------
// Upload pre-flight
// ---------------------------------------------------------------------------

/// A CSV file that passed the local checks and can be sent to `/upload`.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub path: PathBuf,
    pub kind: UploadKind,
    /// Header row as read from the file.
    pub columns: Vec<String>,
}

impl UploadCandidate {
    /// Strain columns present in the header, e.g. `Strain(3)`.
    pub fn strain_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(|c| c.starts_with("Strain("))
    }
}

/// Check a file before uploading it.
///
/// Rules mirror what the backend enforces so the user gets the message
/// without a round trip:
/// * the file must have a `.csv` extension (case-insensitive)
/// * the header must contain a `TIMESTAMP` column
/// * a strain upload needs at least one `Strain(n)` column
pub fn preflight(path: &Path, kind: UploadKind) -> Result<UploadCandidate, UploadError> {
    if !is_csv(path) {
        return Err(UploadError::InvalidFileType);
    }

    let unreadable = |source| UploadError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(unreadable)?;
    let columns: Vec<String> = reader
        .headers()
        .map_err(unreadable)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if !columns.iter().any(|c| c == "TIMESTAMP") {
        return Err(UploadError::MissingTimestampColumn);
    }

    let candidate = UploadCandidate {
        path: path.to_path_buf(),
        kind,
        columns,
    };
    if kind == UploadKind::Strain && candidate.strain_columns().next().is_none() {
        return Err(UploadError::NoStrainColumns);
    }
    Ok(candidate)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}
