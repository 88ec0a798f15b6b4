//! Reading parcel attribute files produced by the upstream enrichment stage.

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::domain::ParcelAttributes;

/// A record that could not be decoded into parcel attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// CSV line number, or 1-based array position for JSON input.
    pub line: u64,
    pub message: String,
}

/// Decoded parcel attributes plus rows that failed to decode.
#[derive(Debug, Clone, Default)]
pub struct ParcelIntake {
    pub parcels: Vec<ParcelAttributes>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read parcel file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid parcel CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid parcel JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported parcel file extension '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),
}

/// Loads a `.csv` or `.json` parcel file.
pub fn load_parcels<P: AsRef<Path>>(path: P) -> Result<ParcelIntake, IntakeError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let file = std::fs::File::open(path)?;

    match extension.as_str() {
        "csv" => read_csv(file),
        "json" => read_json(file),
        other => Err(IntakeError::UnsupportedFormat(other.to_string())),
    }
}

/// Reads CSV rows. A row with undecodable values is skipped and reported; the rest still load.
pub fn read_csv<R: Read>(reader: R) -> Result<ParcelIntake, IntakeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut intake = ParcelIntake::default();

    for record in csv_reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if matches!(err.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                let line = err.position().map_or(0, |position| position.line());
                warn!(line, error = %err, "skipping ragged parcel row");
                intake.skipped.push(SkippedRow {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let line = record.position().map_or(0, |position| position.line());
        match record.deserialize::<ParcelAttributes>(Some(&headers)) {
            Ok(parcel) => intake.parcels.push(parcel),
            Err(err) => {
                warn!(line, error = %err, "skipping undecodable parcel row");
                intake.skipped.push(SkippedRow {
                    line,
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(intake)
}

/// Reads a JSON array of parcel attribute objects. Elements that do not decode are skipped
/// and reported by position; a document that is not an array fails outright.
pub fn read_json<R: Read>(reader: R) -> Result<ParcelIntake, IntakeError> {
    let elements: Vec<Value> = serde_json::from_reader(reader)?;
    let mut intake = ParcelIntake::default();

    for (index, element) in elements.into_iter().enumerate() {
        let line = index as u64 + 1;
        match serde_json::from_value::<ParcelAttributes>(element) {
            Ok(parcel) => intake.parcels.push(parcel),
            Err(err) => {
                warn!(line, error = %err, "skipping undecodable parcel record");
                intake.skipped.push(SkippedRow {
                    line,
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(intake)
}
