//! Error taxonomy for loading, enriching and reporting trip data.
//!
//! A station join-miss is deliberately absent here: it is a normal outcome of
//! enrichment and is represented by a trip without metrics.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BikeshareError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read delimited row: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot cast field `{field}` value {value:?} on line {line}: {reason}")]
    Format {
        field: String,
        value: String,
        line: u64,
        reason: String,
    },
    #[error("Line {line} has no column {index} ({name})")]
    MissingColumn {
        line: u64,
        index: usize,
        name: &'static str,
    },
    #[error("Line {line} has {found} fields but the header declares {expected}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Cast directive references `{0}`, which is not in the header")]
    UnknownCastField(String),
    #[error("Record has no field `{0}`")]
    MissingKey(String),
    #[error("Station `{0}` is not in the station table")]
    UnknownStation(String),
    #[error("Failed to render plot: {0}")]
    Plot(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BikeshareError>;

impl BikeshareError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BikeshareError::Io {
            path: path.into(),
            source,
        }
    }
}
