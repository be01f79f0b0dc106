use crate::types::frequency::Frequency;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherDataError {
    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode cache data from '{0}'")]
    CacheDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode cache data")]
    CacheEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to delete cache '{0}'")]
    CacheDeletion(PathBuf, #[source] std::io::Error),

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request to {url} still failing after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last_error: Box<WeatherDataError>,
    },

    #[error("Archive API rejected the request ({status}): {reason}")]
    Api {
        status: reqwest::StatusCode,
        reason: String,
    },

    #[error("Failed to parse archive response")]
    JsonParse(#[from] serde_json::Error),

    #[error("Archive response contained no locations")]
    NoLocationResults,

    #[error("Archive response has no {0} section")]
    MissingSection(Frequency),

    #[error("Requested {frequency} variable '{name}' is missing from the response")]
    MissingVariable { frequency: Frequency, name: String },

    #[error("The {0} section has an empty time axis")]
    EmptySection(Frequency),

    #[error("The {frequency} time axis is not evenly spaced at row {row}")]
    IrregularTimeAxis { frequency: Frequency, row: usize },

    #[error("Invalid time axis: interval {interval}s over [{start}, {end})")]
    InvalidInterval { start: i64, end: i64, interval: i64 },

    #[error("Column '{column}' has {found} values but the time axis has {expected} steps")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
