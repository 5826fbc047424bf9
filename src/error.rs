//! Error types for the output generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Corrupt record {key}: {message}")]
    Corrupt { key: String, message: String },

    #[error("Invalid frame identifier: {0}")]
    InvalidFrameId(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Image dimension probe failure
#[derive(Debug, Error)]
#[error("Failed to read image dimensions from {path:?}: {message}")]
pub struct ProbeError {
    pub path: PathBuf,
    pub message: String,
}

/// Output product write failures
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Output product already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("Invalid output request: {0}")]
    InvalidRequest(String),

    #[error("Failed to encode product metadata: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors scoped to a single frame.
///
/// These never escape the per-frame boundary of the pipeline; they are collected
/// into the batch report instead.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame not found in catalog")]
    FrameNotFound,

    #[error("Frame catalog lookup failed: {0}")]
    Catalog(#[source] StorageError),

    #[error("Registration fetch failed: {0}")]
    RegistrationFetch(#[source] StorageError),

    #[error("Image probe failed: {0}")]
    ImageProbe(#[from] ProbeError),

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Output write failed: {0}")]
    WriteFailure(#[source] WriteError),

    #[error("Source image cleanup failed for {path:?}: {source}")]
    CleanupFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Commit failed: {0}")]
    CommitFailure(#[source] StorageError),
}

impl FrameError {
    /// Short stable name of the error kind, used in reports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FrameError::FrameNotFound => "frame_not_found",
            FrameError::Catalog(_) => "catalog",
            FrameError::RegistrationFetch(_) => "registration_fetch",
            FrameError::ImageProbe(_) => "image_probe",
            FrameError::DataIntegrity(_) => "data_integrity",
            FrameError::WriteFailure(_) => "write_failure",
            FrameError::CleanupFailure { .. } => "cleanup_failure",
            FrameError::CommitFailure(_) => "commit_failure",
        }
    }
}

/// Run-level errors. Only these abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            err.to_string(),
        ))
    }
}

/// Render an error with its full `source()` chain on one line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let text = cause.to_string();
        // thiserror messages often already embed the direct cause
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        current = cause.source();
    }
    out
}
