//! Crate error type
//!
//! Load-time failures only. Once a stage is validated, ticking never fails.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while loading stages, tuning or progress
#[derive(Debug, Error)]
pub enum Error {
    /// The stage table could not be turned into a consistent set of room grids
    #[error("malformed stage data in `{stage}`: {detail}")]
    MalformedStageData { stage: String, detail: String },

    /// A stage or room the caller asked for does not exist
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// Actor built with a non-positive extent
    #[error("invalid actor size {width}x{height}")]
    InvalidActor { width: i32, height: i32 },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for stage-data failures
    pub fn malformed(stage: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedStageData {
            stage: stage.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
