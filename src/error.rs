//! Error types for blockport operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while converting or migrating content.
///
/// Content conversion itself never surfaces these to callers of
/// [`parse_blocks`](crate::import::parse_blocks) or
/// [`extract_media`](crate::media::extract_media); they are used by the
/// internal fallible steps and by the I/O-facing batch and config layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("document nesting too deep: {0} levels")]
    NestingTooDeep(usize),

    #[error("worker pool error: {0}")]
    Worker(String),

    #[error("batch cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
