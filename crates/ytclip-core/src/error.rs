//! Error types for ytclip-core

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, YtClipError>;

#[derive(Error, Debug)]
pub enum YtClipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to run one of the external tools.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{tool} could not be started: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed with exit code {code:?}: {stderr}")]
    Failed {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },
}

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("yt-dlp reported the placeholder path NA")]
    PlaceholderPath,

    #[error("No audio file was produced")]
    NoOutput,

    #[error("Ambiguous output: {0} candidate audio files")]
    AmbiguousOutput(usize),

    #[error("Audio file missing at {0}")]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ListingError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Failed to parse playlist listing: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Trim failed: {0}")]
    Trim(#[from] ToolError),

    #[error("Tag write failed: {0}")]
    Tag(#[from] id3::Error),

    #[error("Tag writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single item did not reach the done state.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Acquisition failed: {0}")]
    Acquisition(#[from] AcquireError),

    #[error("Processing failed: {0}")]
    Processing(#[from] ProcessError),
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Batch file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read batch file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
