//! ytclip-core: Core pipeline for trimmed, tagged YouTube audio clips

pub mod backend;
pub mod batch;
pub mod classify;
pub mod clip;
pub mod config;
pub mod downloader;
pub mod error;
pub mod metadata;
pub mod pipeline;
mod process;

#[cfg(test)]
mod testing;

pub use backend::{MediaBackend, ToolBackend, TrackMetadata};
pub use config::{ClipLength, Config, JobSettings};
pub use error::{Result, YtClipError};
pub use pipeline::{ItemOutcome, Pipeline, PipelineStage, RunSummary};
