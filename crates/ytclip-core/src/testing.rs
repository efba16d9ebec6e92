//! Scripted backend for pipeline tests

use crate::backend::{MediaBackend, PlaylistListing, TrackMetadata};
use crate::config::{ClipLength, Config, JobSettings};
use crate::error::{AcquireError, ListingError, ProcessError, ToolError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Metadata(String),
    Acquire(String),
    List(String),
    TrimAndTag {
        path: PathBuf,
        metadata: TrackMetadata,
        clip_seconds: u32,
        album: String,
    },
}

pub(crate) struct StubBackend {
    root: TempDir,
    calls: Mutex<Vec<Call>>,
    metadata_fails: bool,
    failing_urls: Vec<String>,
    missing_files: bool,
    trim_fails: bool,
    listing: Option<PlaylistListing>,
}

impl StubBackend {
    pub(crate) fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            calls: Mutex::new(Vec::new()),
            metadata_fails: false,
            failing_urls: Vec::new(),
            missing_files: false,
            trim_fails: false,
            listing: None,
        }
    }

    /// Settings whose download folder is this stub's scratch directory
    pub(crate) fn settings(&self) -> JobSettings {
        let mut config = Config::default();
        config.output.directory = self.root.path().to_path_buf();
        JobSettings::new(&config, ClipLength::DEFAULT)
    }

    pub(crate) fn root(&self) -> &Path {
        self.root.path()
    }

    pub(crate) fn fail_metadata(mut self) -> Self {
        self.metadata_fails = true;
        self
    }

    pub(crate) fn fail_acquire(mut self, url: &str) -> Self {
        self.failing_urls.push(url.to_string());
        self
    }

    /// Report a path from `acquire` without creating the file
    pub(crate) fn report_missing_files(mut self) -> Self {
        self.missing_files = true;
        self
    }

    pub(crate) fn fail_trim(mut self) -> Self {
        self.trim_fails = true;
        self
    }

    pub(crate) fn with_listing(mut self, listing: PlaylistListing) -> Self {
        self.listing = Some(listing);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// URLs passed to `acquire`, in call order
    pub(crate) fn acquired(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Acquire(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaBackend for StubBackend {
    async fn resolve_metadata(&self, url: &str) -> TrackMetadata {
        self.record(Call::Metadata(url.to_string()));
        if self.metadata_fails {
            TrackMetadata::fallback()
        } else {
            TrackMetadata {
                title: format!("Title of {}", url),
                artist: "Stub Artist".to_string(),
            }
        }
    }

    async fn acquire(&self, url: &str, settings: &JobSettings) -> Result<PathBuf, AcquireError> {
        self.record(Call::Acquire(url.to_string()));
        if self.failing_urls.iter().any(|u| u == url) {
            return Err(AcquireError::NoOutput);
        }

        let id = url.rsplit(['=', '/']).next().unwrap_or("track");
        let path = settings.download_dir.join(format!("{}.mp3", id));
        if !self.missing_files {
            std::fs::write(&path, b"stub audio")?;
        }
        Ok(path)
    }

    async fn list_playlist(&self, url: &str) -> Result<PlaylistListing, ListingError> {
        self.record(Call::List(url.to_string()));
        match &self.listing {
            Some(listing) => Ok(listing.clone()),
            None => Err(serde_json::from_str::<serde_json::Value>("{").unwrap_err().into()),
        }
    }

    async fn trim_and_tag(
        &self,
        path: &Path,
        metadata: &TrackMetadata,
        settings: &JobSettings,
    ) -> Result<(), ProcessError> {
        self.record(Call::TrimAndTag {
            path: path.to_path_buf(),
            metadata: metadata.clone(),
            clip_seconds: settings.clip_length.seconds(),
            album: settings.album.clone(),
        });
        if self.trim_fails {
            return Err(ToolError::Failed {
                tool: "ffmpeg",
                code: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
