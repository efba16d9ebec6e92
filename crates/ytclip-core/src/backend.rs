//! The media capability the pipelines run against

use crate::clip::Clipper;
use crate::config::{Config, JobSettings};
use crate::downloader::Downloader;
use crate::error::{AcquireError, ListingError, ProcessError};
use crate::metadata::write_tags_blocking;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Title and artist written into a clip's tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
}

impl TrackMetadata {
    pub const FALLBACK_TITLE: &'static str = "Unknown Title";
    pub const FALLBACK_ARTIST: &'static str = "Unknown Artist";

    pub fn fallback() -> Self {
        Self {
            title: Self::FALLBACK_TITLE.to_string(),
            artist: Self::FALLBACK_ARTIST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistListing {
    pub title: Option<String>,
    /// Members in playlist order
    pub entries: Vec<PlaylistEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistEntry {
    pub id: Option<String>,
    pub title: Option<String>,
}

/// Download, metadata and tagging operations.
///
/// Metadata resolution cannot fail: implementations return
/// [`TrackMetadata::fallback`] instead.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn resolve_metadata(&self, url: &str) -> TrackMetadata;

    /// Produce one MP3 for `url` inside `settings.download_dir`
    async fn acquire(&self, url: &str, settings: &JobSettings) -> Result<PathBuf, AcquireError>;

    async fn list_playlist(&self, url: &str) -> Result<PlaylistListing, ListingError>;

    /// Trim to `settings.clip_length` and write title, artist and album
    async fn trim_and_tag(
        &self,
        path: &Path,
        metadata: &TrackMetadata,
        settings: &JobSettings,
    ) -> Result<(), ProcessError>;
}

/// yt-dlp for downloads and listings, FFmpeg for trimming, id3 for tags
#[derive(Debug)]
pub struct ToolBackend {
    downloader: Downloader,
    clipper: Clipper,
}

impl ToolBackend {
    pub fn new(yt_dlp_path: PathBuf, ffmpeg_path: PathBuf) -> Self {
        Self {
            downloader: Downloader::new(yt_dlp_path),
            clipper: Clipper::new(ffmpeg_path),
        }
    }

    /// Use configured or detected tool paths. A tool that cannot be found is
    /// looked up by name at call time so the failure surfaces per item.
    pub fn from_config(config: &Config) -> Self {
        let yt_dlp = config.yt_dlp_path().unwrap_or_else(|e| {
            warn!("{}; downloads will fail until it is installed", e);
            PathBuf::from("yt-dlp")
        });
        let ffmpeg = config.ffmpeg_path().unwrap_or_else(|e| {
            warn!("{}; trimming will fail until it is installed", e);
            PathBuf::from("ffmpeg")
        });
        Self::new(yt_dlp, ffmpeg)
    }
}

#[async_trait]
impl MediaBackend for ToolBackend {
    async fn resolve_metadata(&self, url: &str) -> TrackMetadata {
        match self.downloader.fetch_metadata(url).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                warn!("No title reported for {}, using fallback metadata", url);
                TrackMetadata::fallback()
            }
            Err(e) => {
                warn!("Metadata lookup failed for {}: {}", url, e);
                TrackMetadata::fallback()
            }
        }
    }

    async fn acquire(&self, url: &str, settings: &JobSettings) -> Result<PathBuf, AcquireError> {
        self.downloader
            .acquire(url, &settings.download_dir, settings.staging_root())
            .await
    }

    async fn list_playlist(&self, url: &str) -> Result<PlaylistListing, ListingError> {
        self.downloader.list_playlist(url).await
    }

    async fn trim_and_tag(
        &self,
        path: &Path,
        metadata: &TrackMetadata,
        settings: &JobSettings,
    ) -> Result<(), ProcessError> {
        self.clipper.trim(path, settings.clip_length).await?;
        write_tags_blocking(path, metadata, &settings.album).await?;
        debug!("Clip ready: {}", path.display());
        Ok(())
    }
}
