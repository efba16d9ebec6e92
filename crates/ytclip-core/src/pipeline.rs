//! Per-item and playlist orchestration

use crate::backend::MediaBackend;
use crate::classify::TargetUrl;
use crate::config::JobSettings;
use crate::error::{AcquireError, ItemError, ListingError};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// States of the single-item state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Classifying,
    ResolvingMetadata,
    AcquiringAudio,
    TrimmingAndTagging,
    Done,
    Aborted,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemState::Classifying => "classifying",
            ItemState::ResolvingMetadata => "resolving-metadata",
            ItemState::AcquiringAudio => "acquiring-audio",
            ItemState::TrimmingAndTagging => "trimming-and-tagging",
            ItemState::Done => "done",
            ItemState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Classifying { url: String },
    ResolvingMetadata,
    AcquiringAudio { title: String },
    TrimmingAndTagging { path: PathBuf },
    Complete { output: PathBuf, duration: Duration },
    Aborted { stage: ItemState, error: String },
    /// Emitted before each playlist member starts
    PlaylistMember { position: usize, total: usize },
}

impl PipelineStage {
    /// The item state this stage reports
    pub fn state(&self) -> Option<ItemState> {
        match self {
            PipelineStage::Classifying { .. } => Some(ItemState::Classifying),
            PipelineStage::ResolvingMetadata => Some(ItemState::ResolvingMetadata),
            PipelineStage::AcquiringAudio { .. } => Some(ItemState::AcquiringAudio),
            PipelineStage::TrimmingAndTagging { .. } => Some(ItemState::TrimmingAndTagging),
            PipelineStage::Complete { .. } => Some(ItemState::Done),
            PipelineStage::Aborted { .. } => Some(ItemState::Aborted),
            PipelineStage::PlaylistMember { .. } => None,
        }
    }
}

/// Terminal result of one item
#[derive(Debug)]
pub enum ItemOutcome {
    Done {
        url: String,
        path: PathBuf,
    },
    Aborted {
        url: String,
        /// State the item was in when it failed
        at: ItemState,
        error: ItemError,
        /// File left behind by a failed trim/tag step
        artifact: Option<PathBuf>,
    },
}

impl ItemOutcome {
    pub fn state(&self) -> ItemState {
        match self {
            ItemOutcome::Done { .. } => ItemState::Done,
            ItemOutcome::Aborted { .. } => ItemState::Aborted,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ItemOutcome::Done { url, .. } | ItemOutcome::Aborted { url, .. } => url,
        }
    }

    /// Whether an audio file exists for this item, tagged or not
    pub fn is_processed(&self) -> bool {
        self.artifact().is_some()
    }

    pub fn artifact(&self) -> Option<&Path> {
        match self {
            ItemOutcome::Done { path, .. } => Some(path),
            ItemOutcome::Aborted { artifact, .. } => artifact.as_deref(),
        }
    }
}

/// Counts over a single, playlist or batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub done: usize,
    /// Downloaded but not fully trimmed/tagged
    pub partial: usize,
    pub failed: usize,
    /// Invalid URLs and id-less playlist entries
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Done { .. } => self.done += 1,
            ItemOutcome::Aborted {
                error: ItemError::InvalidUrl(_),
                ..
            } => self.skipped += 1,
            ItemOutcome::Aborted {
                artifact: Some(_), ..
            } => self.partial += 1,
            ItemOutcome::Aborted { .. } => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: RunSummary) {
        self.done += other.done;
        self.partial += other.partial;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> usize {
        self.done + self.partial + self.failed + self.skipped
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} done, {} partial, {} failed, {} skipped",
            self.done, self.partial, self.failed, self.skipped
        )
    }
}

#[derive(Debug)]
pub enum PlaylistStatus {
    Completed,
    InvalidUrl,
    ListingFailed(ListingError),
}

#[derive(Debug)]
pub struct PlaylistReport {
    pub url: String,
    pub title: Option<String>,
    pub status: PlaylistStatus,
    /// Member outcomes in playlist order
    pub items: Vec<ItemOutcome>,
    pub skipped_entries: usize,
}

impl PlaylistReport {
    fn new(url: String, status: PlaylistStatus) -> Self {
        Self {
            url,
            title: None,
            status,
            items: Vec::new(),
            skipped_entries: 0,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            skipped: self.skipped_entries,
            ..RunSummary::default()
        };
        for item in &self.items {
            summary.record(item);
        }
        match self.status {
            PlaylistStatus::Completed => {}
            PlaylistStatus::InvalidUrl => summary.skipped += 1,
            PlaylistStatus::ListingFailed(_) => summary.failed += 1,
        }
        summary
    }
}

/// Canonical single-video URL for a playlist member id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Runs items one at a time against a [`MediaBackend`]
pub struct Pipeline<'a> {
    backend: &'a dyn MediaBackend,
    settings: &'a JobSettings,
    progress_tx: Option<mpsc::UnboundedSender<PipelineStage>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(backend: &'a dyn MediaBackend, settings: &'a JobSettings) -> Self {
        Self {
            backend,
            settings,
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, progress_tx: mpsc::UnboundedSender<PipelineStage>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub(crate) fn report(&self, stage: PipelineStage) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(stage);
        }
    }

    /// Classify, resolve metadata, download, then trim and tag one URL.
    ///
    /// Never returns an error: every failure ends in [`ItemOutcome::Aborted`].
    pub async fn process_item(&self, raw_url: &str) -> ItemOutcome {
        self.process_target(TargetUrl::parse(raw_url)).await
    }

    pub(crate) async fn process_target(&self, target: TargetUrl) -> ItemOutcome {
        let start_time = Instant::now();

        self.report(PipelineStage::Classifying {
            url: target.raw.clone(),
        });
        if !target.is_valid() {
            warn!("Skipping invalid URL: {}", target.raw);
            return self.abort(
                target.raw.clone(),
                ItemState::Classifying,
                ItemError::InvalidUrl(target.raw),
                None,
            );
        }

        let url = target.normalized;
        info!("Processing video: {}", url);

        self.report(PipelineStage::ResolvingMetadata);
        let metadata = self.backend.resolve_metadata(&url).await;
        debug!("Metadata: {} / {}", metadata.artist, metadata.title);

        self.report(PipelineStage::AcquiringAudio {
            title: metadata.title.clone(),
        });
        let path = match self.backend.acquire(&url, self.settings).await {
            Ok(path) => path,
            Err(e) => {
                error!("Failed video {}: {}", url, e);
                return self.abort(url, ItemState::AcquiringAudio, e.into(), None);
            }
        };
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            error!("MP3 not found at expected path: {}", path.display());
            return self.abort(
                url,
                ItemState::AcquiringAudio,
                AcquireError::MissingFile(path).into(),
                None,
            );
        }

        self.report(PipelineStage::TrimmingAndTagging { path: path.clone() });
        if let Err(e) = self
            .backend
            .trim_and_tag(&path, &metadata, self.settings)
            .await
        {
            error!("Failed to trim/tag {}: {}", path.display(), e);
            return self.abort(url, ItemState::TrimmingAndTagging, e.into(), Some(path));
        }

        let duration = start_time.elapsed();
        info!(
            "Trimmed & tagged: {} ({:.1}s)",
            path.display(),
            duration.as_secs_f32()
        );
        self.report(PipelineStage::Complete {
            output: path.clone(),
            duration,
        });

        ItemOutcome::Done { url, path }
    }

    fn abort(
        &self,
        url: String,
        at: ItemState,
        error: ItemError,
        artifact: Option<PathBuf>,
    ) -> ItemOutcome {
        self.report(PipelineStage::Aborted {
            stage: at,
            error: error.to_string(),
        });
        ItemOutcome::Aborted {
            url,
            at,
            error,
            artifact,
        }
    }

    /// Expand a playlist and process each member in order.
    ///
    /// Member failures are isolated; a failed listing skips the playlist.
    pub async fn process_playlist(&self, raw_url: &str) -> PlaylistReport {
        self.process_playlist_target(TargetUrl::parse(raw_url)).await
    }

    pub(crate) async fn process_playlist_target(&self, target: TargetUrl) -> PlaylistReport {
        if !target.is_valid() {
            warn!("Skipping invalid playlist URL: {}", target.raw);
            return PlaylistReport::new(target.raw, PlaylistStatus::InvalidUrl);
        }

        let url = target.normalized;
        info!("Fetching playlist: {}", url);

        let listing = match self.backend.list_playlist(&url).await {
            Ok(listing) => listing,
            Err(e) => {
                error!("Failed playlist {}: {}", url, e);
                return PlaylistReport::new(url, PlaylistStatus::ListingFailed(e));
            }
        };

        let total = listing.entries.len();
        info!(
            "Playlist '{}' has {} videos",
            listing.title.as_deref().unwrap_or(""),
            total
        );

        let mut report = PlaylistReport::new(url, PlaylistStatus::Completed);
        report.title = listing.title;

        for (idx, entry) in listing.entries.into_iter().enumerate() {
            let Some(id) = entry.id else {
                warn!(
                    "Playlist entry {} ({}) has no video id, skipping",
                    idx + 1,
                    entry.title.as_deref().unwrap_or("untitled")
                );
                report.skipped_entries += 1;
                continue;
            };

            self.report(PipelineStage::PlaylistMember {
                position: idx + 1,
                total,
            });
            let outcome = self.process_item(&watch_url(&id)).await;
            report.items.push(outcome);
        }

        report
    }
}
