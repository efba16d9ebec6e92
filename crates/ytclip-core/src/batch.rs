//! Batch file dispatch

use crate::classify::{TargetUrl, UrlKind};
use crate::error::BatchError;
use crate::pipeline::{Pipeline, RunSummary};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Non-blank lines of a batch file, trimmed, in file order
pub fn batch_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines().map(str::trim).filter(|line| !line.is_empty())
}

impl Pipeline<'_> {
    /// Process every URL listed in `path`, one line at a time.
    ///
    /// Only a missing or unreadable file is an error; per-line failures are
    /// logged and counted in the summary.
    pub async fn process_batch_file(&self, path: &Path) -> Result<RunSummary, BatchError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("Batch file not found: {}", path.display());
                return Err(BatchError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                error!("Failed to read batch file {}: {}", path.display(), source);
                return Err(BatchError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let lines: Vec<&str> = batch_lines(&content).collect();
        info!("Batch file {} lists {} URLs", path.display(), lines.len());

        let mut summary = RunSummary::default();
        for (idx, line) in lines.into_iter().enumerate() {
            let target = TargetUrl::from_batch_line(line);
            debug!("Batch line {}: {} ({})", idx + 1, target.raw, target.kind);
            match target.kind {
                UrlKind::Invalid => {
                    warn!("Skipping invalid URL: {}", target.raw);
                    summary.skipped += 1;
                }
                UrlKind::Playlist => {
                    let report = self.process_playlist_target(target).await;
                    summary.merge(report.summary());
                }
                UrlKind::Single => {
                    let outcome = self.process_target(target).await;
                    summary.record(&outcome);
                }
            }
        }

        info!("Batch complete: {}", summary);
        Ok(summary)
    }
}
