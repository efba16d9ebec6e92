//! YouTube audio downloader using yt-dlp

use crate::backend::{PlaylistEntry, PlaylistListing, TrackMetadata};
use crate::error::{AcquireError, ListingError, ToolError};
use crate::process::{run_captured, YT_DLP};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Literal yt-dlp prints for a template field it cannot fill
const PLACEHOLDER: &str = "NA";

#[derive(Debug)]
pub struct Downloader {
    yt_dlp_path: PathBuf,
}

/// JSON structure from yt-dlp --flat-playlist --dump-single-json
#[derive(Debug, Deserialize)]
struct PlaylistJson {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    entries: Vec<Option<EntryJson>>,
}

#[derive(Debug, Default, Deserialize)]
struct EntryJson {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl Downloader {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    /// Resolve title and uploader without downloading anything
    pub async fn fetch_metadata(&self, url: &str) -> Result<Option<TrackMetadata>, ToolError> {
        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args([
            "--skip-download",
            "--no-playlist",
            "--print",
            "%(title)s",
            "--print",
            "%(uploader)s",
            url,
        ]);

        let stdout = run_captured(YT_DLP, cmd).await?;
        Ok(parse_metadata_output(&stdout))
    }

    /// Download audio as MP3 into a private staging directory under
    /// `staging_root`, then move the single result into `dest_dir`.
    ///
    /// The staging directory is removed on every return path.
    pub async fn acquire(
        &self,
        url: &str,
        dest_dir: &Path,
        staging_root: &Path,
    ) -> Result<PathBuf, AcquireError> {
        info!("Downloading audio from: {}", url);

        tokio::fs::create_dir_all(staging_root).await?;
        let staging = tempfile::Builder::new()
            .prefix(".ytclip-staging-")
            .tempdir_in(staging_root)?;
        debug!("Staging directory: {}", staging.path().display());

        let output_template = staging.path().join("%(title)s.%(ext)s");

        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args([
            "--no-playlist",
            // Audio only, re-encoded to MP3 at best VBR quality
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--audio-quality",
            "0",
            // Report the final path once post-processing has moved it
            "--no-simulate",
            "--print",
            "after_move:filepath",
        ]);
        cmd.arg("-o").arg(&output_template).arg(url);

        let stdout = run_captured(YT_DLP, cmd).await?;

        let reported = stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last();
        if reported == Some(PLACEHOLDER) {
            return Err(AcquireError::PlaceholderPath);
        }

        let candidates = audio_candidates(staging.path())?;
        if let Some(reported) = reported {
            if !candidates.iter().any(|c| c.as_path() == Path::new(reported)) {
                debug!("Reported path {} not among staged files", reported);
            }
        }
        let chosen = select_artifact(candidates)?;
        let final_path = relocate(&chosen, dest_dir).await?;

        debug!("Downloaded to: {}", final_path.display());
        Ok(final_path)
    }

    /// List playlist members without resolving each video
    pub async fn list_playlist(&self, url: &str) -> Result<PlaylistListing, ListingError> {
        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.args(["--flat-playlist", "--dump-single-json", url]);

        let stdout = run_captured(YT_DLP, cmd).await?;
        Ok(parse_playlist_json(&stdout)?)
    }
}

/// Parse the two `--print` lines (title, uploader).
///
/// Returns `None` when no usable title came back; a missing uploader falls
/// back on its own.
pub(crate) fn parse_metadata_output(stdout: &str) -> Option<TrackMetadata> {
    let mut lines = stdout.lines().map(str::trim);

    let title = lines
        .next()
        .filter(|t| !t.is_empty() && *t != PLACEHOLDER)?;
    let artist = lines
        .next()
        .filter(|a| !a.is_empty() && *a != PLACEHOLDER)
        .unwrap_or(TrackMetadata::FALLBACK_ARTIST);

    Some(TrackMetadata {
        title: title.to_string(),
        artist: artist.to_string(),
    })
}

pub(crate) fn parse_playlist_json(json: &str) -> Result<PlaylistListing, serde_json::Error> {
    let playlist: PlaylistJson = serde_json::from_str(json)?;

    let entries = playlist
        .entries
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap_or_default();
            PlaylistEntry {
                id: entry.id.filter(|id| !id.is_empty()),
                title: entry.title,
            }
        })
        .collect();

    Ok(PlaylistListing {
        title: playlist.title,
        entries,
    })
}

/// MP3 files directly inside the staging directory, sorted by path
fn audio_candidates(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_mp3 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));
        if is_mp3 && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// The single staged artifact. A URL that expanded to several downloads
/// (a bare playlist link given as a single video) is rejected whole.
fn select_artifact(candidates: Vec<PathBuf>) -> Result<PathBuf, AcquireError> {
    let count = candidates.len();
    let mut rest = candidates.into_iter();
    match (rest.next(), rest.next()) {
        (None, _) => Err(AcquireError::NoOutput),
        (Some(only), None) => Ok(only),
        _ => Err(AcquireError::AmbiguousOutput(count)),
    }
}

/// Move a staged file into `dest_dir`, replacing any previous file of the same name
async fn relocate(src: &Path, dest_dir: &Path) -> Result<PathBuf, AcquireError> {
    let file_name = src
        .file_name()
        .ok_or_else(|| AcquireError::MissingFile(src.to_path_buf()))?;
    let dest = dest_dir.join(file_name);

    if let Err(e) = tokio::fs::rename(src, &dest).await {
        // Staging on another filesystem
        debug!("rename failed ({}), copying instead", e);
        tokio::fs::copy(src, &dest).await?;
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metadata_output() {
        let meta = parse_metadata_output("Never Gonna Give You Up\nRick Astley\n").unwrap();
        assert_eq!(meta.title, "Never Gonna Give You Up");
        assert_eq!(meta.artist, "Rick Astley");
    }

    #[test]
    fn test_parse_metadata_output_missing_uploader() {
        let meta = parse_metadata_output("Some Title").unwrap();
        assert_eq!(meta.artist, "Unknown Artist");

        let meta = parse_metadata_output("Some Title\nNA").unwrap();
        assert_eq!(meta.title, "Some Title");
        assert_eq!(meta.artist, "Unknown Artist");
    }

    #[test]
    fn test_parse_metadata_output_without_title() {
        assert!(parse_metadata_output("").is_none());
        assert!(parse_metadata_output("NA\nUploader").is_none());
    }

    #[test]
    fn test_parse_playlist_json() {
        let json = r#"{
            "_type": "playlist",
            "id": "PL1",
            "title": "Road Trip",
            "entries": [
                {"_type": "url", "id": "aaa", "title": "First"},
                {"_type": "url", "title": "No id"},
                null,
                {"_type": "url", "id": "ccc"}
            ]
        }"#;
        let listing = parse_playlist_json(json).unwrap();
        assert_eq!(listing.title.as_deref(), Some("Road Trip"));
        let ids: Vec<_> = listing.entries.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("aaa"), None, None, Some("ccc")]);
        assert_eq!(listing.entries[0].title.as_deref(), Some("First"));
    }

    #[test]
    fn test_parse_playlist_json_without_entries() {
        let listing = parse_playlist_json(r#"{"id": "abc", "title": "A video"}"#).unwrap();
        assert!(listing.entries.is_empty());
        assert!(parse_playlist_json("not json").is_err());
    }

    #[test]
    fn test_select_artifact() {
        let a = PathBuf::from("/stage/a.mp3");

        assert!(matches!(select_artifact(vec![]), Err(AcquireError::NoOutput)));
        assert_eq!(select_artifact(vec![a.clone()]).unwrap(), a);
    }

    #[test]
    fn test_select_artifact_rejects_several_downloads() {
        let staged = vec![
            PathBuf::from("/stage/first.mp3"),
            PathBuf::from("/stage/second.mp3"),
            PathBuf::from("/stage/third.mp3"),
        ];
        assert!(matches!(
            select_artifact(staged),
            Err(AcquireError::AmbiguousOutput(3))
        ));
    }

    #[test]
    fn test_audio_candidates_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("song.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("song.webm.part"), b"x").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested.mp3")).unwrap();

        let found = audio_candidates(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("song.mp3")]);
    }

    #[tokio::test]
    async fn test_relocate_replaces_existing_file() {
        let staging = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let src = staging.path().join("Track.mp3");
        std::fs::write(&src, b"new").unwrap();
        std::fs::write(dest.path().join("Track.mp3"), b"old").unwrap();

        let moved = relocate(&src, dest.path()).await.unwrap();
        assert_eq!(moved, dest.path().join("Track.mp3"));
        assert_eq!(std::fs::read(&moved).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_acquire_cleans_staging_when_tool_is_missing() {
        let root = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(root.path().join("no-such-yt-dlp"));

        let err = downloader
            .acquire("https://youtu.be/abc", root.path(), root.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::Tool(ToolError::Spawn { .. })));

        let leftovers: Vec<_> = std::fs::read_dir(root.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
