//! ID3 tag writing

use crate::backend::TrackMetadata;
use crate::error::ProcessError;
use id3::{ErrorKind, Tag, TagLike, Version};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Set title, artist and album on the file's ID3v2 tag, keeping any other frames
pub fn write_tags(path: &Path, metadata: &TrackMetadata, album: &str) -> Result<(), id3::Error> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
        Err(e) => return Err(e),
    };

    tag.set_title(metadata.title.as_str());
    tag.set_artist(metadata.artist.as_str());
    tag.set_album(album);

    tag.write_to_path(path, Version::Id3v24)?;
    debug!("Tagged {}: {} / {}", path.display(), metadata.artist, metadata.title);
    Ok(())
}

/// [`write_tags`] on the blocking pool
pub async fn write_tags_blocking(
    path: &Path,
    metadata: &TrackMetadata,
    album: &str,
) -> Result<(), ProcessError> {
    let path: PathBuf = path.to_path_buf();
    let metadata = metadata.clone();
    let album = album.to_string();

    tokio::task::spawn_blocking(move || write_tags(&path, &metadata, &album)).await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_mp3(dir: &Path) -> PathBuf {
        let path = dir.join("clip.mp3");
        let mut bytes = vec![0xFF, 0xFB, 0x90, 0x64];
        bytes.resize(1024, 0);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_write_tags_on_untagged_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_mp3(dir.path());
        let meta = TrackMetadata {
            title: "Song".to_string(),
            artist: "Band".to_string(),
        };

        write_tags(&path, &meta, "YouTube Batch").unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Song"));
        assert_eq!(tag.artist(), Some("Band"));
        assert_eq!(tag.album(), Some("YouTube Batch"));
    }

    #[test]
    fn test_write_tags_keeps_other_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = fake_mp3(dir.path());

        let mut existing = Tag::new();
        existing.set_title("Old title");
        existing.set_genre("Jazz");
        existing.write_to_path(&path, Version::Id3v24).unwrap();

        write_tags(&path, &TrackMetadata::fallback(), "Mixtape").unwrap();

        let tag = Tag::read_from_path(&path).unwrap();
        assert_eq!(tag.title(), Some("Unknown Title"));
        assert_eq!(tag.artist(), Some("Unknown Artist"));
        assert_eq!(tag.album(), Some("Mixtape"));
        assert_eq!(tag.genre(), Some("Jazz"));
    }

    #[tokio::test]
    async fn test_write_tags_blocking_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.mp3");
        let err = write_tags_blocking(&missing, &TrackMetadata::fallback(), "YouTube Batch")
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Tag(_)));
    }
}
