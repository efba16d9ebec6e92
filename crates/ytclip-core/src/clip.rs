//! Audio trimming using FFmpeg

use crate::config::ClipLength;
use crate::error::ProcessError;
use crate::process::{run_captured, FFMPEG};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Clipper {
    ffmpeg_path: PathBuf,
}

impl Clipper {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Cut an MP3 down to its first `clip` seconds, replacing the file in place.
    ///
    /// Sources shorter than the clip come back at full length.
    pub async fn trim(&self, path: &Path, clip: ClipLength) -> Result<(), ProcessError> {
        info!("Trimming {} to {}", path.display(), clip);

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let scratch = tempfile::Builder::new()
            .prefix(".ytclip-trim-")
            .suffix(".mp3")
            .tempfile_in(dir)?
            .into_temp_path();

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        cmd.arg("-i").arg(path);
        cmd.arg("-t").arg(clip.seconds().to_string());
        cmd.args(Self::codec_args());
        cmd.arg("-y").arg(scratch.as_os_str());

        run_captured(FFMPEG, cmd).await?;

        scratch.persist(path).map_err(|e| e.error)?;
        debug!("Trimmed: {}", path.display());
        Ok(())
    }

    fn codec_args() -> [&'static str; 10] {
        [
            // Audio only, tags are rewritten afterwards
            "-map", "0:a",
            "-map_metadata", "-1",
            "-c:a", "libmp3lame",
            "-q:a", "0",  // VBR highest quality (~245 kbps)
            "-f", "mp3",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;

    #[tokio::test]
    async fn test_trim_failure_leaves_source_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("track.mp3");
        std::fs::write(&track, b"untrimmed").unwrap();

        let clipper = Clipper::new(dir.path().join("no-such-ffmpeg"));
        let err = clipper.trim(&track, ClipLength::DEFAULT).await.unwrap_err();
        assert!(matches!(err, ProcessError::Trim(ToolError::Spawn { .. })));

        assert_eq!(std::fs::read(&track).unwrap(), b"untrimmed");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("track.mp3")]);
    }
}
