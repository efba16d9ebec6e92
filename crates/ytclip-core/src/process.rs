//! Running external tools

use crate::error::ToolError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

pub(crate) const YT_DLP: &str = "yt-dlp";
pub(crate) const FFMPEG: &str = "ffmpeg";

/// Run a command to completion and return its trimmed stdout.
///
/// stdin is closed so the tool never competes with the interactive prompt.
pub(crate) async fn run_captured(tool: &'static str, mut cmd: Command) -> Result<String, ToolError> {
    cmd.stdin(Stdio::null());
    debug!("Running {:?}", cmd.as_std());

    let output = cmd
        .output()
        .await
        .map_err(|source| ToolError::Spawn { tool, source })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!("{} stderr: {}", tool, stderr);
        return Err(ToolError::Failed {
            tool,
            code: output.status.code(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
