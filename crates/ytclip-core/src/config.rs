//! Configuration management for ytclip

use crate::error::{self, ConfigError};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Album tag written to every clip unless configured otherwise
pub const DEFAULT_ALBUM: &str = "YouTube Batch";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub clip: ClipConfig,
    pub temp: TempConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Folder that receives every finished clip
    pub directory: PathBuf,
    /// Album tag value
    pub album: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Clip length used when the prompt is left blank (default: 60)
    pub default_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempConfig {
    /// Staging directory for downloads (uses the output directory if not set)
    pub directory: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                yt_dlp: None,
                ffmpeg: None,
            },
            output: OutputConfig {
                directory: default_download_dir(),
                album: DEFAULT_ALBUM.to_string(),
            },
            clip: ClipConfig {
                default_seconds: ClipLength::DEFAULT.seconds(),
            },
            temp: TempConfig { directory: None },
        }
    }
}

/// `~/Downloads/youtube_mp3s`, or a relative folder when no home is known
pub fn default_download_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
        .join("youtube_mp3s")
}

/// Location of the user-level config file, if the platform has a config dir
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ytclip").join("config.toml"))
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = user_config_file() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // YTCLIP_OUTPUT__DIRECTORY -> output.directory
        figment = figment.merge(Env::prefixed("YTCLIP_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clip.default_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "clip.default_seconds must be positive".to_string(),
            ));
        }
        if self.output.album.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "output.album must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.ffmpeg {
            Ok(path.clone())
        } else {
            which::which("ffmpeg")
                .map_err(|_| ConfigError::InvalidValue("ffmpeg not found in PATH".to_string()))
        }
    }

    pub fn default_clip_length(&self) -> ClipLength {
        ClipLength::new(i64::from(self.clip.default_seconds)).unwrap_or(ClipLength::DEFAULT)
    }

    /// Create the output directory if needed and return it
    pub fn ensure_download_dir(&self) -> error::Result<PathBuf> {
        std::fs::create_dir_all(&self.output.directory)?;
        Ok(self.output.directory.clone())
    }
}

/// Number of seconds kept from the start of each track. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipLength(u32);

impl ClipLength {
    pub const DEFAULT: ClipLength = ClipLength(60);

    pub fn new(seconds: i64) -> Option<Self> {
        u32::try_from(seconds).ok().filter(|s| *s > 0).map(Self)
    }

    /// Parse prompt input, falling back on blank, non-numeric or non-positive values
    pub fn from_input(input: &str, fallback: ClipLength) -> Self {
        input
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::new)
            .unwrap_or(fallback)
    }

    pub fn seconds(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClipLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Settings shared by every pipeline call of one session
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub download_dir: PathBuf,
    pub clip_length: ClipLength,
    pub album: String,
    pub staging_dir: Option<PathBuf>,
}

impl JobSettings {
    pub fn new(config: &Config, clip_length: ClipLength) -> Self {
        Self {
            download_dir: config.output.directory.clone(),
            clip_length,
            album: config.output.album.clone(),
            staging_dir: config.temp.directory.clone(),
        }
    }

    /// Parent for per-item staging directories. Defaults to the download
    /// folder so the final move is a same-filesystem rename.
    pub fn staging_root(&self) -> &Path {
        self.staging_dir.as_deref().unwrap_or(&self.download_dir)
    }
}
