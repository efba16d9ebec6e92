//! URL normalization and classification

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Query keys that identify a video or playlist. Everything else is dropped.
const RETAINED_KEYS: [&str; 2] = ["v", "list"];

static HOST_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.)?(youtube\.com|youtu\.be)/"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Single,
    Playlist,
    Invalid,
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlKind::Single => write!(f, "single"),
            UrlKind::Playlist => write!(f, "playlist"),
            UrlKind::Invalid => write!(f, "invalid"),
        }
    }
}

/// A user-supplied URL together with its canonical form and classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    pub raw: String,
    pub normalized: String,
    pub kind: UrlKind,
}

impl TargetUrl {
    /// Classify a URL entered interactively or synthesized from a playlist
    pub fn parse(raw: &str) -> Self {
        let normalized = normalize(raw);
        let kind = classify(&normalized);
        Self {
            raw: raw.trim().to_string(),
            normalized,
            kind,
        }
    }

    /// Classify a batch-file line, where a `playlist` substring also marks a playlist
    pub fn from_batch_line(line: &str) -> Self {
        let mut target = Self::parse(line);
        if target.kind == UrlKind::Single && has_batch_playlist_marker(&target.raw) {
            target.kind = UrlKind::Playlist;
        }
        target
    }

    pub fn is_valid(&self) -> bool {
        self.kind != UrlKind::Invalid
    }
}

/// Strip a URL down to its `v` and `list` query parameters.
///
/// Input that does not parse as an absolute URL is returned trimmed but
/// otherwise untouched. Normalizing twice gives the same result as once.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut parsed) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };

    let kept: Vec<(String, String)> = RETAINED_KEYS
        .iter()
        .filter_map(|key| {
            parsed
                .query_pairs()
                .find(|(k, _)| &**k == *key)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
        })
        .collect();

    parsed.set_fragment(None);
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }

    parsed.into()
}

/// Whether the URL points at the YouTube web or short-link host
pub fn is_platform_url(url: &str) -> bool {
    HOST_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(url))
}

/// Classify a normalized URL
pub fn classify(url: &str) -> UrlKind {
    if !is_platform_url(url) {
        UrlKind::Invalid
    } else if has_list_param(url) {
        UrlKind::Playlist
    } else {
        UrlKind::Single
    }
}

fn has_list_param(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => parsed.query_pairs().any(|(key, _)| key == "list"),
        Err(_) => url.contains("list="),
    }
}

fn has_batch_playlist_marker(line: &str) -> bool {
    line.contains("playlist") || line.contains("list=")
}
