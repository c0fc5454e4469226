use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentMode {
    SingleVideo,
    Playlist,
    Images,
    Mixed,
}

/// One downloadable asset resolved from the source content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub source_url: String,
    pub title: String,
    pub filename: String,
    pub format: String,
    pub quality: Option<String>,
    pub size_bytes: Option<u64>,
}

/// A condensed view of one engine format, kept for display purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSummary {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub filesize: Option<u64>,
    pub note: Option<String>,
}

/// Normalized description of a piece of content and its resolved media.
///
/// `restricted` marks a result built from metadata-only extraction after the
/// platform refused full access; it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub duration_seconds: Option<u64>,
    pub duration_display: Option<String>,
    pub thumbnail_primary: Option<String>,
    pub thumbnails: Vec<String>,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub description: Option<String>,
    pub source_site: String,
    pub original_url: String,
    pub content_mode: ContentMode,
    pub media_items: Vec<MediaItem>,
    pub formats: Vec<FormatSummary>,
    pub restricted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityPolicy {
    Best,
    Worst,
    /// Target vertical resolution in pixels.
    Height(u32),
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self::Best
    }
}

impl FromStr for QualityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "best" | "" => Ok(Self::Best),
            "worst" => Ok(Self::Worst),
            other => other
                .trim_end_matches('p')
                .parse::<u32>()
                .ok()
                .filter(|h| *h > 0)
                .map(Self::Height)
                .ok_or_else(|| format!("Invalid quality '{}': expected best, worst or a height", s)),
        }
    }
}

impl fmt::Display for QualityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::Worst => write!(f, "worst"),
            Self::Height(h) => write!(f, "{}", h),
        }
    }
}

/// What the caller asked for: one URL, a quality policy, and whether only audio is wanted.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub url: String,
    pub quality: QualityPolicy,
    pub audio_only: bool,
}

impl ExtractionRequest {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            quality: QualityPolicy::Best,
            audio_only: false,
        }
    }

    pub fn with_quality(mut self, quality: QualityPolicy) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = audio_only;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_policy_parsing() {
        assert_eq!("best".parse::<QualityPolicy>(), Ok(QualityPolicy::Best));
        assert_eq!("WORST".parse::<QualityPolicy>(), Ok(QualityPolicy::Worst));
        assert_eq!("720".parse::<QualityPolicy>(), Ok(QualityPolicy::Height(720)));
        assert_eq!("1080p".parse::<QualityPolicy>(), Ok(QualityPolicy::Height(1080)));
        assert!("hd".parse::<QualityPolicy>().is_err());
        assert!("0".parse::<QualityPolicy>().is_err());
    }

    #[test]
    fn test_content_mode_serializes_snake_case() {
        let json = serde_json::to_string(&ContentMode::SingleVideo).unwrap();
        assert_eq!(json, "\"single_video\"");
        let json = serde_json::to_string(&MediaKind::Image).unwrap();
        assert_eq!(json, "\"image\"");
    }
}
