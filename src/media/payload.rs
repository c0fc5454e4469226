//! Typed, fully optional view of the extraction engine's JSON output.
//!
//! Engines disagree on field types (numbers as strings, `null` lists, bare URL
//! strings where objects are expected). Every field decodes leniently: a
//! value of the wrong shape is treated as absent.

use super::coerce::{coerce_count, coerce_f64, coerce_text};
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "heic", "avif"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPayload {
    #[serde(rename = "_type", deserialize_with = "lenient::text")]
    pub payload_type: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub fulltitle: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub uploader: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub channel: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub uploader_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub upload_date: Option<String>,
    /// Kept raw; interpreted by `coerce_duration`.
    pub duration: Option<Value>,
    #[serde(deserialize_with = "lenient::count")]
    pub view_count: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub like_count: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub thumbnails: Vec<RawThumbnail>,
    #[serde(deserialize_with = "lenient::list")]
    pub formats: Vec<RawFormat>,
    #[serde(deserialize_with = "lenient::images")]
    pub images: Vec<RawImage>,
    #[serde(deserialize_with = "lenient::list")]
    pub entries: Vec<RawPayload>,
    /// Direct media URL for engines that do not enumerate formats.
    #[serde(deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ext: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub width: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub height: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub filesize: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub vcodec: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub acodec: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub extractor_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFormat {
    #[serde(deserialize_with = "lenient::text")]
    pub format_id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ext: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub width: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub height: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub vcodec: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub acodec: Option<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub abr: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub tbr: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub filesize: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub filesize_approx: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub format_note: Option<String>,
}

impl RawFormat {
    /// yt-dlp spells a missing stream as the literal codec "none".
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref().is_some_and(|a| a != "none")
    }

    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none") && self.has_audio()
    }

    pub fn reported_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawThumbnail {
    #[serde(deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub width: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub height: Option<u64>,
    /// "WIDTHxHEIGHT", used when the numeric fields are missing.
    #[serde(deserialize_with = "lenient::text")]
    pub resolution: Option<String>,
}

impl RawThumbnail {
    pub fn pixel_area(&self) -> Option<u64> {
        if let (Some(w), Some(h)) = (self.width, self.height) {
            return Some(w.saturating_mul(h));
        }
        let (w, h) = self.resolution.as_deref()?.split_once('x')?;
        let w: u64 = w.trim().parse().ok()?;
        let h: u64 = h.trim().parse().ok()?;
        Some(w.saturating_mul(h))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawImage {
    #[serde(deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub width: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub height: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub ext: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub filesize: Option<u64>,
}

impl RawPayload {
    /// Decodes engine output, accepting only a JSON object at the top level.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }

    /// Title with the `fulltitle` fallback some extractors use.
    pub fn effective_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.fulltitle.as_deref())
    }

    pub fn has_title(&self) -> bool {
        self.effective_title().is_some()
    }

    pub fn is_playlist(&self) -> bool {
        matches!(
            self.payload_type.as_deref(),
            Some("playlist") | Some("multi_video")
        )
    }

    /// An entry that is a still image rather than playable media.
    pub fn is_image(&self) -> bool {
        if !self.formats.is_empty() {
            return false;
        }
        let ext = self
            .ext
            .clone()
            .or_else(|| self.url.as_deref().and_then(extension_from_url));
        ext.is_some_and(|e| is_image_extension(&e))
    }

    /// Drops everything that points at playable media, keeping descriptive metadata.
    pub fn into_metadata_only(mut self) -> Self {
        self.formats.clear();
        self.images.clear();
        self.entries.clear();
        self.url = None;
        self
    }
}

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Extension of the last path segment of `raw`, ignoring query and fragment.
pub fn extension_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let (_, ext) = segment.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

mod lenient {
    use super::*;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.as_ref().and_then(coerce_text))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.as_ref().and_then(coerce_count))
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.as_ref().and_then(coerce_f64))
    }

    /// Keeps only the array elements that are objects and decode cleanly.
    pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<Value>::deserialize(d)?;
        let Some(Value::Array(items)) = value else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter(|item| item.is_object())
            .filter_map(|item| T::deserialize(item).ok())
            .collect())
    }

    /// Image lists come either as objects or as bare URL strings.
    pub fn images<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawImage>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        let Some(Value::Array(items)) = value else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(url) => Some(RawImage {
                    url: Some(url),
                    ..RawImage::default()
                }),
                Value::Object(_) => RawImage::deserialize(item).ok(),
                _ => None,
            })
            .filter(|image| image.url.is_some())
            .collect())
    }
}
