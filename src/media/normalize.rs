use super::coerce::coerce_duration;
use super::payload::RawPayload;
use super::platforms::site_name;
use super::resolver::resolve_media_items;
use super::selector::select_primary_thumbnail;
use super::types::{ExtractionRequest, FormatSummary, VideoInfo};
use crate::utils::truncate_with_ellipsis;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeSettings {
    pub description_limit: usize,
    pub format_summary_limit: usize,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            description_limit: 500,
            format_summary_limit: 10,
        }
    }
}

/// Builds the uniform result for one payload. Pure: same input, same output.
pub fn normalize(
    payload: &RawPayload,
    request: &ExtractionRequest,
    restricted: bool,
    settings: &NormalizeSettings,
) -> VideoInfo {
    let source_site = site_name(&request.url, payload.extractor_key.as_deref());
    let title = payload
        .effective_title()
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_title(&source_site, payload.id.as_deref()));

    let (duration_seconds, duration_display) = match payload.duration.as_ref() {
        Some(value) => {
            let coerced = coerce_duration(Some(value));
            (coerced.seconds, Some(coerced.display))
        }
        None => (None, None),
    };

    let mut thumbnails: Vec<String> = payload
        .thumbnails
        .iter()
        .filter_map(|t| t.url.clone())
        .collect();
    if thumbnails.is_empty() {
        thumbnails.extend(payload.thumbnail.clone());
    }
    let thumbnail_primary = select_primary_thumbnail(&payload.thumbnails)
        .map(str::to_string)
        .or_else(|| payload.thumbnail.clone());

    let resolution = resolve_media_items(payload, &title, request);

    VideoInfo {
        title,
        duration_seconds,
        duration_display,
        thumbnail_primary,
        thumbnails,
        uploader: payload
            .uploader
            .clone()
            .or_else(|| payload.channel.clone())
            .or_else(|| payload.uploader_id.clone()),
        upload_date: payload.upload_date.as_deref().map(normalize_upload_date),
        view_count: payload.view_count,
        like_count: payload.like_count,
        description: payload
            .description
            .as_deref()
            .map(|d| truncate_with_ellipsis(d, settings.description_limit)),
        source_site,
        original_url: request.url.clone(),
        content_mode: resolution.mode,
        media_items: resolution.items,
        formats: payload
            .formats
            .iter()
            .take(settings.format_summary_limit)
            .map(|f| FormatSummary {
                format_id: f.format_id.clone(),
                ext: f.ext.clone(),
                height: f.height.and_then(|h| u32::try_from(h).ok()),
                width: f.width.and_then(|w| u32::try_from(w).ok()),
                filesize: f.reported_size(),
                note: f.format_note.clone(),
            })
            .collect(),
        restricted,
    }
}

fn placeholder_title(site: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{} media {}", site, id),
        None => format!("{} media", site),
    }
}

/// `YYYYMMDD` becomes `YYYY-MM-DD`; any other shape is passed through.
fn normalize_upload_date(raw: &str) -> String {
    if raw.len() == 8 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..])
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::types::{ContentMode, MediaKind};
    use serde_json::json;

    fn request() -> ExtractionRequest {
        ExtractionRequest::new("https://www.youtube.com/watch?v=abc")
    }

    fn full_payload() -> RawPayload {
        RawPayload::from_value(json!({
            "id": "abc",
            "title": "Launch stream",
            "duration": 3725.4,
            "channel": "Space Channel",
            "upload_date": "20240105",
            "view_count": 1500,
            "like_count": "20",
            "description": "d".repeat(600),
            "thumbnails": [
                {"url": "https://i/low.jpg", "width": 120, "height": 90},
                {"url": "https://i/high.jpg", "width": 1280, "height": 720}
            ],
            "formats": [
                {"format_id": "18", "url": "https://v/18", "ext": "mp4", "height": 360, "vcodec": "avc1", "acodec": "mp4a"},
                {"format_id": "22", "url": "https://v/22", "ext": "mp4", "height": 720, "vcodec": "avc1", "acodec": "mp4a"}
            ],
            "extractor_key": "Youtube"
        }))
        .unwrap()
    }

    #[test]
    fn test_normalizes_full_payload() {
        let info = normalize(&full_payload(), &request(), false, &NormalizeSettings::default());

        assert_eq!(info.title, "Launch stream");
        assert_eq!(info.duration_seconds, Some(3725));
        assert_eq!(info.duration_display.as_deref(), Some("01:02:05"));
        assert_eq!(info.uploader.as_deref(), Some("Space Channel"));
        assert_eq!(info.upload_date.as_deref(), Some("2024-01-05"));
        assert_eq!(info.like_count, Some(20));
        assert_eq!(info.thumbnail_primary.as_deref(), Some("https://i/high.jpg"));
        assert_eq!(info.thumbnails.len(), 2);
        assert_eq!(info.source_site, "YouTube");
        assert_eq!(info.original_url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(info.content_mode, ContentMode::SingleVideo);
        assert_eq!(info.media_items.len(), 1);
        assert_eq!(info.media_items[0].kind, MediaKind::Video);
        assert_eq!(info.formats.len(), 2);
        assert!(!info.restricted);

        let description = info.description.unwrap();
        assert!(description.ends_with("..."));
        assert_eq!(description.chars().count(), 503);
    }

    #[test]
    fn test_sparse_payload_gets_defaults() {
        let payload = RawPayload::from_value(json!({"id": "42", "duration": "soon"})).unwrap();
        let info = normalize(&payload, &request(), true, &NormalizeSettings::default());

        assert_eq!(info.title, "YouTube media 42");
        assert_eq!(info.duration_seconds, None);
        assert_eq!(info.duration_display.as_deref(), Some("Unknown"));
        assert_eq!(info.thumbnail_primary, None);
        assert!(info.thumbnails.is_empty());
        assert!(info.media_items.is_empty());
        assert!(info.restricted);
    }

    #[test]
    fn test_missing_duration_has_no_display() {
        let payload = RawPayload::from_value(json!({"title": "t"})).unwrap();
        let info = normalize(&payload, &request(), false, &NormalizeSettings::default());
        assert_eq!(info.duration_display, None);
    }

    #[test]
    fn test_single_thumbnail_field_is_used() {
        let payload =
            RawPayload::from_value(json!({"title": "t", "thumbnail": "https://i/only.jpg"})).unwrap();
        let info = normalize(&payload, &request(), false, &NormalizeSettings::default());
        assert_eq!(info.thumbnail_primary.as_deref(), Some("https://i/only.jpg"));
        assert_eq!(info.thumbnails, vec!["https://i/only.jpg".to_string()]);
    }

    #[test]
    fn test_format_summary_is_limited() {
        let formats: Vec<_> = (0..15)
            .map(|i| json!({"format_id": i.to_string(), "url": format!("https://v/{}", i), "height": 100 + i}))
            .collect();
        let payload = RawPayload::from_value(json!({"title": "t", "formats": formats})).unwrap();
        let info = normalize(&payload, &request(), false, &NormalizeSettings::default());
        assert_eq!(info.formats.len(), 10);
        assert_eq!(info.formats[0].format_id.as_deref(), Some("0"));
    }

    #[test]
    fn test_normalizing_twice_is_identical() {
        let payload = full_payload();
        let settings = NormalizeSettings::default();
        let first = serde_json::to_string(&normalize(&payload, &request(), false, &settings)).unwrap();
        let second = serde_json::to_string(&normalize(&payload, &request(), false, &settings)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_upload_date_shapes() {
        assert_eq!(normalize_upload_date("20231231"), "2023-12-31");
        assert_eq!(normalize_upload_date("2023-12-31"), "2023-12-31");
        assert_eq!(normalize_upload_date("yesterday"), "yesterday");
    }
}
