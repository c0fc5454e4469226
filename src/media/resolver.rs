use super::coerce::{ordinal_tag, sanitize_filename};
use super::payload::{extension_from_url, RawFormat, RawImage, RawPayload};
use super::selector::select_formats_by_quality;
use super::types::{ContentMode, ExtractionRequest, MediaItem, MediaKind};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const UNKNOWN_QUALITY: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub items: Vec<MediaItem>,
    pub mode: ContentMode,
}

/// A media item before its filename is fixed; names are assigned over the whole set at once.
#[derive(Debug, Clone)]
struct Draft {
    kind: MediaKind,
    source_url: String,
    title: String,
    format: String,
    quality: Option<String>,
    size_bytes: Option<u64>,
    name_tag: Option<String>,
}

/// Turns a payload into the ordered list of downloadable items.
///
/// An empty list is a valid outcome: it means the payload carried nothing
/// playable, which happens when extraction was restricted.
pub fn resolve_media_items(
    payload: &RawPayload,
    title: &str,
    request: &ExtractionRequest,
) -> Resolution {
    if !payload.images.is_empty() {
        debug!("Resolving {} images from image collection", payload.images.len());
        return Resolution {
            items: finalize(image_drafts(payload.images.iter().cloned(), title)),
            mode: ContentMode::Images,
        };
    }

    if !payload.entries.is_empty() {
        if payload.entries.iter().all(RawPayload::is_image) {
            debug!("Resolving {} image entries", payload.entries.len());
            let images = payload.entries.iter().map(entry_as_image);
            return Resolution {
                items: finalize(image_drafts(images, title)),
                mode: ContentMode::Images,
            };
        }
        return resolve_entries(payload, title, request);
    }

    let drafts = resolve_single(payload, title, request);
    let mode = if payload.is_playlist() {
        ContentMode::Playlist
    } else if drafts.iter().any(|d| d.kind == MediaKind::Image) {
        ContentMode::Images
    } else {
        ContentMode::SingleVideo
    };

    Resolution {
        items: finalize(drafts),
        mode,
    }
}

fn resolve_entries(payload: &RawPayload, title: &str, request: &ExtractionRequest) -> Resolution {
    debug!("Resolving {} playlist entries", payload.entries.len());

    let mut drafts = Vec::new();
    for entry in &payload.entries {
        let entry_title = entry.effective_title().unwrap_or(title);
        if entry.is_image() {
            drafts.extend(image_drafts(std::iter::once(entry_as_image(entry)), entry_title));
        } else {
            drafts.extend(resolve_single(entry, entry_title, request));
        }
    }

    let kinds: HashSet<MediaKind> = drafts.iter().map(|d| d.kind).collect();
    let mode = if kinds.contains(&MediaKind::Image) && kinds.len() > 1 {
        ContentMode::Mixed
    } else if payload.is_playlist() || drafts.len() > 1 {
        ContentMode::Playlist
    } else {
        ContentMode::SingleVideo
    };

    Resolution {
        items: finalize(drafts),
        mode,
    }
}

fn resolve_single(payload: &RawPayload, title: &str, request: &ExtractionRequest) -> Vec<Draft> {
    if !payload.formats.is_empty() {
        let selected =
            select_formats_by_quality(&payload.formats, request.quality, request.audio_only);
        if !selected.is_empty() {
            return selected
                .into_iter()
                .filter_map(|f| format_draft(f, title, request.audio_only))
                .collect();
        }
        debug!(
            "No format matched quality {} (audio_only={}), trying direct URL",
            request.quality, request.audio_only
        );
    }

    let Some(url) = payload.url.as_deref() else {
        return Vec::new();
    };

    if payload.is_image() {
        return image_drafts(std::iter::once(entry_as_image(payload)), title);
    }

    let (kind, format) = if request.audio_only {
        (MediaKind::Audio, "mp3")
    } else {
        (MediaKind::Video, "mp4")
    };

    vec![Draft {
        kind,
        source_url: url.to_string(),
        title: title.to_string(),
        format: format.to_string(),
        quality: Some(UNKNOWN_QUALITY.to_string()),
        size_bytes: payload.filesize,
        name_tag: None,
    }]
}

fn format_draft(format: &RawFormat, title: &str, audio_only: bool) -> Option<Draft> {
    let source_url = format.url.clone()?;
    let (kind, default_ext) = if audio_only {
        (MediaKind::Audio, "mp3")
    } else {
        (MediaKind::Video, "mp4")
    };

    let label = if audio_only {
        format.abr.map(|abr| format!("{}kbps", abr.round() as u64))
    } else {
        format.height.map(|h| format!("{}p", h))
    }
    .or_else(|| format.format_note.clone());

    Some(Draft {
        kind,
        source_url,
        title: title.to_string(),
        format: format
            .ext
            .clone()
            .unwrap_or_else(|| default_ext.to_string()),
        quality: Some(label.clone().unwrap_or_else(|| UNKNOWN_QUALITY.to_string())),
        size_bytes: format.reported_size(),
        name_tag: label,
    })
}

fn entry_as_image(entry: &RawPayload) -> RawImage {
    RawImage {
        url: entry.url.clone(),
        width: entry.width,
        height: entry.height,
        ext: entry.ext.clone(),
        filesize: entry.filesize,
    }
}

fn image_drafts(images: impl Iterator<Item = RawImage>, title: &str) -> Vec<Draft> {
    let images: Vec<RawImage> = images.filter(|i| i.url.is_some()).collect();
    let numbered = images.len() > 1;

    images
        .into_iter()
        .enumerate()
        .filter_map(|(index, image)| {
            let source_url = image.url?;
            let format = image
                .ext
                .or_else(|| extension_from_url(&source_url))
                .unwrap_or_else(|| "jpg".to_string());
            let quality = match (image.width, image.height) {
                (Some(w), Some(h)) => format!("{}x{}", w, h),
                _ => UNKNOWN_QUALITY.to_string(),
            };
            Some(Draft {
                kind: MediaKind::Image,
                source_url,
                title: title.to_string(),
                format,
                quality: Some(quality),
                size_bytes: image.filesize,
                name_tag: numbered.then(|| (index + 1).to_string()),
            })
        })
        .collect()
}

/// Assigns filenames, adding a 1-based ordinal to any name shared by several items.
fn finalize(drafts: Vec<Draft>) -> Vec<MediaItem> {
    let base_names: Vec<String> = drafts
        .iter()
        .map(|d| sanitize_filename(&d.title, &d.format, d.name_tag.as_deref()))
        .collect();

    let mut totals: HashMap<&str, usize> = HashMap::new();
    for name in &base_names {
        *totals.entry(name.as_str()).or_default() += 1;
    }

    let mut next_ordinal: HashMap<&str, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut items = Vec::with_capacity(drafts.len());

    for (draft, base) in drafts.iter().zip(&base_names) {
        let shared = totals.get(base.as_str()).copied().unwrap_or(0) > 1;
        let mut filename = base.clone();

        if shared || used.contains(&filename) {
            let ordinal = next_ordinal.entry(base.as_str()).or_insert(0);
            // Distinct ordinals give distinct names, so a free one exists within this many tries.
            for _ in 0..=drafts.len() {
                *ordinal += 1;
                let tag = ordinal_tag(draft.name_tag.as_deref(), *ordinal);
                filename = sanitize_filename(&draft.title, &draft.format, Some(&tag));
                if !used.contains(&filename) {
                    break;
                }
            }
        }

        used.insert(filename.clone());
        items.push(MediaItem {
            kind: draft.kind,
            source_url: draft.source_url.clone(),
            title: draft.title.clone(),
            filename,
            format: draft.format.clone(),
            quality: draft.quality.clone(),
            size_bytes: draft.size_bytes,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::types::QualityPolicy;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RawPayload {
        RawPayload::from_value(value).unwrap()
    }

    fn request() -> ExtractionRequest {
        ExtractionRequest::new("https://example.com/post/1")
    }

    #[test]
    fn test_image_collection_gets_ordinal_filenames() {
        let p = payload(json!({
            "title": "Beach day",
            "images": [
                {"url": "https://cdn.example.com/1.jpg", "width": 1080, "height": 1350},
                "https://cdn.example.com/2.png",
                "https://cdn.example.com/3.jpg"
            ]
        }));
        let res = resolve_media_items(&p, "Beach day", &request());

        assert_eq!(res.mode, ContentMode::Images);
        assert_eq!(res.items.len(), 3);
        assert!(res.items.iter().all(|i| i.kind == MediaKind::Image));
        assert_eq!(res.items[0].filename, "Beach day_1.jpg");
        assert_eq!(res.items[1].filename, "Beach day_2.png");
        assert_eq!(res.items[2].filename, "Beach day_3.jpg");
        assert_eq!(res.items[0].source_url, "https://cdn.example.com/1.jpg");
        assert_eq!(res.items[0].quality.as_deref(), Some("1080x1350"));
        assert_eq!(res.items[1].quality.as_deref(), Some(UNKNOWN_QUALITY));
    }

    #[test]
    fn test_single_image_has_no_ordinal() {
        let p = payload(json!({"images": ["https://cdn.example.com/only.webp"]}));
        let res = resolve_media_items(&p, "Solo", &request());
        assert_eq!(res.items.len(), 1);
        assert_eq!(res.items[0].filename, "Solo.webp");
    }

    #[test]
    fn test_direct_url_fallback_for_video() {
        let p = payload(json!({"title": "Clip", "url": "https://cdn.example.com/stream?id=9"}));
        let res = resolve_media_items(&p, "Clip", &request());

        assert_eq!(res.mode, ContentMode::SingleVideo);
        assert_eq!(res.items.len(), 1);
        let item = &res.items[0];
        assert_eq!(item.kind, MediaKind::Video);
        assert_eq!(item.format, "mp4");
        assert_eq!(item.quality.as_deref(), Some("unknown"));
        assert_eq!(item.filename, "Clip.mp4");
    }

    #[test]
    fn test_direct_url_fallback_for_audio() {
        let p = payload(json!({"url": "https://cdn.example.com/stream"}));
        let res = resolve_media_items(&p, "Clip", &request().with_audio_only(true));
        assert_eq!(res.items[0].kind, MediaKind::Audio);
        assert_eq!(res.items[0].format, "mp3");
    }

    #[test]
    fn test_formats_resolve_through_selector() {
        let p = payload(json!({
            "formats": [
                {"format_id": "18", "url": "https://v/18", "ext": "mp4", "height": 360, "vcodec": "avc1", "acodec": "mp4a", "filesize": 1000},
                {"format_id": "22", "url": "https://v/22", "ext": "mp4", "height": 720, "vcodec": "avc1", "acodec": "mp4a", "filesize_approx": 5000}
            ]
        }));
        let res = resolve_media_items(&p, "Talk", &request());

        assert_eq!(res.items.len(), 1);
        let item = &res.items[0];
        assert_eq!(item.source_url, "https://v/22");
        assert_eq!(item.quality.as_deref(), Some("720p"));
        assert_eq!(item.size_bytes, Some(5000));
        assert_eq!(item.filename, "Talk_720p.mp4");

        let res = resolve_media_items(
            &p,
            "Talk",
            &request().with_quality(QualityPolicy::Worst),
        );
        assert_eq!(res.items[0].size_bytes, Some(1000));
    }

    #[test]
    fn test_unmatched_formats_fall_back_to_direct_url() {
        let p = payload(json!({
            "url": "https://cdn.example.com/direct",
            "formats": [{"format_id": "v", "url": "https://v/1", "vcodec": "avc1", "acodec": "none"}]
        }));
        let res = resolve_media_items(&p, "Song", &request().with_audio_only(true));
        assert_eq!(res.items.len(), 1);
        assert_eq!(res.items[0].source_url, "https://cdn.example.com/direct");
        assert_eq!(res.items[0].format, "mp3");
    }

    #[test]
    fn test_nothing_playable_is_empty_not_error() {
        let p = payload(json!({"title": "Locked"}));
        let res = resolve_media_items(&p, "Locked", &request());
        assert!(res.items.is_empty());
        assert_eq!(res.mode, ContentMode::SingleVideo);
    }

    #[test]
    fn test_mixed_entries() {
        let p = payload(json!({
            "_type": "playlist",
            "entries": [
                {"url": "https://cdn.example.com/a.jpg"},
                {"title": "Clip", "url": "https://cdn.example.com/b.mp4", "ext": "mp4"}
            ]
        }));
        let res = resolve_media_items(&p, "Post", &request());
        assert_eq!(res.mode, ContentMode::Mixed);
        assert_eq!(res.items.len(), 2);
        assert_eq!(res.items[0].kind, MediaKind::Image);
        assert_eq!(res.items[1].kind, MediaKind::Video);
    }

    #[test]
    fn test_playlist_entries_with_duplicate_titles_stay_unique() {
        let p = payload(json!({
            "_type": "playlist",
            "entries": [
                {"url": "https://cdn.example.com/1"},
                {"url": "https://cdn.example.com/2"}
            ]
        }));
        let res = resolve_media_items(&p, "Series", &request());
        assert_eq!(res.mode, ContentMode::Playlist);
        let names: Vec<&str> = res.items.iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, vec!["Series_1.mp4", "Series_2.mp4"]);
    }

    #[test]
    fn test_long_format_notes_on_duplicate_titles_stay_unique() {
        let entry = json!({
            "formats": [{
                "format_id": "hd",
                "url": "https://v/hd",
                "vcodec": "avc1",
                "format_note": "Premium quality stream, 60fps, HDR"
            }]
        });
        let p = payload(json!({"_type": "playlist", "entries": [entry.clone(), entry]}));
        let res = resolve_media_items(&p, "Concert", &request());

        assert_eq!(res.items.len(), 2);
        let first = &res.items[0].filename;
        let second = &res.items[1].filename;
        assert_ne!(first, second);
        assert!(first.ends_with("_1.mp4"), "{first}");
        assert!(second.ends_with("_2.mp4"), "{second}");
        assert!(first.starts_with("Concert_Premium"));
        assert!(first.len() <= crate::media::MAX_FILENAME_BYTES);
    }

    #[test]
    fn test_all_image_entries_resolve_as_images() {
        let p = payload(json!({
            "_type": "playlist",
            "entries": [
                {"url": "https://cdn.example.com/1.jpg"},
                {"url": "https://cdn.example.com/2.jpg"},
                {"url": "https://cdn.example.com/3.jpg"}
            ]
        }));
        let res = resolve_media_items(&p, "Gallery", &request());
        assert_eq!(res.mode, ContentMode::Images);
        assert_eq!(res.items.len(), 3);
        assert_eq!(res.items[2].filename, "Gallery_3.jpg");
    }
}
