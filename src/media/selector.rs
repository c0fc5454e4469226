use super::payload::{RawFormat, RawThumbnail};
use super::types::QualityPolicy;
use std::cmp::Ordering;

/// Picks the thumbnail to show first.
///
/// With resolution metadata the largest image wins (ties go to the later
/// entry). Without it, engines list thumbnails from worst to best, so the
/// last usable entry is taken.
pub fn select_primary_thumbnail(thumbnails: &[RawThumbnail]) -> Option<&str> {
    let usable: Vec<&RawThumbnail> = thumbnails.iter().filter(|t| t.url.is_some()).collect();

    let by_area = usable
        .iter()
        .filter_map(|t| t.pixel_area().map(|area| (area, *t)))
        .max_by_key(|(area, _)| *area)
        .map(|(_, t)| t);

    by_area
        .or_else(|| usable.last().copied())
        .and_then(|t| t.url.as_deref())
}

/// Narrows an engine format list to what should be offered for download.
///
/// Returns at most one format. An empty result means no structured format
/// qualified and the caller should fall back to the payload's direct URL.
pub fn select_formats_by_quality<'a>(
    formats: &'a [RawFormat],
    policy: QualityPolicy,
    audio_only: bool,
) -> Vec<&'a RawFormat> {
    let downloadable = formats.iter().filter(|f| f.url.is_some());

    if audio_only {
        let audio: Vec<&RawFormat> = downloadable.filter(|f| f.is_audio_only()).collect();
        return best_audio(&audio).into_iter().collect();
    }

    let video: Vec<&RawFormat> = downloadable.filter(|f| f.has_video()).collect();
    let chosen = match policy {
        QualityPolicy::Best => pick_extremal(&video, Ordering::Greater),
        QualityPolicy::Worst => pick_extremal(&video, Ordering::Less),
        QualityPolicy::Height(target) => pick_nearest(&video, target as u64),
    };
    chosen.into_iter().collect()
}

fn height_of(format: &RawFormat) -> u64 {
    format.height.unwrap_or(0)
}

/// Among formats of equal height, ones carrying audio come first, then higher total bitrate.
fn tie_break(a: &RawFormat, b: &RawFormat) -> Ordering {
    a.has_audio()
        .cmp(&b.has_audio())
        .then_with(|| {
            a.tbr
                .unwrap_or(0.0)
                .partial_cmp(&b.tbr.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        })
}

/// First format whose key is strictly better than every earlier one, so input order breaks exact ties.
fn first_best<'a, F>(formats: &[&'a RawFormat], mut better: F) -> Option<&'a RawFormat>
where
    F: FnMut(&RawFormat, &RawFormat) -> bool,
{
    let mut best: Option<&'a RawFormat> = None;
    for &format in formats {
        match best {
            Some(current) if !better(format, current) => {}
            _ => best = Some(format),
        }
    }
    best
}

fn pick_extremal<'a>(formats: &[&'a RawFormat], direction: Ordering) -> Option<&'a RawFormat> {
    first_best(formats, |candidate, current| {
        match height_of(candidate).cmp(&height_of(current)) {
            Ordering::Equal => tie_break(candidate, current) == Ordering::Greater,
            ord => ord == direction,
        }
    })
}

/// Exact height first, then the tallest format under the target, then the shortest above it.
fn pick_nearest<'a>(formats: &[&'a RawFormat], target: u64) -> Option<&'a RawFormat> {
    let exact: Vec<&RawFormat> = formats
        .iter()
        .copied()
        .filter(|f| height_of(f) == target)
        .collect();
    if !exact.is_empty() {
        return pick_extremal(&exact, Ordering::Greater);
    }

    let below: Vec<&RawFormat> = formats
        .iter()
        .copied()
        .filter(|f| height_of(f) < target)
        .collect();
    if !below.is_empty() {
        return pick_extremal(&below, Ordering::Greater);
    }

    pick_extremal(formats, Ordering::Less)
}

fn best_audio<'a>(formats: &[&'a RawFormat]) -> Option<&'a RawFormat> {
    first_best(formats, |candidate, current| {
        let a = candidate.abr.or(candidate.tbr).unwrap_or(0.0);
        let b = current.abr.or(current.tbr).unwrap_or(0.0);
        a > b
    })
}
