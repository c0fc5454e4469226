//! Conversion helpers for loosely-typed engine values.
//!
//! Nothing here returns an error: a value that cannot be interpreted becomes
//! `None` (or the documented sentinel) and the caller carries on.

use crate::utils::truncate_to_bytes;
use serde_json::Value;

pub const UNKNOWN_DURATION: &str = "Unknown";

/// Anything longer than a week is treated as garbage rather than a duration.
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 3600;

pub const FILENAME_BASE_MAX_BYTES: usize = 150;
const FILENAME_TAG_MAX_BYTES: usize = 32;
const FILENAME_EXT_MAX_BYTES: usize = 16;

/// Upper bound for any name produced by [`sanitize_filename`]: base, tag, extension and separators.
pub const MAX_FILENAME_BYTES: usize =
    FILENAME_BASE_MAX_BYTES + 1 + FILENAME_TAG_MAX_BYTES + 1 + FILENAME_EXT_MAX_BYTES;

pub const FILENAME_PLACEHOLDER: &str = "untitled";

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

const RESERVED_WINDOWS_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercedDuration {
    pub seconds: Option<u64>,
    pub display: String,
}

impl CoercedDuration {
    fn unknown() -> Self {
        Self {
            seconds: None,
            display: UNKNOWN_DURATION.to_string(),
        }
    }
}

/// Interprets a number, a numeric string, or nothing as a duration in seconds.
///
/// Fractional seconds are truncated. The display is `HH:MM:SS` when there is at
/// least one hour, `MM:SS` otherwise.
pub fn coerce_duration(value: Option<&Value>) -> CoercedDuration {
    let Some(secs) = value.and_then(coerce_f64) else {
        return CoercedDuration::unknown();
    };
    if secs < 0.0 || secs > MAX_DURATION_SECS as f64 {
        return CoercedDuration::unknown();
    }

    let total = secs.trunc() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let display = if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    };

    CoercedDuration {
        seconds: Some(total),
        display,
    }
}

/// Finite float from a JSON number or a numeric string.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => strip_digit_grouping(s.trim())?.parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Removes thousands separators (`1,234,567.8`). Any other comma makes the text non-numeric.
fn strip_digit_grouping(text: &str) -> Option<String> {
    if !text.contains(',') {
        return Some(text.to_string());
    }

    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text, None),
    };
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());

    let mut groups = integer.trim_start_matches(['-', '+']).split(',');
    let first = groups.next()?;
    let grouped = (1..=3).contains(&first.len())
        && all_digits(first)
        && groups.all(|group| group.len() == 3 && all_digits(group));
    if !grouped {
        return None;
    }

    let mut stripped = integer.replace(',', "");
    if let Some(fraction) = fraction {
        stripped.push('.');
        stripped.push_str(fraction);
    }
    Some(stripped)
}

/// Non-negative integer from a JSON number or numeric string, truncating fractions.
pub fn coerce_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    coerce_f64(value)
        .filter(|v| *v >= 0.0 && *v <= u64::MAX as f64)
        .map(|v| v.trunc() as u64)
}

/// Trimmed, non-empty text. Numbers are rendered as text; everything else is dropped.
pub fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Builds a filename that is safe on Windows, macOS and Linux.
///
/// The base is cut to [`FILENAME_BASE_MAX_BYTES`] before the optional tag
/// (`_<tag>`) and the extension are appended.
pub fn sanitize_filename(title: &str, extension: &str, quality_tag: Option<&str>) -> String {
    let mut base = clean_component(title);
    base = truncate_to_bytes(&base, FILENAME_BASE_MAX_BYTES)
        .trim_end_matches(['.', ' '])
        .to_string();
    if base.is_empty() {
        base = FILENAME_PLACEHOLDER.to_string();
    }
    if RESERVED_WINDOWS_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(&base))
    {
        base = format!("_{}", base);
    }

    let mut filename = base;

    if let Some(tag) = quality_tag {
        let tag = clean_component(tag).replace(' ', "_");
        let tag = truncate_to_bytes(&tag, FILENAME_TAG_MAX_BYTES).trim_end_matches('.');
        if !tag.is_empty() {
            filename.push('_');
            filename.push_str(tag);
        }
    }

    let ext: String = extension
        .trim()
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let ext = truncate_to_bytes(&ext, FILENAME_EXT_MAX_BYTES);
    if !ext.is_empty() {
        filename.push('.');
        filename.push_str(ext);
    }

    filename
}

/// Tag carrying a 1-based ordinal, e.g. `720p_2`.
///
/// The tag is shortened first so the ordinal always survives the tag bound
/// applied by [`sanitize_filename`].
pub fn ordinal_tag(tag: Option<&str>, ordinal: usize) -> String {
    let ordinal = ordinal.to_string();
    let Some(tag) = tag else {
        return ordinal;
    };

    let tag = clean_component(tag).replace(' ', "_");
    let room = FILENAME_TAG_MAX_BYTES.saturating_sub(ordinal.len() + 1);
    let tag = truncate_to_bytes(&tag, room).trim_end_matches(['.', '_']);
    if tag.is_empty() {
        ordinal
    } else {
        format!("{}_{}", tag, ordinal)
    }
}

fn clean_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if RESERVED_CHARS.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();
    replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(['.', ' '])
        .to_string()
}
