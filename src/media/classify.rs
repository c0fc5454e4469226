//! Maps engine error text onto failure kinds.
//!
//! Matching is case-insensitive substring search against the lists below,
//! checked in order: restriction, not-found, timeout, malformed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    AccessRestricted,
    NotFound,
    Timeout,
    MalformedSource,
    Unknown,
}

impl FailureKind {
    pub fn description(&self) -> &'static str {
        match self {
            Self::AccessRestricted => "platform restricted automated access",
            Self::NotFound => "content not found or unavailable",
            Self::Timeout => "engine did not respond in time",
            Self::MalformedSource => "engine returned unusable data",
            Self::Unknown => "extraction failed for an unknown reason",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AccessRestricted => "access restricted",
            Self::NotFound => "not found",
            Self::Timeout => "timeout",
            Self::MalformedSource => "malformed source",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

pub const ACCESS_RESTRICTED_SIGNATURES: &[&str] = &[
    "sign in to confirm you're not a bot",
    "sign in to confirm you’re not a bot",
    "confirm you are not a robot",
    "captcha",
    "http error 403",
    "403: forbidden",
    "http error 429",
    "too many requests",
    "rate-limit reached",
    "rate limit",
    "login required",
    "requires authentication",
    "use --cookies",
    "cookies-from-browser",
    "po token",
    "this content isn't available to everyone",
    "age-restricted",
    "sign in to confirm your age",
    "not available in your country",
    "geo restricted",
];

pub const NOT_FOUND_SIGNATURES: &[&str] = &[
    "video unavailable",
    "http error 404",
    "404: not found",
    "does not exist",
    "has been removed",
    "private video",
    "this video is private",
    "no longer available",
    "account has been terminated",
    "post not found",
];

pub const TIMEOUT_SIGNATURES: &[&str] = &[
    "timed out",
    "timeout",
    "connection reset",
    "temporary failure in name resolution",
    "network is unreachable",
];

pub const MALFORMED_SIGNATURES: &[&str] = &[
    "unsupported url",
    "unable to extract",
    "no video formats found",
    "unable to download json metadata",
    "failed to parse json",
    "jsondecodeerror",
];

/// Classifies raw engine error text.
pub fn classify_engine_error(text: &str) -> FailureKind {
    let lowered = text.to_lowercase();
    let matches = |signatures: &[&str]| signatures.iter().any(|sig| lowered.contains(sig));

    if matches(ACCESS_RESTRICTED_SIGNATURES) {
        FailureKind::AccessRestricted
    } else if matches(NOT_FOUND_SIGNATURES) {
        FailureKind::NotFound
    } else if matches(TIMEOUT_SIGNATURES) {
        FailureKind::Timeout
    } else if matches(MALFORMED_SIGNATURES) {
        FailureKind::MalformedSource
    } else {
        FailureKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_challenge_is_restricted() {
        let stderr = "ERROR: [youtube] dQw4w9WgXcQ: Sign in to confirm you're not a bot. \
                      Use --cookies-from-browser or --cookies for the authentication.";
        assert_eq!(classify_engine_error(stderr), FailureKind::AccessRestricted);
    }

    #[test]
    fn test_instagram_rate_limit_is_restricted() {
        let stderr = "ERROR: [Instagram] C1a2b3: Requested content is not available, \
                      rate-limit reached or login required";
        assert_eq!(classify_engine_error(stderr), FailureKind::AccessRestricted);
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(
            classify_engine_error("ERROR: [youtube] abc: Video unavailable"),
            FailureKind::NotFound
        );
        assert_eq!(
            classify_engine_error("ERROR: Unable to download webpage: The read operation timed out"),
            FailureKind::Timeout
        );
        assert_eq!(
            classify_engine_error("ERROR: Unsupported URL: https://example.com/"),
            FailureKind::MalformedSource
        );
        assert_eq!(classify_engine_error("something odd"), FailureKind::Unknown);
        assert_eq!(classify_engine_error(""), FailureKind::Unknown);
    }

    #[test]
    fn test_restriction_wins_over_other_signatures() {
        let stderr = "HTTP Error 429: Too Many Requests (read timed out)";
        assert_eq!(classify_engine_error(stderr), FailureKind::AccessRestricted);
    }

    #[test]
    fn test_signature_lists_are_lowercase() {
        for list in [
            ACCESS_RESTRICTED_SIGNATURES,
            NOT_FOUND_SIGNATURES,
            TIMEOUT_SIGNATURES,
            MALFORMED_SIGNATURES,
        ] {
            for sig in list {
                assert_eq!(*sig, sig.to_lowercase());
            }
        }
    }
}
