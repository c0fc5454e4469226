use super::classify::FailureKind;
use super::engine::AttemptKind;
use std::fmt;
use thiserror::Error;

/// Context reported with every extraction failure.
///
/// `reason` is a classified description, never the engine's raw output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub platform: String,
    pub profile: AttemptKind,
    pub reason: String,
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (platform: {}, profile: {})",
            self.reason, self.platform, self.profile
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Access restricted: {0}")]
    AccessRestricted(FailureDetail),
    #[error("Not found: {0}")]
    NotFound(FailureDetail),
    #[error("Timed out: {0}")]
    Timeout(FailureDetail),
    #[error("Malformed source: {0}")]
    MalformedSource(FailureDetail),
    #[error("Extraction failed: {0}")]
    Unknown(FailureDetail),
}

impl ExtractionError {
    pub fn new(kind: FailureKind, detail: FailureDetail) -> Self {
        match kind {
            FailureKind::AccessRestricted => Self::AccessRestricted(detail),
            FailureKind::NotFound => Self::NotFound(detail),
            FailureKind::Timeout => Self::Timeout(detail),
            FailureKind::MalformedSource => Self::MalformedSource(detail),
            FailureKind::Unknown => Self::Unknown(detail),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AccessRestricted(_) => FailureKind::AccessRestricted,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::MalformedSource(_) => FailureKind::MalformedSource,
            Self::Unknown(_) => FailureKind::Unknown,
        }
    }

    pub fn detail(&self) -> &FailureDetail {
        match self {
            Self::AccessRestricted(d)
            | Self::NotFound(d)
            | Self::Timeout(d)
            | Self::MalformedSource(d)
            | Self::Unknown(d) => d,
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        let platform = &self.detail().platform;
        match self {
            Self::AccessRestricted(_) => format!(
                "{} is blocking automated access to this content right now. Please try again later.",
                platform
            ),
            Self::NotFound(_) => format!(
                "This content could not be found on {}. It may be private or removed.",
                platform
            ),
            Self::Timeout(_) => format!("{} took too long to respond. Please try again.", platform),
            Self::MalformedSource(_) => format!(
                "The link could not be processed. Make sure it points to a {} post or video.",
                platform
            ),
            Self::Unknown(_) => "Something went wrong while reading this link.".to_string(),
        }
    }
}
