use super::classify::{classify_engine_error, FailureKind};
use super::payload::RawPayload;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptKind {
    Primary,
    Alternate,
    BasicInfo,
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Alternate => write!(f, "alternate"),
            Self::BasicInfo => write!(f, "basic-info"),
        }
    }
}

/// How the engine should be invoked for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptProfile {
    pub kind: AttemptKind,
    pub user_agent: String,
    pub retries: u32,
    pub socket_timeout: Duration,
    /// Internal client the engine should impersonate, if it supports several.
    pub player_client: Option<String>,
    pub skip_manifests: bool,
    /// Ask only for descriptive metadata; playable formats are not needed.
    pub metadata_only: bool,
    pub playlist_limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub kind: FailureKind,
    /// Raw engine output; for logs only.
    pub detail: String,
}

impl EngineFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn from_stderr(stderr: &str) -> Self {
        Self::new(classify_engine_error(stderr), stderr.trim())
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Human-readable name of the engine
    fn name(&self) -> &'static str;

    /// Fetch the raw metadata payload for `url`
    async fn extract(&self, url: &str, profile: &AttemptProfile)
        -> Result<RawPayload, EngineFailure>;

    /// Whether the engine can run on this system
    async fn is_available(&self) -> bool;
}
