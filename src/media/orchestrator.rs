//! Runs the extraction engine through its fallback chain.
//!
//! ```text
//! Primary ──restricted/untitled──▶ Alternate ──any failure──▶ BasicInfo
//!    │ other failure                   │                          │
//!    ▼                                 ▼ success                  ▼ success
//!  Err                            Ok(restricted=false)      Ok(restricted=true)
//! ```
//!
//! An attempt only succeeds if its payload carries a title.

use super::classify::FailureKind;
use super::engine::{AttemptKind, AttemptProfile, EngineFailure, ExtractionEngine};
use super::error::{ExtractionError, FailureDetail};
use super::normalize::{normalize, NormalizeSettings};
use super::payload::RawPayload;
use super::platforms::site_name;
use super::types::{ExtractionRequest, VideoInfo};
use crate::config::EngineConfig;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Engine(EngineFailure),
    /// The engine answered but gave no usable title.
    Untitled,
}

impl AttemptFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Engine(failure) => failure.kind,
            Self::Untitled => FailureKind::MalformedSource,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Self::Engine(failure) => failure.kind.description(),
            Self::Untitled => "engine returned no title",
        }
    }
}

/// Transition table of the fallback chain.
pub fn next_attempt(current: AttemptKind, failure: &AttemptFailure) -> Option<AttemptKind> {
    match (current, failure) {
        (AttemptKind::Primary, AttemptFailure::Untitled) => Some(AttemptKind::Alternate),
        (AttemptKind::Primary, AttemptFailure::Engine(f))
            if f.kind == FailureKind::AccessRestricted =>
        {
            Some(AttemptKind::Alternate)
        }
        (AttemptKind::Primary, AttemptFailure::Engine(_)) => None,
        (AttemptKind::Alternate, _) => Some(AttemptKind::BasicInfo),
        (AttemptKind::BasicInfo, _) => None,
    }
}

/// Minimum contract for accepting an attempt's payload.
pub fn satisfies_minimum(payload: &RawPayload) -> bool {
    payload.has_title()
}

pub struct ExtractionOrchestrator {
    engine: Box<dyn ExtractionEngine>,
    primary: AttemptProfile,
    alternate: AttemptProfile,
    basic_info: AttemptProfile,
    attempt_timeout: Duration,
    settings: NormalizeSettings,
}

impl ExtractionOrchestrator {
    pub fn new(
        engine: Box<dyn ExtractionEngine>,
        config: &EngineConfig,
        settings: NormalizeSettings,
    ) -> Self {
        Self {
            engine,
            primary: config.profile(AttemptKind::Primary),
            alternate: config.profile(AttemptKind::Alternate),
            basic_info: config.profile(AttemptKind::BasicInfo),
            attempt_timeout: config.attempt_timeout(),
            settings,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn engine(&self) -> &dyn ExtractionEngine {
        self.engine.as_ref()
    }

    fn profile(&self, kind: AttemptKind) -> &AttemptProfile {
        match kind {
            AttemptKind::Primary => &self.primary,
            AttemptKind::Alternate => &self.alternate,
            AttemptKind::BasicInfo => &self.basic_info,
        }
    }

    /// Extracts and normalizes one URL.
    ///
    /// Dropping the returned future between attempts abandons the request;
    /// nothing is published until an attempt has fully succeeded.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<VideoInfo, ExtractionError> {
        let mut attempt = AttemptKind::Primary;
        let mut saw_restriction = false;

        loop {
            info!(
                "Extracting {} with {} ({} profile)",
                request.url,
                self.engine.name(),
                attempt
            );

            let failure = match self.run_attempt(&request.url, self.profile(attempt)).await {
                Ok(payload) if satisfies_minimum(&payload) => {
                    let restricted = attempt == AttemptKind::BasicInfo;
                    let payload = if restricted {
                        payload.into_metadata_only()
                    } else {
                        payload
                    };
                    let video_info = normalize(&payload, request, restricted, &self.settings);
                    info!(
                        "{} profile succeeded: {} media item(s), restricted={}",
                        attempt,
                        video_info.media_items.len(),
                        restricted
                    );
                    return Ok(video_info);
                }
                Ok(_) => {
                    warn!("{} profile returned a payload without a title", attempt);
                    AttemptFailure::Untitled
                }
                Err(failure) => {
                    warn!("{} profile failed: {}", attempt, failure.kind);
                    debug!("{} profile engine detail: {}", attempt, failure.detail);
                    AttemptFailure::Engine(failure)
                }
            };

            saw_restriction |= failure.kind() == FailureKind::AccessRestricted;

            match next_attempt(attempt, &failure) {
                Some(next) => {
                    info!("Falling back from {} to {} profile", attempt, next);
                    attempt = next;
                }
                None => return Err(self.final_error(request, attempt, &failure, saw_restriction)),
            }
        }
    }

    async fn run_attempt(
        &self,
        url: &str,
        profile: &AttemptProfile,
    ) -> Result<RawPayload, EngineFailure> {
        match tokio::time::timeout(self.attempt_timeout, self.engine.extract(url, profile)).await {
            Ok(result) => result,
            Err(_) => Err(EngineFailure::new(
                FailureKind::Timeout,
                format!(
                    "{} profile exceeded {}s",
                    profile.kind,
                    self.attempt_timeout.as_secs_f64()
                ),
            )),
        }
    }

    fn final_error(
        &self,
        request: &ExtractionRequest,
        attempt: AttemptKind,
        failure: &AttemptFailure,
        saw_restriction: bool,
    ) -> ExtractionError {
        let vague = matches!(failure, AttemptFailure::Untitled) || failure.kind() == FailureKind::Unknown;
        let kind = if saw_restriction && vague {
            FailureKind::AccessRestricted
        } else {
            failure.kind()
        };
        let reason = if kind == failure.kind() {
            failure.reason()
        } else {
            kind.description()
        };

        ExtractionError::new(
            kind,
            FailureDetail {
                platform: site_name(&request.url, None),
                profile: attempt,
                reason: reason.to_string(),
            },
        )
    }
}
