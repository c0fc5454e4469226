mod classify;
mod coerce;
mod engine;
mod error;
mod normalize;
mod orchestrator;
mod payload;
mod platforms;
mod resolver;
mod selector;
mod types;
mod ytdlp;

pub use classify::{classify_engine_error, FailureKind};
pub use coerce::{coerce_duration, sanitize_filename, CoercedDuration, MAX_FILENAME_BYTES};
pub use engine::{AttemptKind, AttemptProfile, EngineFailure, ExtractionEngine};
pub use error::{ExtractionError, FailureDetail};
pub use normalize::{normalize, NormalizeSettings};
pub use orchestrator::{next_attempt, AttemptFailure, ExtractionOrchestrator};
pub use payload::RawPayload;
pub use platforms::{detect_platform, Platform, SUPPORTED_PLATFORMS};
pub use resolver::{resolve_media_items, Resolution, UNKNOWN_QUALITY};
pub use selector::{select_formats_by_quality, select_primary_thumbnail};
pub use types::{
    ContentMode, ExtractionRequest, FormatSummary, MediaItem, MediaKind, QualityPolicy, VideoInfo,
};
pub use ytdlp::YtDlpEngine;

use crate::config::Config;
use anyhow::Result;
use tracing::{info, warn};

pub struct MediaResolver {
    orchestrator: ExtractionOrchestrator,
}

impl MediaResolver {
    pub fn new(config: &Config) -> Self {
        info!(
            "Media resolver initialized - using {} with fallback chain primary -> alternate -> basic-info",
            config.engine.binary
        );

        let engine = Box::new(YtDlpEngine::new(&config.engine.binary));
        Self::with_engine(engine, config)
    }

    pub fn with_engine(engine: Box<dyn ExtractionEngine>, config: &Config) -> Self {
        Self {
            orchestrator: ExtractionOrchestrator::new(
                engine,
                &config.engine,
                config.normalize_settings(),
            ),
        }
    }

    pub async fn resolve(&self, request: &ExtractionRequest) -> Result<VideoInfo, ExtractionError> {
        info!("Starting extraction for URL: {}", request.url);

        if !self.is_supported_url(&request.url) {
            warn!(
                "{} is not a known platform, trying {} anyway",
                request.url,
                self.orchestrator.engine().name()
            );
        }

        self.orchestrator.extract(request).await
    }

    pub fn is_supported_url(&self, url: &str) -> bool {
        platforms::is_supported_url(url)
    }

    pub async fn test_setup(&self) -> Result<()> {
        info!("Testing media resolver setup...");

        let engine = self.orchestrator.engine();
        if engine.is_available().await {
            info!("✅ {} is available", engine.name());
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "{} is not available. Please install it or set engine.binary in the config.",
                engine.name()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_url() {
        let resolver = MediaResolver::new(&Config::default());
        assert!(resolver.is_supported_url("https://x.com/user/status/123"));
        assert!(resolver.is_supported_url("https://youtube.com/watch?v=123"));
        assert!(!resolver.is_supported_url("https://example.com/video.mp4"));
        assert!(!resolver.is_supported_url(""));
    }

    #[tokio::test]
    async fn test_setup_fails_without_engine() {
        let mut config = Config::default();
        config.engine.binary = "/nonexistent/yt-dlp-binary".to_string();
        let resolver = MediaResolver::new(&config);
        assert!(resolver.test_setup().await.is_err());
    }

    #[tokio::test]
    async fn test_missing_engine_is_a_typed_failure() {
        let mut config = Config::default();
        config.engine.binary = "/nonexistent/yt-dlp-binary".to_string();
        let resolver = MediaResolver::new(&config);

        let err = resolver
            .resolve(&ExtractionRequest::new("https://vimeo.com/1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unknown);
        assert_eq!(err.detail().platform, "Vimeo");
        assert_eq!(err.detail().profile, AttemptKind::Primary);
    }

    #[tokio::test]
    #[ignore = "Requires yt-dlp installed"]
    async fn test_resolve_real_video() {
        let resolver = MediaResolver::new(&Config::default());
        let info = resolver
            .resolve(&ExtractionRequest::new(
                "https://www.youtube.com/watch?v=jNQXAC9IVRw",
            ))
            .await
            .unwrap();
        assert!(!info.title.is_empty());
        assert_eq!(info.source_site, "YouTube");
    }
}
