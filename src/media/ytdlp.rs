use super::{
    classify::FailureKind,
    engine::{AttemptProfile, EngineFailure, ExtractionEngine},
    payload::RawPayload,
};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub struct YtDlpEngine {
    binary: String,
}

impl YtDlpEngine {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    fn build_args(url: &str, profile: &AttemptProfile) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "--playlist-end".to_string(),
            profile.playlist_limit.to_string(),
            "--socket-timeout".to_string(),
            profile.socket_timeout.as_secs().max(1).to_string(),
            "--retries".to_string(),
            profile.retries.to_string(),
            "--user-agent".to_string(),
            profile.user_agent.clone(),
        ];

        let mut youtube_args = Vec::new();
        if let Some(client) = &profile.player_client {
            youtube_args.push(format!("player_client={}", client));
        }
        if profile.skip_manifests && !profile.metadata_only {
            youtube_args.push("skip=hls,dash".to_string());
        }
        if !youtube_args.is_empty() {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:{}", youtube_args.join(";")));
        }

        if profile.metadata_only {
            args.push("--ignore-no-formats-error".to_string());
            args.push("--skip-download".to_string());
        }

        args.push(url.to_string());
        args
    }

    fn parse_output(stdout: &[u8]) -> Result<RawPayload, EngineFailure> {
        let json: Value = serde_json::from_slice(stdout).map_err(|e| {
            EngineFailure::new(
                FailureKind::MalformedSource,
                format!("Failed to parse engine output: {}", e),
            )
        })?;

        RawPayload::from_value(json).ok_or_else(|| {
            EngineFailure::new(
                FailureKind::MalformedSource,
                "Engine output is not a JSON object",
            )
        })
    }
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract(
        &self,
        url: &str,
        profile: &AttemptProfile,
    ) -> Result<RawPayload, EngineFailure> {
        let args = Self::build_args(url, profile);
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                EngineFailure::new(
                    FailureKind::Unknown,
                    format!("Failed to run {}: {}", self.binary, e),
                )
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr ({} profile): {}", profile.kind, error.trim());
            return Err(EngineFailure::from_stderr(&error));
        }

        Self::parse_output(&output.stdout)
    }

    async fn is_available(&self) -> bool {
        match Command::new(&self.binary).arg("--version").output().await {
            Ok(output) => {
                if output.status.success() {
                    let version = String::from_utf8_lossy(&output.stdout);
                    info!("✅ yt-dlp is available, version: {}", version.trim());
                    true
                } else {
                    warn!("❌ yt-dlp command failed");
                    false
                }
            }
            Err(e) => {
                warn!("❌ yt-dlp not found: {}", e);
                false
            }
        }
    }
}
