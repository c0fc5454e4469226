use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mediagrab::config::{get_config_path, Config};
use mediagrab::media::{
    ExtractionError, ExtractionRequest, MediaResolver, QualityPolicy, VideoInfo,
    SUPPORTED_PLATFORMS,
};
use mediagrab::utils::format_number;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the post, video or playlist to resolve
    #[arg(required_unless_present_any = ["platforms", "check"])]
    url: Option<String>,

    /// best, worst, or a target height such as 720
    #[arg(short, long, default_value = "best")]
    quality: QualityPolicy,

    /// Resolve audio-only formats
    #[arg(short, long)]
    audio_only: bool,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// List supported platforms and exit
    #[arg(long)]
    platforms: bool,

    /// Check that the extraction engine is installed and exit
    #[arg(long)]
    check: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    match get_config_path(args.config.as_deref()) {
        Some(config_path) => Config::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path)),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    // stdout carries the result, so logs go to stderr
    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_platforms() {
    for platform in SUPPORTED_PLATFORMS {
        println!(
            "{:<12} {}{}",
            platform.name,
            platform.domains.join(", "),
            if platform.supports_audio { "" } else { " (no audio)" }
        );
    }
}

fn print_text(info: &VideoInfo) {
    println!("{}", info.title);
    println!("  Site:      {}", info.source_site);
    if let Some(uploader) = &info.uploader {
        println!("  Uploader:  {}", uploader);
    }
    if let Some(duration) = &info.duration_display {
        println!("  Duration:  {}", duration);
    }
    if let Some(date) = &info.upload_date {
        println!("  Uploaded:  {}", date);
    }
    if let Some(views) = info.view_count {
        println!("  Views:     {}", format_number(views));
    }
    if let Some(likes) = info.like_count {
        println!("  Likes:     {}", format_number(likes));
    }
    if let Some(thumbnail) = &info.thumbnail_primary {
        println!("  Thumbnail: {}", thumbnail);
    }
    if info.restricted {
        println!("  Note: the platform limited access, only basic information is available");
    }

    println!("  Media ({:?}):", info.content_mode);
    for item in &info.media_items {
        let size = item
            .size_bytes
            .map(|bytes| format!(", {} bytes", format_number(bytes)))
            .unwrap_or_default();
        println!(
            "    {} [{}{}] {}",
            item.filename,
            item.quality.as_deref().unwrap_or("unknown"),
            size,
            item.source_url
        );
    }
}

/// Prints the result and picks the process exit code.
fn finish(result: Result<VideoInfo, ExtractionError>, output: OutputFormat) -> Result<ExitCode> {
    match result {
        Ok(video_info) => {
            match output {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&video_info)
                        .context("Failed to serialize result")?
                ),
                OutputFormat::Text => print_text(&video_info),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.platforms {
        print_platforms();
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&args)?;
    init_logging(&config);

    info!("Starting mediagrab...");

    let resolver = MediaResolver::new(&config);

    if args.check {
        resolver.test_setup().await?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(url) = args.url.as_deref() else {
        anyhow::bail!("A URL is required");
    };

    let request = ExtractionRequest::new(url)
        .with_quality(args.quality)
        .with_audio_only(args.audio_only);

    finish(resolver.resolve(&request).await, args.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagrab::media::{AttemptKind, FailureDetail, FailureKind};

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["mediagrab", "https://youtu.be/x", "-q", "720p", "-o", "text"])
            .unwrap();
        assert_eq!(args.url.as_deref(), Some("https://youtu.be/x"));
        assert_eq!(args.quality, QualityPolicy::Height(720));
        assert_eq!(args.output, OutputFormat::Text);
        assert!(!args.audio_only);

        assert!(Args::try_parse_from(["mediagrab", "--platforms"]).is_ok());
        assert!(Args::try_parse_from(["mediagrab"]).is_err());
        assert!(Args::try_parse_from(["mediagrab", "https://youtu.be/x", "-q", "huge"]).is_err());
    }

    #[test]
    fn test_extraction_failure_exits_with_failure() {
        let err = ExtractionError::new(
            FailureKind::NotFound,
            FailureDetail {
                platform: "YouTube".to_string(),
                profile: AttemptKind::Primary,
                reason: FailureKind::NotFound.description().to_string(),
            },
        );
        let code = finish(Err(err), OutputFormat::Json).unwrap();
        assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::FAILURE));
    }
}
