use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Platform {
    pub name: &'static str,
    pub domains: &'static [&'static str],
    pub supports_audio: bool,
}

pub const SUPPORTED_PLATFORMS: &[Platform] = &[
    Platform {
        name: "YouTube",
        domains: &["youtube.com", "youtu.be"],
        supports_audio: true,
    },
    Platform {
        name: "TikTok",
        domains: &["tiktok.com"],
        supports_audio: true,
    },
    Platform {
        name: "Instagram",
        domains: &["instagram.com"],
        supports_audio: true,
    },
    Platform {
        name: "Twitter/X",
        domains: &["twitter.com", "x.com"],
        supports_audio: true,
    },
    Platform {
        name: "Facebook",
        domains: &["facebook.com", "fb.watch"],
        supports_audio: true,
    },
    Platform {
        name: "Twitch",
        domains: &["twitch.tv"],
        supports_audio: true,
    },
    Platform {
        name: "Vimeo",
        domains: &["vimeo.com"],
        supports_audio: true,
    },
    Platform {
        name: "Dailymotion",
        domains: &["dailymotion.com"],
        supports_audio: true,
    },
    Platform {
        name: "Reddit",
        domains: &["reddit.com", "redd.it"],
        supports_audio: true,
    },
];

/// Lowercased host of `url`, without a leading "www.".
pub fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Matches the exact domain or any subdomain of it (`m.youtube.com`, not `notyoutube.com`).
pub fn detect_platform(url: &str) -> Option<&'static Platform> {
    let host = host_of(url)?;
    SUPPORTED_PLATFORMS.iter().find(|platform| {
        platform
            .domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    })
}

pub fn is_supported_url(url: &str) -> bool {
    detect_platform(url).is_some()
}

/// Best available name for the site a URL belongs to.
pub fn site_name(url: &str, extractor_key: Option<&str>) -> String {
    if let Some(platform) = detect_platform(url) {
        return platform.name.to_string();
    }
    if let Some(key) = extractor_key.filter(|k| !k.eq_ignore_ascii_case("generic")) {
        return key.to_string();
    }
    host_of(url).unwrap_or_else(|| "unknown".to_string())
}
