//! Video and asset URL normalization.
//!
//! Everything here is total: malformed input degrades to the original
//! string or `None`, never an error, because stored documents carry years
//! of inconsistent media links and every one of them still has to render.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Origins baked into documents saved against a local development API.
pub const LEGACY_ORIGINS: &[&str] = &[
    "http://localhost:5001",
    "http://127.0.0.1:5001",
    "https://localhost:5001",
    "https://127.0.0.1:5001",
];

/// Origin-relative prefix of files served by the content API.
pub const UPLOADS_PREFIX: &str = "/uploads";

const EMBED_BASE: &str = "https://www.youtube.com/embed/";
const EMBED_PARAMS: &str = "?rel=0&modestbranding=1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Youtube,
    File,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Youtube => "youtube",
            SourceKind::File => "file",
        }
    }
}

fn path_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/(?:embed|shorts|live)/([A-Za-z0-9_-]{6,})").expect("valid path id regex")
    })
}

fn loose_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:v=|/)([A-Za-z0-9_-]{11})(?:[?&]|$)").expect("valid loose id regex")
    })
}

/// Decide how a video URL should be played.
pub fn classify_source(url: &str) -> SourceKind {
    let lower = url.to_lowercase();
    if lower.contains("youtube.com") || lower.contains("youtu.be") {
        SourceKind::Youtube
    } else {
        SourceKind::File
    }
}

/// Pull the YouTube video id out of any of the URL shapes people paste:
/// `watch?v=`, `youtu.be/<id>`, `/embed/<id>`, `/shorts/<id>`, `/live/<id>`.
/// Returns `None` for anything that does not parse as an absolute URL.
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let host = parsed.host_str().unwrap_or("");
    if host.contains("youtu.be") {
        return parsed
            .path_segments()
            .and_then(|mut segs| segs.next())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
    }

    if let Some((_, v)) = parsed.query_pairs().find(|(k, v)| k == "v" && !v.is_empty()) {
        return Some(v.into_owned());
    }

    if let Some(caps) = path_id_re().captures(parsed.path()) {
        return Some(caps[1].to_string());
    }

    loose_id_re()
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Embeddable player URL, or the input unchanged when no id is found.
pub fn build_embed_url(url: &str) -> String {
    match extract_video_id(url) {
        Some(id) => embed_url_for(&id),
        None => url.to_string(),
    }
}

fn embed_url_for(id: &str) -> String {
    format!("{}{}{}", EMBED_BASE, id, EMBED_PARAMS)
}

/// Canonicalize a stored video URL: trimmed, and YouTube links rewritten
/// to their embed form. Direct file links pass through.
pub fn sanitize_video_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match extract_video_id(trimmed) {
        Some(id) => embed_url_for(&id),
        None => trimmed.to_string(),
    }
}

/// MIME hint for a `<source>` element. Unknown extensions get no hint at all.
pub fn detect_mime_type(url: &str) -> Option<&'static str> {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or("")
        .to_lowercase();
    if path.ends_with(".mp4") {
        Some("video/mp4")
    } else if path.ends_with(".mov") {
        Some("video/quicktime")
    } else if path.ends_with(".webm") {
        Some("video/webm")
    } else {
        None
    }
}

/// Rewrite stale development origins and bare upload paths onto the active
/// API origin. Plain prefix matching, so `http`/`https` variants of the same
/// legacy host are all caught.
pub fn normalize_asset_url(url: &str, active_origin: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let origin = active_origin.trim_end_matches('/');

    for legacy in LEGACY_ORIGINS {
        if let Some(rest) = url.strip_prefix(legacy) {
            return format!("{}{}", origin, rest);
        }
    }

    if url.starts_with(UPLOADS_PREFIX) {
        return format!("{}{}", origin, url);
    }

    url.to_string()
}

/// Still frame YouTube generates for every video; used when no poster is set.
pub fn youtube_thumbnail(url: &str) -> Option<String> {
    if classify_source(url) != SourceKind::Youtube {
        return None;
    }
    extract_video_id(url).map(|id| format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id))
}
