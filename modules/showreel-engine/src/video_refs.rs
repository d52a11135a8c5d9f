//! Video-reference extraction from static HTML and rendered DOMs.
//!
//! The pattern table covers the watch, share and embed URL shapes of
//! the known video platforms. Static extraction scans links, iframes
//! and explicit data-attributes; the rendered-DOM pass scans the whole
//! document text wholesale (anchors, iframes, `<video>`/`<source>`,
//! class/id hints and inline scripts all end up in the same scan).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// URL shapes that identify a hosted video.
static VIDEO_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"youtube\.com/watch\?v=([^&\s]+)",
        r"youtu\.be/([^?\s]+)",
        r"youtube\.com/embed/([^?\s]+)",
        r"vimeo\.com/(\d+)",
        r"player\.vimeo\.com/video/(\d+)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Full-URL captures used when scanning raw document text, where the
/// match itself is the value we keep.
static VIDEO_URL_CAPTURES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"https?://(?:www\.)?youtube\.com/watch\?v=[A-Za-z0-9_-]+"#,
        r#"https?://youtu\.be/[A-Za-z0-9_-]+"#,
        r#"https?://(?:www\.)?youtube\.com/embed/[A-Za-z0-9_-]+"#,
        r#"https?://player\.vimeo\.com/video/\d+"#,
        r#"https?://(?:www\.)?vimeo\.com/(?:video/)?\d+"#,
        // Scheme-less forms appear inside inline script text.
        r#"vimeo\.com/(?:video/)?\d+"#,
        r#"youtube\.com/embed/[A-Za-z0-9_-]+"#,
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

pub fn is_video_url(url: &str) -> bool {
    VIDEO_URL_PATTERNS.iter().any(|p| p.is_match(url))
}

/// Scan statically-parsed page signals for video references: outbound
/// links, iframe src (including lazy-load data-src), and explicit
/// video data-attributes.
pub fn extract_static(html: &str, links: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    let mut push = |url: String| {
        if is_video_url(&url) && seen.insert(url.clone()) {
            urls.push(url);
        }
    };

    for link in links {
        push(link.clone());
    }

    let iframe_re = Regex::new(r"(?is)<iframe[^>]*>").expect("valid regex");
    for tag in iframe_re.find_iter(html) {
        if let Some(src) = tag_attr(tag.as_str(), "src").or_else(|| tag_attr(tag.as_str(), "data-src")) {
            push(src);
        }
    }

    let data_attr_re =
        Regex::new(r"(?is)<[^>]*data-(?:video|vimeo|youtube)-url[^>]*>").expect("valid regex");
    for tag in data_attr_re.find_iter(html) {
        for attr in ["data-video-url", "data-vimeo-url", "data-youtube-url"] {
            if let Some(url) = tag_attr(tag.as_str(), attr) {
                push(url);
            }
        }
    }

    urls
}

/// Scan a rendered DOM for video references. Matches anywhere in the
/// document — attribute values, element text and inline scripts alike.
/// Scheme-less script matches are qualified with https.
pub fn extract_rendered(rendered_html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for pattern in VIDEO_URL_CAPTURES.iter() {
        for m in pattern.find_iter(rendered_html) {
            let found = m.as_str();
            let url = if found.starts_with("http") {
                found.to_string()
            } else {
                format!("https://{found}")
            };
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    }

    urls
}

/// Pull one quoted attribute value out of a single tag's text.
pub(crate) fn tag_attr(tag: &str, name: &str) -> Option<String> {
    let re = Regex::new(&format!(r#"(?i)[\s"']{name}\s*=\s*["']([^"']*)["']"#))
        .expect("valid regex");
    re.captures(tag).map(|caps| caps[1].to_string())
}
