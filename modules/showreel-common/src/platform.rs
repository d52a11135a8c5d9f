use std::sync::LazyLock;

use regex::Regex;

use crate::types::Platform;

/// Ordered (platform, pattern) rules. Evaluated top to bottom; the
/// first match decides. `Website` is the default, not a rule.
static PLATFORM_PATTERNS: LazyLock<Vec<(Platform, Regex)>> = LazyLock::new(|| {
    [
        (Platform::Imdb, r"(?i)imdb\.com"),
        (Platform::Tmdb, r"(?i)themoviedb\.org"),
        (Platform::Omdb, r"(?i)omdbapi\.com"),
        (Platform::Youtube, r"(?i)youtube\.com|youtu\.be"),
        (Platform::Vimeo, r"(?i)vimeo\.com"),
        (Platform::Linkedin, r"(?i)linkedin\.com"),
        (Platform::Facebook, r"(?i)facebook\.com"),
    ]
    .into_iter()
    .map(|(platform, pattern)| (platform, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Map a URL to its platform. Total and deterministic: every input maps
/// to exactly one platform, `Website` when nothing matches.
pub fn classify_platform(url: &str) -> Platform {
    for (platform, pattern) in PLATFORM_PATTERNS.iter() {
        if pattern.is_match(url) {
            return *platform;
        }
    }
    Platform::Website
}
