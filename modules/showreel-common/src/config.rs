use std::env;

/// Application configuration loaded from environment variables.
///
/// Every external credential is optional: a missing key disables that
/// collaborator and the pipeline degrades at that point instead of
/// failing (fallback synthesis, skipped enrichment, no poster lookup).
#[derive(Debug, Clone)]
pub struct Config {
    // AI providers
    pub gemini_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,

    // Catalog sources
    pub tmdb_api_key: Option<String>,
    pub omdb_api_key: Option<String>,

    // Video platforms
    pub youtube_api_key: Option<String>,

    // Rendered-DOM fallback
    pub browserless_url: Option<String>,
    pub browserless_token: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            perplexity_api_key: optional_env("PERPLEXITY_API_KEY"),
            tmdb_api_key: optional_env("TMDB_API_KEY"),
            omdb_api_key: optional_env("OMDB_API_KEY"),
            youtube_api_key: optional_env("YOUTUBE_API_KEY"),
            browserless_url: optional_env("BROWSERLESS_URL"),
            browserless_token: optional_env("BROWSERLESS_TOKEN"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
        }
    }
}

/// Treat unset and empty the same — an empty key disables the feature.
fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
