use std::collections::HashMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// --- Platforms ---

/// Closed set of recognized content sources. `Website` is the catch-all
/// for URLs matching no specific platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Imdb,
    Tmdb,
    Omdb,
    Youtube,
    Vimeo,
    Linkedin,
    Facebook,
    Website,
}

impl Platform {
    /// Parse a loose platform string, falling back to `Website` for
    /// anything outside the closed set.
    pub fn parse_or_website(s: &str) -> Self {
        Self::parse(s).unwrap_or(Platform::Website)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "imdb" => Some(Platform::Imdb),
            "tmdb" => Some(Platform::Tmdb),
            "omdb" => Some(Platform::Omdb),
            "youtube" => Some(Platform::Youtube),
            "vimeo" => Some(Platform::Vimeo),
            "linkedin" => Some(Platform::Linkedin),
            "facebook" => Some(Platform::Facebook),
            "website" => Some(Platform::Website),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Imdb => write!(f, "imdb"),
            Platform::Tmdb => write!(f, "tmdb"),
            Platform::Omdb => write!(f, "omdb"),
            Platform::Youtube => write!(f, "youtube"),
            Platform::Vimeo => write!(f, "vimeo"),
            Platform::Linkedin => write!(f, "linkedin"),
            Platform::Facebook => write!(f, "facebook"),
            Platform::Website => write!(f, "website"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SocialLink {
    pub platform: Platform,
    pub url: String,
}

// --- Crawl output ---

/// Everything extracted from one crawl attempt. Immutable after
/// extraction; a transport failure produces `CrawledPage::empty`, never
/// an error, so the pipeline can always proceed with partial data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Candidate images, og:image first, deduplicated, capped at 20.
    pub images: Vec<String>,
    /// All outbound links, absolute and deduplicated.
    pub links: Vec<String>,
    /// At most one link per non-website platform, first occurrence wins.
    pub social_links: Vec<SocialLink>,
    /// Plain body text, whitespace-collapsed, capped at 10,000 chars.
    pub text_content: String,
    pub metadata: HashMap<String, String>,
    /// Raw video-reference URLs found in links, embeds and scripts.
    pub video_urls: Vec<String>,
}

impl CrawledPage {
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: None,
            description: None,
            images: Vec::new(),
            links: Vec::new(),
            social_links: Vec::new(),
            text_content: String::new(),
            metadata: HashMap::new(),
            video_urls: Vec::new(),
        }
    }
}

// --- Enrichment output ---

/// A project mention pulled out of the enrichment free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedProject {
    pub title: String,
    pub year: String,
    pub role: String,
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub summary: String,
    pub projects: Vec<EnrichedProject>,
    pub collaborators: Vec<String>,
    pub success: bool,
}

impl EnrichmentResult {
    /// Degraded result for missing credentials or upstream failure.
    pub fn empty() -> Self {
        Self {
            summary: String::new(),
            projects: Vec::new(),
            collaborators: Vec::new(),
            success: false,
        }
    }
}

// --- Profile records ---

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Project {
    pub id: String,
    pub title: String,
    /// Free text, not guaranteed numeric ("2019", "2019-2021", "Unknown").
    pub year: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub platform: Platform,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub has_video: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Set once a human has overridden the cover image. The matcher and
    /// media reconciler must never replace a locked image.
    #[serde(default)]
    pub cover_image_locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaItem {
    pub id: String,
    /// Identity for deduplication.
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Normalized output of the synthesis step, before matching/reconciling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub years_active: String,
    pub confidence: f32,
    pub projects: Vec<Project>,
    pub media: Vec<MediaItem>,
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub url_hash: String,
    pub source_url: String,
    pub name: String,
    pub role: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Snapshot of projects.len() taken at assembly. Any operation that
    /// adds or removes projects must recompute it.
    pub project_count: usize,
    pub years_active: String,
    pub platforms: Vec<Platform>,
    pub social_links: Vec<SocialLink>,
    /// Synthesis confidence in [0, 1].
    pub confidence: f32,
    pub projects: Vec<Project>,
    pub media: Vec<MediaItem>,
    pub crawl_summary: CrawlSummary,
    pub created_at: DateTime<Utc>,
}
