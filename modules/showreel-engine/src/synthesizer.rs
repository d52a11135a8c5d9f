//! Profile synthesis: turn crawl plus enrichment signals into a
//! structured profile draft via the text model, with JSON repair for
//! slightly malformed responses and a deterministic heuristic fallback
//! when no generator is configured or generation fails.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use ai_client::util::{strip_code_blocks, truncate_to_char_boundary};
use showreel_common::{
    CrawledPage, EnrichmentResult, MediaItem, Platform, Project, SynthesisResult,
};

use crate::traits::TextGenerator;

const FALLBACK_CONFIDENCE: f32 = 0.4;
const MAX_PROMPT_TEXT_BYTES: usize = 3000;
const MAX_PROMPT_SUMMARY_BYTES: usize = 2000;
const MAX_FALLBACK_BIO_BYTES: usize = 300;
const MAX_FALLBACK_COLLABORATORS: usize = 3;

// --- Model-facing response shapes ---
//
// Deliberately loose: every field defaulted, year accepted as either a
// string or a number, so a partially conforming response still parses.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSynthesis {
    #[serde(default)]
    name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    years_active: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    projects: Vec<RawProject>,
    #[serde(default)]
    media: Vec<RawMedia>,
    #[serde(default)]
    platforms: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    #[serde(default)]
    title: String,
    #[serde(default)]
    year: serde_json::Value,
    #[serde(default)]
    role: String,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    platform: String,
    #[serde(default)]
    collaborators: Vec<String>,
    #[serde(default)]
    has_video: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMedia {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    platform: String,
    #[serde(default)]
    thumbnail: Option<String>,
}

/// Optional generation step backed by the text model.
pub struct Synthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Synthesizer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub async fn synthesize(
        &self,
        page: &CrawledPage,
        enrichment: &EnrichmentResult,
    ) -> SynthesisResult {
        let Some(generator) = &self.generator else {
            info!("No text generator configured, using heuristic fallback");
            return fallback(page, enrichment);
        };

        let prompt = build_prompt(page, enrichment);
        match generator.generate(&prompt).await {
            Ok(response) => match parse_response(&response) {
                Some(raw) => {
                    let mut result = normalize(raw);
                    // A parseable response with no name must not take
                    // the pipeline down later at assembly.
                    if result.name.trim().is_empty() {
                        result.name = subject_name(page);
                    }
                    info!(
                        name = %result.name,
                        projects = result.projects.len(),
                        media = result.media.len(),
                        "Synthesis complete"
                    );
                    result
                }
                None => {
                    warn!("Unparseable synthesis response, using heuristic fallback");
                    fallback(page, enrichment)
                }
            },
            Err(e) => {
                warn!(error = %e, "Synthesis generation failed, using heuristic fallback");
                fallback(page, enrichment)
            }
        }
    }
}

fn build_prompt(page: &CrawledPage, enrichment: &EnrichmentResult) -> String {
    let text = truncate_to_char_boundary(&page.text_content, MAX_PROMPT_TEXT_BYTES);
    let social = page
        .social_links
        .iter()
        .map(|l| format!("{}: {}", l.platform, l.url))
        .collect::<Vec<_>>()
        .join("\n");
    let videos = page.video_urls.join("\n");
    let research = if enrichment.success {
        truncate_to_char_boundary(&enrichment.summary, MAX_PROMPT_SUMMARY_BYTES)
    } else {
        "No external research available."
    };

    format!(
        "You are building a profile of a creative professional from their website.\n\
         \n\
         Page title: {title}\n\
         Page description: {description}\n\
         \n\
         Page text:\n{text}\n\
         \n\
         Social links:\n{social}\n\
         \n\
         Video links found on the page:\n{videos}\n\
         \n\
         External research:\n{research}\n\
         \n\
         Respond with ONLY a JSON object, no markdown fences, with this shape:\n\
         {{\n\
           \"name\": string,\n\
           \"role\": string,\n\
           \"bio\": string (2-3 sentences),\n\
           \"yearsActive\": string,\n\
           \"confidence\": number between 0 and 1,\n\
           \"projects\": [{{\"title\", \"year\", \"role\", \"platform\", \
             \"collaborators\", \"hasVideo\", \"description\", \"sourceUrl\"}}],\n\
           \"media\": [{{\"url\", \"title\", \"description\", \"platform\", \"thumbnail\"}}],\n\
           \"platforms\": [string]\n\
         }}\n\
         Platforms must come from: imdb, tmdb, omdb, youtube, vimeo, linkedin, facebook, website.\n\
         Only include projects and media you have evidence for.",
        title = page.title.as_deref().unwrap_or("(none)"),
        description = page.description.as_deref().unwrap_or("(none)"),
    )
}

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

static UNESCAPED_INNER_QUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":\s*"([^"]*)"([^",}\]]+)"([^"]*)""#).expect("valid regex")
});

/// Parse a model response, repairing the malformations models actually
/// produce: markdown fences, prose around the object, trailing commas
/// and unescaped inner quotes.
fn parse_response(response: &str) -> Option<RawSynthesis> {
    let stripped = strip_code_blocks(response);
    if let Ok(raw) = serde_json::from_str(stripped) {
        return Some(raw);
    }

    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }
    let body = &stripped[start..=end];
    if let Ok(raw) = serde_json::from_str(body) {
        return Some(raw);
    }

    let repaired = TRAILING_COMMA.replace_all(body, "$1");
    let repaired =
        UNESCAPED_INNER_QUOTE.replace_all(&repaired, r#": "$1\"$2\"$3""#);
    serde_json::from_str(&repaired).ok()
}

fn year_to_string(year: &serde_json::Value) -> String {
    match year {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Convert the tolerant raw shape into the strict domain shape:
/// stable ids, parsed platforms, clamped confidence, empty-url media
/// dropped.
fn normalize(raw: RawSynthesis) -> SynthesisResult {
    let projects = raw
        .projects
        .into_iter()
        .enumerate()
        .map(|(i, p)| Project {
            id: format!("project-{i}"),
            title: p.title,
            year: year_to_string(&p.year),
            role: p.role,
            cover_image: p.cover_image.filter(|c| !c.is_empty()),
            platform: Platform::parse_or_website(&p.platform),
            collaborators: p.collaborators,
            has_video: p.has_video,
            description: p.description.filter(|d| !d.is_empty()),
            source_url: p.source_url.filter(|u| !u.is_empty()),
            cover_image_locked: false,
        })
        .collect();

    let media = raw
        .media
        .into_iter()
        .filter(|m| !m.url.is_empty())
        .enumerate()
        .map(|(i, m)| MediaItem {
            id: format!("media-{i}"),
            url: m.url,
            title: m.title,
            description: m.description.filter(|d| !d.is_empty()),
            platform: Platform::parse(&m.platform).unwrap_or(Platform::Youtube),
            thumbnail: m.thumbnail.filter(|t| !t.is_empty()),
        })
        .collect();

    let platforms = raw
        .platforms
        .iter()
        .map(|p| Platform::parse_or_website(p))
        .collect();

    SynthesisResult {
        name: raw.name,
        role: raw.role,
        bio: raw.bio,
        years_active: raw.years_active,
        confidence: raw.confidence.clamp(0.0, 1.0),
        projects,
        media,
        platforms,
    }
}

/// Subject name from the page title, or "Unknown" when the page gives
/// no hint.
fn subject_name(page: &CrawledPage) -> String {
    let hint = crate::enrichment::name_hint(page);
    if hint == "the site owner" {
        "Unknown".to_string()
    } else {
        hint
    }
}

/// Deterministic profile draft from crawl and enrichment signals alone.
/// Confidence is pinned low so consumers can tell a heuristic draft
/// from a generated one.
pub fn fallback(page: &CrawledPage, enrichment: &EnrichmentResult) -> SynthesisResult {
    let name = subject_name(page);

    let bio = page
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .or_else(|| {
            Some(
                truncate_to_char_boundary(&enrichment.summary, MAX_FALLBACK_BIO_BYTES)
                    .to_string(),
            )
            .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| format!("Creative professional at {}", page.url));

    let projects = enrichment
        .projects
        .iter()
        .enumerate()
        .map(|(i, p)| Project {
            id: format!("project-{i}"),
            title: p.title.clone(),
            year: p.year.clone(),
            role: p.role.clone(),
            cover_image: None,
            platform: Platform::parse_or_website(&p.platform),
            collaborators: enrichment
                .collaborators
                .iter()
                .take(MAX_FALLBACK_COLLABORATORS)
                .cloned()
                .collect(),
            has_video: false,
            description: None,
            source_url: None,
            cover_image_locked: false,
        })
        .collect();

    let mut platforms: Vec<Platform> =
        page.social_links.iter().map(|l| l.platform).collect();
    if !platforms.contains(&Platform::Website) {
        platforms.push(Platform::Website);
    }

    SynthesisResult {
        name,
        role: "Creative Professional".to_string(),
        bio,
        years_active: "Unknown".to_string(),
        confidence: FALLBACK_CONFIDENCE,
        projects,
        media: Vec::new(),
        platforms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showreel_common::SocialLink;

    #[test]
    fn parses_clean_json() {
        let raw = parse_response(r#"{"name": "Jane Doe", "confidence": 0.9}"#).unwrap();
        assert_eq!(raw.name, "Jane Doe");
        assert_eq!(raw.confidence, 0.9);
    }

    #[test]
    fn parses_fenced_json_with_prose() {
        let response = "Here is the profile:\n```json\n{\"name\": \"Jane Doe\"}\n```";
        let raw = parse_response(response).unwrap();
        assert_eq!(raw.name, "Jane Doe");
    }

    #[test]
    fn repairs_trailing_commas() {
        let response = r#"{"name": "Jane", "platforms": ["youtube",],}"#;
        let raw = parse_response(response).unwrap();
        assert_eq!(raw.name, "Jane");
        assert_eq!(raw.platforms, vec!["youtube".to_string()]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_response("not json at all").is_none());
    }

    #[test]
    fn normalize_accepts_numeric_years_and_drops_empty_media() {
        let raw: RawSynthesis = serde_json::from_str(
            r#"{
                "name": "Jane",
                "confidence": 1.7,
                "projects": [{"title": "Film", "year": 2019}],
                "media": [
                    {"url": "", "title": "ghost"},
                    {"url": "https://youtu.be/a", "title": "real", "platform": "youtube"}
                ]
            }"#,
        )
        .unwrap();
        let result = normalize(raw);
        assert_eq!(result.projects[0].year, "2019");
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.media.len(), 1);
        assert_eq!(result.media[0].id, "media-0");
        assert!(!result.projects[0].cover_image_locked);
    }

    #[test]
    fn fallback_pins_confidence_and_derives_platforms() {
        let mut page = CrawledPage::empty("https://janedoe.example");
        page.title = Some("Jane Doe - Filmmaker".to_string());
        page.social_links = vec![SocialLink {
            platform: Platform::Vimeo,
            url: "https://vimeo.com/janedoe".to_string(),
        }];

        let enrichment = EnrichmentResult {
            summary: "Known for shorts.".to_string(),
            projects: vec![showreel_common::EnrichedProject {
                title: "The Long Road Home".to_string(),
                year: "2019".to_string(),
                role: "Creator".to_string(),
                platform: "website".to_string(),
            }],
            collaborators: vec!["John Smith".to_string()],
            success: true,
        };

        let result = fallback(&page, &enrichment);
        assert_eq!(result.name, "Jane Doe");
        assert_eq!(result.confidence, 0.4);
        assert_eq!(result.role, "Creative Professional");
        assert_eq!(result.projects.len(), 1);
        assert_eq!(result.projects[0].collaborators, vec!["John Smith"]);
        assert_eq!(result.platforms, vec![Platform::Vimeo, Platform::Website]);
    }

    #[test]
    fn fallback_without_title_uses_unknown() {
        let page = CrawledPage::empty("https://example.com");
        let result = fallback(&page, &EnrichmentResult::empty());
        assert_eq!(result.name, "Unknown");
        assert_eq!(result.confidence, 0.4);
    }

    #[tokio::test]
    async fn nameless_response_is_backfilled_from_the_page() {
        let generator = Arc::new(crate::testing::MockGenerator::returning("{}"));
        let synthesizer = Synthesizer::new(Some(generator));

        let mut page = CrawledPage::empty("https://janedoe.example");
        page.title = Some("Jane Doe - Filmmaker".to_string());

        let result = synthesizer
            .synthesize(&page, &EnrichmentResult::empty())
            .await;
        assert_eq!(result.name, "Jane Doe");

        let result = synthesizer
            .synthesize(&CrawledPage::empty("https://example.com"), &EnrichmentResult::empty())
            .await;
        assert_eq!(result.name, "Unknown");
    }

    #[tokio::test]
    async fn missing_generator_falls_back() {
        let synthesizer = Synthesizer::new(None);
        let page = CrawledPage::empty("https://example.com");
        let result = synthesizer
            .synthesize(&page, &EnrichmentResult::empty())
            .await;
        assert_eq!(result.confidence, 0.4);
    }
}
