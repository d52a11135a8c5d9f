//! Web-knowledge enrichment: one search query about the subject, then
//! heuristic extraction of project mentions and collaborator names from
//! the free-text answer.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use ai_client::util::truncate_to_char_boundary;
use showreel_common::{CrawledPage, EnrichedProject, EnrichmentResult};

use crate::traits::KnowledgeSearcher;

const SEARCH_SYSTEM_PROMPT: &str = "You are a research assistant specializing in film, \
    television and online video. Answer factually and concisely. When listing projects, \
    include the year in parentheses.";

const MAX_CONTEXT_BYTES: usize = 1000;
const MAX_PROJECTS: usize = 10;
const MAX_COLLABORATORS: usize = 10;

/// Optional search step. Without a searcher (no credentials) every call
/// returns the empty result and the pipeline carries on.
pub struct Enricher {
    searcher: Option<Arc<dyn KnowledgeSearcher>>,
}

impl Enricher {
    pub fn new(searcher: Option<Arc<dyn KnowledgeSearcher>>) -> Self {
        Self { searcher }
    }

    pub async fn enrich(&self, page: &CrawledPage) -> EnrichmentResult {
        let Some(searcher) = &self.searcher else {
            info!("No knowledge searcher configured, skipping enrichment");
            return EnrichmentResult::empty();
        };

        let name = name_hint(page);
        let context = truncate_to_char_boundary(&page.text_content, MAX_CONTEXT_BYTES);
        let query = format!(
            "Find factual information about the creative professional \"{name}\" \
             whose website says: \"{context}\". List their film, TV or video projects \
             with years, their primary role, and frequent collaborators."
        );

        match searcher.search(SEARCH_SYSTEM_PROMPT, &query).await {
            Ok(answer) => {
                let projects = extract_projects(&answer);
                let collaborators = extract_collaborators(&answer);
                info!(
                    %name,
                    projects = projects.len(),
                    collaborators = collaborators.len(),
                    "Enrichment search complete"
                );
                EnrichmentResult {
                    summary: answer,
                    projects,
                    collaborators,
                    success: true,
                }
            }
            Err(e) => {
                warn!(%name, error = %e, "Enrichment search failed");
                EnrichmentResult::empty()
            }
        }
    }
}

/// Best-effort subject name from the page title. Site titles commonly
/// read "Name - Tagline" or "Name | Studio"; the segment before the
/// first separator is the name.
pub fn name_hint(page: &CrawledPage) -> String {
    let title = page.title.as_deref().unwrap_or_default();
    let name = title
        .split(['-', '\u{2013}', '|'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() {
        "the site owner".to_string()
    } else {
        name.to_string()
    }
}

static YEAR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\(((?:19|20)\d{2})\)").expect("valid regex")
});

static LINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[-*\u{2022}\d.\s]+|["\u{201c}\u{201d}]"#).expect("valid regex"));

/// Pull "Title (Year)" mentions out of free text, one per line, capped.
pub fn extract_projects(text: &str) -> Vec<EnrichedProject> {
    let mut projects = Vec::new();

    for line in text.lines() {
        let line = LINE_PREFIX.replace_all(line.trim(), "").trim().to_string();
        if line.len() < 10 || line.len() > 200 {
            continue;
        }
        let Some(caps) = YEAR_LINE.captures(&line) else {
            continue;
        };
        let title = caps[1].trim_end_matches(['"', '\u{201d}']).trim().to_string();
        if title.len() <= 3 {
            continue;
        }
        projects.push(EnrichedProject {
            title,
            year: caps[2].to_string(),
            role: "Creator".to_string(),
            platform: "website".to_string(),
        });
        if projects.len() >= MAX_PROJECTS {
            break;
        }
    }

    projects
}

static COLLABORATOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:[Ww]orked with|[Cc]ollaborated with|[Aa]longside|[Tt]ogether with)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
        r"(?:[Cc]ollaborators?\s+(?:include|including|such as))\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
        r"(?:[Ff]eaturing|[Ss]tarring)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
        r"(?:[Pp]roduced by|[Dd]irected by|[Ww]ritten by)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Personal names mentioned as collaborators, deduplicated in order of
/// first mention, capped.
pub fn extract_collaborators(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut names = Vec::new();

    for pattern in COLLABORATOR_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let name = caps[1].trim().to_string();
            if name.len() < 4 || name.len() > 49 {
                continue;
            }
            if seen.insert(name.to_lowercase()) {
                names.push(name);
            }
            if names.len() >= MAX_COLLABORATORS {
                return names;
            }
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hint_takes_segment_before_separator() {
        let mut page = CrawledPage::empty("https://example.com");
        page.title = Some("Jane Doe - Director & Editor".to_string());
        assert_eq!(name_hint(&page), "Jane Doe");

        page.title = Some("Jane Doe | Studio".to_string());
        assert_eq!(name_hint(&page), "Jane Doe");

        page.title = None;
        assert_eq!(name_hint(&page), "the site owner");
    }

    #[test]
    fn extracts_projects_with_years() {
        let text = "\
            Her notable works include:\n\
            - The Long Road Home (2019), a feature documentary\n\
            - \"Midnight in the Garden\" (2021)\n\
            - Up (2009)\n\
            She lives in Berlin.";
        let projects = extract_projects(text);
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].title, "The Long Road Home");
        assert_eq!(projects[0].year, "2019");
        assert_eq!(projects[1].title, "Midnight in the Garden");
        assert_eq!(projects[1].year, "2021");
    }

    #[test]
    fn short_and_overlong_titles_are_dropped() {
        let long_title = "x".repeat(201);
        let text = format!("Up (2009)\n{long_title} (2010)\nA Proper Title Here (2011)");
        let projects = extract_projects(&text);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "A Proper Title Here");
    }

    #[test]
    fn extracts_and_dedupes_collaborators() {
        let text = "She has worked with John Smith on several shorts. \
            Collaborators include Maria Garcia Lopez. \
            The film was produced by John Smith.";
        let names = extract_collaborators(text);
        assert_eq!(names, vec!["John Smith", "Maria Garcia Lopez"]);
    }

    #[tokio::test]
    async fn missing_searcher_yields_empty_result() {
        let enricher = Enricher::new(None);
        let page = CrawledPage::empty("https://example.com");
        let result = enricher.enrich(&page).await;
        assert!(!result.success);
        assert!(result.projects.is_empty());
    }
}
