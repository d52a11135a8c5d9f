//! Cross-source project matching: fuzzy title comparison against the
//! movie/TV catalogs, in source priority order, to back-fill project
//! cover art and canonical source URLs.

use std::sync::Arc;
use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;
use tracing::{debug, info, warn};

use catalog_client::CandidateMatch;
use showreel_common::Project;

use crate::traits::CatalogSource;

const MAX_YEAR_DELTA: i32 = 2;
const MIN_TITLE_LEN: usize = 2;

// Covers both bare annotations like "(short)" and combined ones like
// "(short film)".
static NOISE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((?:(?:short\s+)?(?:film|documentary|movie)|short|tv\s*series?)\)")
        .expect("valid regex")
});

static NON_TITLE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s'-]").expect("valid regex"));

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").expect("valid regex"));

/// Strip decoration a site adds around a title before searching:
/// pipes, asterisks and medium suffixes like "(short film)".
pub fn clean_title(title: &str) -> String {
    let title = title.replace(['|', '*'], " ");
    let title = NOISE_SUFFIX.replace_all(&title, " ");
    let title = NON_TITLE_CHARS.replace_all(&title, " ");
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_for_compare(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fuzzy title comparison: exact match, containment, or shared-token
/// overlap of at least `threshold` measured against the smaller token
/// set. Tokens of three characters or fewer are ignored for overlap.
pub fn titles_match(a: &str, b: &str, threshold: f32) -> bool {
    let a = normalize_for_compare(a);
    let b = normalize_for_compare(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }

    let tokens_a: std::collections::HashSet<&str> =
        a.split(' ').filter(|t| t.len() > 2).collect();
    let tokens_b: std::collections::HashSet<&str> =
        b.split(' ').filter(|t| t.len() > 2).collect();
    let smaller = tokens_a.len().min(tokens_b.len());
    if smaller == 0 {
        return false;
    }

    let shared = tokens_a.intersection(&tokens_b).count();
    shared as f32 / smaller as f32 >= threshold
}

/// First four-digit year found in free text ("2019", "2019-2021").
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR.find(text).and_then(|m| m.as_str().parse().ok())
}

fn years_compatible(project_year: &str, candidate_date: Option<&str>) -> bool {
    let Some(wanted) = extract_year(project_year) else {
        return true;
    };
    let Some(found) = candidate_date.and_then(extract_year) else {
        return true;
    };
    (wanted - found).abs() <= MAX_YEAR_DELTA
}

/// Queries catalog sources in priority order. The ladder advances past
/// sources that return nothing with artwork; the first source that does
/// offer an artwork-bearing candidate decides the project, accepted or
/// not. A rejected project is left untouched.
pub struct Matcher {
    sources: Vec<Arc<dyn CatalogSource>>,
}

impl Matcher {
    pub fn new(sources: Vec<Arc<dyn CatalogSource>>) -> Self {
        Self { sources }
    }

    /// Match all projects concurrently. Source errors are logged and
    /// treated as empty result sets.
    pub async fn enrich_projects(&self, projects: Vec<Project>) -> Vec<Project> {
        if self.sources.is_empty() {
            return projects;
        }
        join_all(projects.into_iter().map(|p| self.match_one(p))).await
    }

    async fn match_one(&self, mut project: Project) -> Project {
        if project.cover_image_locked || project.cover_image.is_some() {
            return project;
        }
        let title = clean_title(&project.title);
        if title.len() < MIN_TITLE_LEN {
            return project;
        }
        let year = extract_year(&project.year).map(|y| y.to_string());

        for source in &self.sources {
            let candidates = match source.search(&title, year.as_deref()).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(source = source.name(), %title, error = %e, "Catalog search failed");
                    continue;
                }
            };

            let Some(hit) = first_artwork_candidate(&candidates) else {
                debug!(source = source.name(), %title, "No artwork-bearing candidate");
                continue;
            };

            if accepts(&title, &project.year, hit, source.overlap_threshold()) {
                info!(
                    source = source.name(),
                    %title,
                    matched = %hit.title,
                    "Catalog match accepted"
                );
                project.cover_image = hit.artwork.clone();
                if project.source_url.is_none() {
                    project.source_url = Some(hit.canonical_url.clone());
                }
            } else {
                debug!(
                    source = source.name(),
                    %title,
                    offered = %hit.title,
                    "Catalog candidate rejected"
                );
            }
            // The first source offering artwork decides; a rejection is
            // not retried against later sources.
            return project;
        }

        project
    }
}

fn first_artwork_candidate(candidates: &[CandidateMatch]) -> Option<&CandidateMatch> {
    candidates.iter().find(|c| c.artwork.is_some())
}

/// Acceptance test for the candidate a source put forward: title match
/// at the source's threshold and year within tolerance.
fn accepts(title: &str, project_year: &str, candidate: &CandidateMatch, threshold: f32) -> bool {
    titles_match(title, &candidate.title, threshold)
        && years_compatible(project_year, candidate.date.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_client::MatchKind;

    fn candidate(title: &str, date: &str, artwork: Option<&str>) -> CandidateMatch {
        CandidateMatch {
            title: title.to_string(),
            date: Some(date.to_string()),
            artwork: artwork.map(str::to_string),
            source_id: "42".to_string(),
            kind: MatchKind::Movie,
            canonical_url: "https://www.themoviedb.org/movie/42".to_string(),
        }
    }

    #[test]
    fn clean_title_strips_decoration() {
        assert_eq!(clean_title("Echoes | Official Site"), "Echoes Official Site");
        assert_eq!(clean_title("Echoes (Short Film)"), "Echoes");
        assert_eq!(clean_title("**Echoes**"), "Echoes");
    }

    #[test]
    fn exact_and_containment_titles_match() {
        assert!(titles_match("The Dark Knight", "the dark knight", 0.6));
        assert!(titles_match("Dark Knight", "The Dark Knight", 0.6));
    }

    #[test]
    fn token_overlap_respects_threshold() {
        // 1 of 1 significant shared token in the smaller set.
        assert!(titles_match("Echoes Rising", "Echoes Falling", 0.5));
        // "Echoes" vs "Silent Echoes of Tomorrow": 1 shared of 1 in the
        // smaller set would pass, but containment on the normalized
        // strings already accepts it, so test genuinely low overlap.
        assert!(!titles_match(
            "Echoes Rising Storm",
            "Silent Waves of Tomorrow",
            0.5
        ));
    }

    #[test]
    fn year_gate_rejects_distant_candidates() {
        let close = candidate("The Dark Knight", "2008-07-18", Some("poster.jpg"));
        let far = candidate("The Dark Knight Rises", "2012-07-20", Some("poster.jpg"));

        assert!(accepts("The Dark Knight", "2008", &close, 0.6));
        assert!(!accepts("The Dark Knight", "2008", &far, 0.6));
    }

    #[test]
    fn missing_years_do_not_block_a_match() {
        let c = candidate("Echoes", "", Some("poster.jpg"));
        assert!(accepts("Echoes", "Unknown", &c, 0.6));
    }

    #[test]
    fn artworkless_candidates_are_skipped() {
        let candidates = vec![
            candidate("Echoes", "2019", None),
            candidate("Echoes", "2019", Some("poster.jpg")),
        ];
        let hit = first_artwork_candidate(&candidates).unwrap();
        assert!(hit.artwork.is_some());

        let bare = vec![candidate("Echoes", "2019", None)];
        assert!(first_artwork_candidate(&bare).is_none());
    }

    #[tokio::test]
    async fn locked_covers_are_never_touched() {
        use crate::testing::MockCatalog;

        let source = Arc::new(MockCatalog::with_candidates(vec![candidate(
            "Echoes",
            "2019",
            Some("poster.jpg"),
        )]));
        let matcher = Matcher::new(vec![source.clone()]);

        let project = Project {
            id: "project-0".to_string(),
            title: "Echoes".to_string(),
            year: "2019".to_string(),
            role: "Director".to_string(),
            cover_image: Some("chosen-by-hand.jpg".to_string()),
            platform: showreel_common::Platform::Website,
            collaborators: Vec::new(),
            has_video: false,
            description: None,
            source_url: None,
            cover_image_locked: true,
        };

        let out = matcher.enrich_projects(vec![project]).await;
        assert_eq!(out[0].cover_image.as_deref(), Some("chosen-by-hand.jpg"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn first_source_with_artwork_wins() {
        use crate::testing::MockCatalog;

        let empty = Arc::new(MockCatalog::with_candidates(Vec::new()));
        let stocked = Arc::new(MockCatalog::with_candidates(vec![candidate(
            "Echoes",
            "2019",
            Some("poster.jpg"),
        )]));
        let matcher = Matcher::new(vec![empty.clone(), stocked.clone()]);

        let project = Project {
            id: "project-0".to_string(),
            title: "Echoes".to_string(),
            year: "2019".to_string(),
            role: "Director".to_string(),
            cover_image: None,
            platform: showreel_common::Platform::Website,
            collaborators: Vec::new(),
            has_video: false,
            description: None,
            source_url: None,
            cover_image_locked: false,
        };

        let out = matcher.enrich_projects(vec![project]).await;
        assert_eq!(out[0].cover_image.as_deref(), Some("poster.jpg"));
        assert_eq!(
            out[0].source_url.as_deref(),
            Some("https://www.themoviedb.org/movie/42")
        );
        assert_eq!(empty.calls(), 1);
        assert_eq!(stocked.calls(), 1);
    }

    #[tokio::test]
    async fn rejection_at_the_first_artwork_source_is_final() {
        use crate::testing::MockCatalog;

        // The first source offers artwork but fails the year gate; the
        // second would match perfectly yet must never be consulted.
        let wrong = Arc::new(MockCatalog::with_candidates(vec![candidate(
            "The Dark Knight Rises",
            "2012-07-20",
            Some("rises.jpg"),
        )]));
        let right = Arc::new(MockCatalog::with_candidates(vec![candidate(
            "The Dark Knight",
            "2008-07-18",
            Some("poster.jpg"),
        )]));
        let matcher = Matcher::new(vec![wrong.clone(), right.clone()]);

        let project = Project {
            id: "project-0".to_string(),
            title: "The Dark Knight".to_string(),
            year: "2008".to_string(),
            role: "Director".to_string(),
            cover_image: None,
            platform: showreel_common::Platform::Website,
            collaborators: Vec::new(),
            has_video: false,
            description: None,
            source_url: None,
            cover_image_locked: false,
        };

        let out = matcher.enrich_projects(vec![project]).await;
        assert!(out[0].cover_image.is_none());
        assert!(out[0].source_url.is_none());
        assert_eq!(wrong.calls(), 1);
        assert_eq!(right.calls(), 0);
    }
}
