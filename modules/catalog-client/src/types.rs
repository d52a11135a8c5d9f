use serde::{Deserialize, Serialize};

/// Kind of external catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Movie,
    Series,
    Video,
}

/// One catalog record considered as a possible match for a project.
/// Transient — consumed immediately by the matcher, never persisted.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    pub title: String,
    /// Release date or first-air date as returned by the source.
    pub date: Option<String>,
    /// Full poster/artwork URL, when the source has one.
    pub artwork: Option<String>,
    /// Source-specific identifier (TMDB numeric id, IMDb tt id).
    pub source_id: String,
    pub kind: MatchKind,
    /// Canonical page for this record on the source site.
    pub canonical_url: String,
}
