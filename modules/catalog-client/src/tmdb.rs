use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{CandidateMatch, MatchKind};
use crate::CatalogError;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Build a full poster URL from a TMDB poster path.
pub fn build_poster_url(poster_path: &str, size: &str) -> String {
    format!("{TMDB_IMAGE_BASE}/{size}{poster_path}")
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    poster_path: Option<String>,
    media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PersonSearchResponse {
    #[serde(default)]
    results: Vec<PersonResult>,
}

#[derive(Debug, Deserialize)]
struct PersonResult {
    name: String,
    profile_path: Option<String>,
    #[serde(default)]
    popularity: f64,
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.to_string(),
            base_url: TMDB_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn search(&self, path: &str, params: &[(&str, &str)]) -> Result<SearchResponse> {
        let mut query: Vec<(&str, &str)> = vec![
            ("api_key", self.api_key.as_str()),
            ("include_adult", "false"),
        ];
        query.extend_from_slice(params);

        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(&query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Search feature films. `year` filters on release year.
    pub async fn search_movie(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        let mut params = vec![("query", title)];
        if let Some(y) = year {
            params.push(("year", y));
        }
        let data = self.search("/search/movie", &params).await?;
        debug!(title, count = data.results.len(), "TMDB movie search");
        Ok(data
            .results
            .into_iter()
            .map(|r| to_candidate(r, MatchKind::Movie))
            .collect())
    }

    /// Search TV series. `year` filters on first-air year.
    pub async fn search_tv(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        let mut params = vec![("query", title)];
        if let Some(y) = year {
            params.push(("first_air_date_year", y));
        }
        let data = self.search("/search/tv", &params).await?;
        debug!(title, count = data.results.len(), "TMDB TV search");
        Ok(data
            .results
            .into_iter()
            .map(|r| to_candidate(r, MatchKind::Series))
            .collect())
    }

    /// Combined movie+TV search. Results of other media types (people,
    /// collections) are dropped.
    pub async fn search_multi(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        let mut params = vec![("query", title)];
        if let Some(y) = year {
            params.push(("year", y));
        }
        let data = self.search("/search/multi", &params).await?;
        debug!(title, count = data.results.len(), "TMDB multi search");
        Ok(data
            .results
            .into_iter()
            .filter_map(|r| match r.media_type.as_deref() {
                Some("movie") => Some(to_candidate(r, MatchKind::Movie)),
                Some("tv") => Some(to_candidate(r, MatchKind::Series)),
                _ => None,
            })
            .collect())
    }

    /// Look up a person's headshot. Prefers the most popular result
    /// that has a profile photo.
    pub async fn search_person(&self, name: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(format!("{}/search/person", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", name),
                ("include_adult", "false"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: PersonSearchResponse = resp.json().await?;
        let mut with_photo: Vec<PersonResult> = data
            .results
            .into_iter()
            .filter(|r| r.profile_path.is_some())
            .collect();
        with_photo.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(with_photo.into_iter().next().map(|r| {
            info!(name, matched = %r.name, popularity = r.popularity, "TMDB person found");
            build_poster_url(r.profile_path.as_deref().unwrap_or_default(), "w500")
        }))
    }
}

fn to_candidate(result: SearchResult, kind: MatchKind) -> CandidateMatch {
    let canonical_url = match kind {
        MatchKind::Series => format!("https://www.themoviedb.org/tv/{}", result.id),
        _ => format!("https://www.themoviedb.org/movie/{}", result.id),
    };
    CandidateMatch {
        title: result.title.or(result.name).unwrap_or_default(),
        date: result.release_date.or(result.first_air_date).filter(|d| !d.is_empty()),
        artwork: result
            .poster_path
            .as_deref()
            .map(|p| build_poster_url(p, "w500")),
        source_id: result.id.to_string(),
        kind,
        canonical_url,
    }
}
