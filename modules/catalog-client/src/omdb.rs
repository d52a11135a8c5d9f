use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::types::{CandidateMatch, MatchKind};
use crate::CatalogError;

const OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// OMDB title lookup returns a single best record, not a result page.
#[derive(Debug, Deserialize)]
struct TitleResponse {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Response")]
    response: String,
}

pub struct OmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.to_string(),
            base_url: OMDB_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Title search. Returns zero or one candidate; a poster of "N/A"
    /// counts as no artwork.
    pub async fn search_movie(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        let mut query: Vec<(&str, &str)> = vec![
            ("apikey", self.api_key.as_str()),
            ("t", title),
            ("type", "movie"),
        ];
        if let Some(y) = year {
            query.push(("y", y));
        }

        let resp = self
            .client
            .get(&self.base_url)
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

        let data: TitleResponse = resp.json().await?;
        if data.response != "True" {
            debug!(title, "OMDB returned no match");
            return Ok(Vec::new());
        }

        let imdb_id = data.imdb_id.unwrap_or_default();
        Ok(vec![CandidateMatch {
            title: data.title.unwrap_or_default(),
            date: data.year.filter(|y| !y.is_empty()),
            artwork: data.poster.filter(|p| p != "N/A"),
            canonical_url: format!("https://www.imdb.com/title/{imdb_id}/"),
            source_id: imdb_id,
            kind: MatchKind::Movie,
        }])
    }
}
