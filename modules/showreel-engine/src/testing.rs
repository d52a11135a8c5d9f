//! Deterministic mock collaborators for unit and integration tests.
//! Each mock counts its calls so tests can assert on external-call
//! behavior (cache hits, skipped stages).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use catalog_client::CandidateMatch;
use showreel_common::{CrawlSummary, Platform, Profile, Project};
use video_client::{ChannelVideo, VideoSearchHit};

use crate::traits::{
    CatalogSource, ChannelVideoSource, DomRenderer, KnowledgeSearcher, PageFetcher,
    PersonImageLookup, TextGenerator, ThumbnailLookup,
};

// --- Page fetching ---

/// Serves canned HTML per URL; unknown URLs fail like a dead host.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no page registered for {url}"))
    }
}

pub struct FailingFetcher {
    calls: AtomicUsize,
}

impl FailingFetcher {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FailingFetcher {
    async fn fetch_html(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("connection refused")
    }
}

// --- Rendered DOM ---

pub struct MockRenderer {
    html: String,
    calls: AtomicUsize,
}

impl MockRenderer {
    pub fn returning(html: &str) -> Self {
        Self {
            html: html.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomRenderer for MockRenderer {
    async fn rendered_html(&self, _url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}

// --- Knowledge search ---

pub struct MockSearcher {
    answer: String,
    calls: AtomicUsize,
}

impl MockSearcher {
    pub fn returning(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeSearcher for MockSearcher {
    async fn search(&self, _system: &str, _query: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

// --- Text generation ---

pub struct MockGenerator {
    response: Option<String>,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn returning(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .ok_or_else(|| anyhow::anyhow!("generation unavailable"))
    }
}

// --- Catalog search ---

pub struct MockCatalog {
    candidates: Vec<CandidateMatch>,
    threshold: f32,
    calls: AtomicUsize,
}

impl MockCatalog {
    pub fn with_candidates(candidates: Vec<CandidateMatch>) -> Self {
        Self {
            candidates,
            threshold: 0.6,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    fn name(&self) -> &str {
        "mock-catalog"
    }

    fn overlap_threshold(&self) -> f32 {
        self.threshold
    }

    async fn search(&self, _title: &str, _year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

// --- Channel videos ---

pub struct MockChannelSource {
    platform: Platform,
    videos: Vec<ChannelVideo>,
    search_hit: Option<VideoSearchHit>,
    fail: bool,
    calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl MockChannelSource {
    pub fn with_videos(platform: Platform, videos: Vec<ChannelVideo>) -> Self {
        Self {
            platform,
            videos,
            search_hit: None,
            fail: false,
            calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(platform: Platform) -> Self {
        Self {
            platform,
            videos: Vec::new(),
            search_hit: None,
            fail: true,
            calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_search_hit(mut self, hit: VideoSearchHit) -> Self {
        self.search_hit = Some(hit);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelVideoSource for MockChannelSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn channel_videos(&self, _channel_url: &str) -> Result<Vec<ChannelVideo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("channel listing unavailable")
        }
        Ok(self.videos.clone())
    }

    async fn search_project_video(
        &self,
        _title: &str,
        _is_short_film: bool,
    ) -> Result<Option<VideoSearchHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.search_hit.clone())
    }
}

// --- Thumbnail lookup ---

pub struct MockThumbnailer {
    thumbnail: Option<String>,
    calls: AtomicUsize,
}

impl MockThumbnailer {
    pub fn returning(thumbnail: Option<String>) -> Self {
        Self {
            thumbnail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThumbnailLookup for MockThumbnailer {
    async fn thumbnail(&self, _video_url: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.thumbnail.clone())
    }
}

// --- Person headshots ---

pub struct MockPersonLookup {
    headshot: Option<String>,
    calls: AtomicUsize,
}

impl MockPersonLookup {
    pub fn returning(headshot: Option<String>) -> Self {
        Self {
            headshot,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonImageLookup for MockPersonLookup {
    async fn headshot(&self, _name: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.headshot.clone())
    }
}

// --- Fixtures ---

pub fn sample_project(id: &str, title: &str) -> Project {
    Project {
        id: id.to_string(),
        title: title.to_string(),
        year: "2020".to_string(),
        role: "Director".to_string(),
        cover_image: None,
        platform: Platform::Website,
        collaborators: Vec::new(),
        has_video: false,
        description: None,
        source_url: None,
        cover_image_locked: false,
    }
}

pub fn sample_profile(id: &str, url_hash: &str) -> Profile {
    Profile {
        id: id.to_string(),
        url_hash: url_hash.to_string(),
        source_url: "https://example.com/".to_string(),
        name: "Jane Doe".to_string(),
        role: "Director".to_string(),
        bio: "Makes films.".to_string(),
        image_url: None,
        project_count: 1,
        years_active: "2015-present".to_string(),
        platforms: vec![Platform::Website],
        social_links: Vec::new(),
        confidence: 0.9,
        projects: vec![sample_project("project-0", "Echoes")],
        media: Vec::new(),
        crawl_summary: CrawlSummary {
            title: Some("Jane Doe".to_string()),
            description: None,
            image_count: 0,
        },
        created_at: Utc::now(),
    }
}

/// EngineDeps with every optional collaborator absent.
pub fn bare_deps(fetcher: Arc<dyn PageFetcher>) -> crate::pipeline::EngineDeps {
    crate::pipeline::EngineDeps {
        fetcher,
        renderer: None,
        searcher: None,
        generator: None,
        catalog_sources: Vec::new(),
        channel_sources: Vec::new(),
        thumbnailer: None,
        person_lookup: None,
    }
}
