// Trait abstractions for pipeline collaborators.
//
// Every external service sits behind one of these seams so the whole
// pipeline runs deterministically in tests with mocks: no network, no
// credentials, no browser.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use catalog_client::{CandidateMatch, OmdbClient, TmdbClient};
use showreel_common::Platform;
use video_client::{ChannelVideo, VideoSearchHit, VimeoClient, YouTubeClient};

// ---------------------------------------------------------------------------
// Fetch-HTML
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch raw HTML for a URL with a bounded timeout and redirect count.
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HeadlessRender — optional JS-rendered fallback
// ---------------------------------------------------------------------------

#[async_trait]
pub trait DomRenderer: Send + Sync {
    /// Fetch the fully script-rendered DOM for a URL.
    async fn rendered_html(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl DomRenderer for browserless_client::BrowserlessClient {
    async fn rendered_html(&self, url: &str) -> Result<String> {
        Ok(self.rendered_content(url).await?)
    }
}

// ---------------------------------------------------------------------------
// KnowledgeSearch
// ---------------------------------------------------------------------------

#[async_trait]
pub trait KnowledgeSearcher: Send + Sync {
    /// Run one web-knowledge query and return the free-text answer.
    async fn search(&self, system: &str, query: &str) -> Result<String>;
}

#[async_trait]
impl KnowledgeSearcher for ai_client::Perplexity {
    async fn search(&self, system: &str, query: &str) -> Result<String> {
        self.search(system, query).await
    }
}

// ---------------------------------------------------------------------------
// GenerateText
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextGenerator for ai_client::Gemini {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }
}

// ---------------------------------------------------------------------------
// CatalogSearch — one trait object per source, queried in priority order
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// Minimum shared-token overlap ratio for a fuzzy title match
    /// against this source.
    fn overlap_threshold(&self) -> f32;

    async fn search(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>>;
}

/// TMDB feature-film search.
pub struct TmdbMovieSource(pub Arc<TmdbClient>);

/// TMDB series search.
pub struct TmdbTvSource(pub Arc<TmdbClient>);

/// TMDB combined movie+TV search.
pub struct TmdbMultiSource(pub Arc<TmdbClient>);

/// OMDB title lookup.
pub struct OmdbSource(pub Arc<OmdbClient>);

#[async_trait]
impl CatalogSource for TmdbMovieSource {
    fn name(&self) -> &str {
        "tmdb-movie"
    }

    fn overlap_threshold(&self) -> f32 {
        0.6
    }

    async fn search(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        Ok(self.0.search_movie(title, year).await?)
    }
}

#[async_trait]
impl CatalogSource for TmdbTvSource {
    fn name(&self) -> &str {
        "tmdb-tv"
    }

    fn overlap_threshold(&self) -> f32 {
        0.6
    }

    async fn search(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        Ok(self.0.search_tv(title, year).await?)
    }
}

#[async_trait]
impl CatalogSource for TmdbMultiSource {
    fn name(&self) -> &str {
        "tmdb-multi"
    }

    fn overlap_threshold(&self) -> f32 {
        0.6
    }

    async fn search(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        Ok(self.0.search_multi(title, year).await?)
    }
}

#[async_trait]
impl CatalogSource for OmdbSource {
    fn name(&self) -> &str {
        "omdb"
    }

    fn overlap_threshold(&self) -> f32 {
        0.5
    }

    async fn search(&self, title: &str, year: Option<&str>) -> Result<Vec<CandidateMatch>> {
        Ok(self.0.search_movie(title, year).await?)
    }
}

// ---------------------------------------------------------------------------
// ChannelVideos
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ChannelVideoSource: Send + Sync {
    /// Which platform's social links this source serves.
    fn platform(&self) -> Platform;

    /// Recent uploads for a channel/profile URL, newest first.
    async fn channel_videos(&self, channel_url: &str) -> Result<Vec<ChannelVideo>>;

    /// Search the platform for a project's own video.
    async fn search_project_video(
        &self,
        title: &str,
        is_short_film: bool,
    ) -> Result<Option<VideoSearchHit>>;
}

#[async_trait]
impl ChannelVideoSource for YouTubeClient {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    async fn channel_videos(&self, channel_url: &str) -> Result<Vec<ChannelVideo>> {
        Ok(self.channel_videos(channel_url).await?)
    }

    async fn search_project_video(
        &self,
        title: &str,
        is_short_film: bool,
    ) -> Result<Option<VideoSearchHit>> {
        Ok(self.search_project_video(title, is_short_film).await?)
    }
}

// ---------------------------------------------------------------------------
// VideoThumbnailLookup
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ThumbnailLookup: Send + Sync {
    /// One metadata lookup for a platform without predictable thumbnail
    /// URLs. Returns None when the video has no usable thumbnail.
    async fn thumbnail(&self, video_url: &str) -> Result<Option<String>>;
}

#[async_trait]
impl ThumbnailLookup for VimeoClient {
    async fn thumbnail(&self, video_url: &str) -> Result<Option<String>> {
        Ok(self.thumbnail(video_url).await?)
    }
}

// ---------------------------------------------------------------------------
// Person headshot lookup (profile image backfill)
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PersonImageLookup: Send + Sync {
    async fn headshot(&self, name: &str) -> Result<Option<String>>;
}

#[async_trait]
impl PersonImageLookup for TmdbClient {
    async fn headshot(&self, name: &str) -> Result<Option<String>> {
        Ok(self.search_person(name).await?)
    }
}
