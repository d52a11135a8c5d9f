//! The profile pipeline: canonicalize, check the cache, crawl, enrich,
//! synthesize, match against catalogs, reconcile media, assemble and
//! store. Each external stage degrades independently; only an invalid
//! URL or an assembly with no usable name fails the run.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use showreel_common::{
    canonicalize, CanonicalUrl, Config, CrawlSummary, Platform, Profile, ShowreelError,
    SocialLink,
};

use crate::crawler::{Crawler, HttpFetcher};
use crate::enrichment::Enricher;
use crate::matcher::Matcher;
use crate::media::Reconciler;
use crate::store::ProfileStore;
use crate::synthesizer::Synthesizer;
use crate::traits::{
    CatalogSource, ChannelVideoSource, DomRenderer, KnowledgeSearcher, OmdbSource, PageFetcher,
    PersonImageLookup, TextGenerator, ThumbnailLookup, TmdbMovieSource, TmdbMultiSource,
    TmdbTvSource,
};

/// Collaborator set for one engine instance. Everything except the page
/// fetcher is optional; a missing collaborator disables its stage.
pub struct EngineDeps {
    pub fetcher: Arc<dyn PageFetcher>,
    pub renderer: Option<Arc<dyn DomRenderer>>,
    pub searcher: Option<Arc<dyn KnowledgeSearcher>>,
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub catalog_sources: Vec<Arc<dyn CatalogSource>>,
    pub channel_sources: Vec<Arc<dyn ChannelVideoSource>>,
    pub thumbnailer: Option<Arc<dyn ThumbnailLookup>>,
    pub person_lookup: Option<Arc<dyn PersonImageLookup>>,
}

impl EngineDeps {
    /// Wire concrete clients from configuration. Unset credentials
    /// leave the corresponding collaborator out.
    pub fn from_config(config: &Config) -> Self {
        let renderer: Option<Arc<dyn DomRenderer>> = config.browserless_url.as_ref().map(|url| {
            Arc::new(browserless_client::BrowserlessClient::new(
                url,
                config.browserless_token.as_deref(),
            )) as Arc<dyn DomRenderer>
        });

        let searcher: Option<Arc<dyn KnowledgeSearcher>> = config
            .perplexity_api_key
            .as_ref()
            .map(|key| Arc::new(ai_client::Perplexity::new(key)) as Arc<dyn KnowledgeSearcher>);

        let generator: Option<Arc<dyn TextGenerator>> = config
            .gemini_api_key
            .as_ref()
            .map(|key| Arc::new(ai_client::Gemini::new(key)) as Arc<dyn TextGenerator>);

        let tmdb = config
            .tmdb_api_key
            .as_ref()
            .map(|key| Arc::new(catalog_client::TmdbClient::new(key)));

        let mut catalog_sources: Vec<Arc<dyn CatalogSource>> = Vec::new();
        if let Some(tmdb) = &tmdb {
            catalog_sources.push(Arc::new(TmdbMovieSource(tmdb.clone())));
            catalog_sources.push(Arc::new(TmdbTvSource(tmdb.clone())));
            catalog_sources.push(Arc::new(TmdbMultiSource(tmdb.clone())));
        }
        if let Some(key) = &config.omdb_api_key {
            catalog_sources.push(Arc::new(OmdbSource(Arc::new(
                catalog_client::OmdbClient::new(key),
            ))));
        }

        let channel_sources: Vec<Arc<dyn ChannelVideoSource>> = config
            .youtube_api_key
            .iter()
            .map(|key| {
                Arc::new(video_client::YouTubeClient::new(key)) as Arc<dyn ChannelVideoSource>
            })
            .collect();

        let person_lookup =
            tmdb.map(|client| client as Arc<dyn PersonImageLookup>);

        Self {
            fetcher: Arc::new(HttpFetcher::new()),
            renderer,
            searcher,
            generator,
            catalog_sources,
            channel_sources,
            thumbnailer: Some(Arc::new(video_client::VimeoClient::new())),
            person_lookup,
        }
    }
}

pub struct ProfileEngine {
    crawler: Crawler,
    enricher: Enricher,
    synthesizer: Synthesizer,
    matcher: Matcher,
    reconciler: Reconciler,
    person_lookup: Option<Arc<dyn PersonImageLookup>>,
    store: Arc<dyn ProfileStore>,
}

impl ProfileEngine {
    pub fn new(deps: EngineDeps, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            crawler: Crawler::new(deps.fetcher, deps.renderer),
            enricher: Enricher::new(deps.searcher),
            synthesizer: Synthesizer::new(deps.generator),
            matcher: Matcher::new(deps.catalog_sources),
            reconciler: Reconciler::new(deps.channel_sources, deps.thumbnailer),
            person_lookup: deps.person_lookup,
            store,
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn ProfileStore>) -> Self {
        Self::new(EngineDeps::from_config(config), store)
    }

    /// Generate a profile for a URL, or return the cached one. At most
    /// one profile exists per canonical URL.
    pub async fn generate(&self, raw_url: &str) -> Result<Profile, ShowreelError> {
        let canonical = canonicalize(raw_url)?;

        if let Some(cached) = self.store.get_by_url_hash(&canonical.fingerprint).await? {
            info!(url = %canonical.href, profile_id = %cached.id, "Cache hit");
            return Ok(cached);
        }

        info!(url = %canonical.href, "Generating profile");
        let page = self.crawler.crawl(&canonical.href).await;
        let enrichment = self.enricher.enrich(&page).await;
        let synthesis = self.synthesizer.synthesize(&page, &enrichment).await;

        let (projects, channel_videos) = tokio::join!(
            self.matcher.enrich_projects(synthesis.projects.clone()),
            self.reconciler.fetch_channel_videos(&page.social_links),
        );
        let projects = self
            .reconciler
            .fill_project_covers(projects, &channel_videos)
            .await;
        let media = self
            .reconciler
            .merge_media(synthesis.media.clone(), &channel_videos);

        let image_url = match page.images.first() {
            Some(first) => Some(first.clone()),
            None => self.person_headshot(&synthesis.name).await,
        };

        let profile = assemble(&canonical, &page, &synthesis, projects, media, image_url)?;
        self.store.put(profile.clone()).await?;
        info!(
            profile_id = %profile.id,
            projects = profile.project_count,
            media = profile.media.len(),
            confidence = profile.confidence,
            "Profile stored"
        );
        Ok(profile)
    }

    async fn person_headshot(&self, name: &str) -> Option<String> {
        if name.is_empty() || name == "Unknown" {
            return None;
        }
        let lookup = self.person_lookup.as_ref()?;
        lookup.headshot(name).await.ok().flatten()
    }
}

/// Pure assembly of the final record. Fails only when no usable name
/// survived synthesis.
fn assemble(
    canonical: &CanonicalUrl,
    page: &showreel_common::CrawledPage,
    synthesis: &showreel_common::SynthesisResult,
    projects: Vec<showreel_common::Project>,
    media: Vec<showreel_common::MediaItem>,
    image_url: Option<String>,
) -> Result<Profile, ShowreelError> {
    let name = synthesis.name.trim();
    if name.is_empty() {
        return Err(ShowreelError::Assembly(
            "synthesis produced no subject name".to_string(),
        ));
    }

    // Platforms reflect what the page actually links to; the synthesis
    // list is only a fallback when the crawl saw no social links.
    let (platforms, social_links) = if page.social_links.is_empty() {
        let platforms = dedupe_platforms(&synthesis.platforms);
        let social_links = platforms
            .iter()
            .filter(|p| **p != Platform::Website)
            .map(|p| SocialLink {
                platform: *p,
                url: canonical.href.clone(),
            })
            .collect();
        (platforms, social_links)
    } else {
        let mut platforms: Vec<Platform> =
            page.social_links.iter().map(|l| l.platform).collect();
        platforms = dedupe_platforms(&platforms);
        (platforms, page.social_links.clone())
    };
    let platforms = if platforms.is_empty() {
        vec![Platform::Website]
    } else {
        platforms
    };

    Ok(Profile {
        id: Uuid::new_v4().to_string(),
        url_hash: canonical.fingerprint.clone(),
        source_url: canonical.href.clone(),
        name: name.to_string(),
        role: synthesis.role.clone(),
        bio: synthesis.bio.clone(),
        image_url,
        project_count: projects.len(),
        years_active: synthesis.years_active.clone(),
        platforms,
        social_links,
        confidence: synthesis.confidence,
        projects,
        media,
        crawl_summary: CrawlSummary {
            title: page.title.clone(),
            description: page.description.clone(),
            image_count: page.images.len(),
        },
        created_at: Utc::now(),
    })
}

fn dedupe_platforms(platforms: &[Platform]) -> Vec<Platform> {
    let mut seen = std::collections::HashSet::new();
    platforms
        .iter()
        .copied()
        .filter(|p| seen.insert(*p))
        .collect()
}
