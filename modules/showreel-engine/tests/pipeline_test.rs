//! End-to-end pipeline tests with mocked collaborators. No network.

use std::sync::Arc;

use catalog_client::{CandidateMatch, MatchKind};
use showreel_common::{Platform, ShowreelError};
use showreel_engine::testing::{
    bare_deps, FailingFetcher, MockCatalog, MockChannelSource, MockFetcher, MockGenerator,
    MockPersonLookup, MockSearcher,
};
use showreel_engine::{EngineDeps, MemoryStore, ProfileEngine, ProfileStore};
use video_client::ChannelVideo;

const PORTFOLIO_URL: &str = "https://janedoe.example/";

const PORTFOLIO_HTML: &str = r#"
    <html>
    <head>
        <title>Jane Doe - Director</title>
        <meta name="description" content="Award-winning director of short films.">
        <meta property="og:image" content="https://janedoe.example/hero.jpg">
    </head>
    <body>
        <a href="https://www.youtube.com/@janedoe">YouTube</a>
        <a href="https://www.linkedin.com/in/janedoe">LinkedIn</a>
        <a href="https://vimeo.com/123456">Watch the reel</a>
        <p>Jane Doe directed The Long Road Home and Echoes.</p>
    </body>
    </html>
"#;

fn synthesis_json() -> &'static str {
    r#"{
        "name": "Jane Doe",
        "role": "Director",
        "bio": "Award-winning director of short films.",
        "yearsActive": "2015-present",
        "confidence": 0.9,
        "projects": [
            {"title": "The Long Road Home", "year": "2019", "role": "Director"},
            {"title": "Echoes", "year": "2021", "role": "Director"}
        ],
        "media": [
            {"url": "https://vimeo.com/123456", "title": "Reel", "platform": "vimeo"}
        ],
        "platforms": ["youtube", "vimeo", "linkedin"]
    }"#
}

fn engine_with(deps: EngineDeps) -> (ProfileEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (ProfileEngine::new(deps, store.clone()), store)
}

#[tokio::test]
async fn invalid_url_is_rejected_up_front() {
    let fetcher = Arc::new(MockFetcher::new());
    let (engine, _) = engine_with(bare_deps(fetcher.clone()));

    let err = engine.generate("ht tp:// ///").await.unwrap_err();
    assert!(matches!(err, ShowreelError::InvalidUrl(_)));
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn repeated_generation_hits_the_cache() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, PORTFOLIO_HTML));
    let (engine, _) = engine_with(bare_deps(fetcher.clone()));

    let first = engine.generate(PORTFOLIO_URL).await.unwrap();
    let second = engine.generate(PORTFOLIO_URL).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn scheme_variants_share_one_profile() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, PORTFOLIO_HTML));
    let (engine, store) = engine_with(bare_deps(fetcher));

    let first = engine.generate("janedoe.example/").await.unwrap();
    let second = engine.generate("https://janedoe.example/").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn credential_less_run_produces_a_fallback_profile() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, PORTFOLIO_HTML));
    let (engine, _) = engine_with(bare_deps(fetcher));

    let profile = engine.generate(PORTFOLIO_URL).await.unwrap();
    assert_eq!(profile.name, "Jane Doe");
    assert_eq!(profile.confidence, 0.4);
    assert_eq!(profile.role, "Creative Professional");
    assert_eq!(profile.image_url.as_deref(), Some("https://janedoe.example/hero.jpg"));
    assert!(profile.platforms.contains(&Platform::Youtube));
    assert!(profile.platforms.contains(&Platform::Linkedin));
    assert!(profile.platforms.contains(&Platform::Vimeo));
}

#[tokio::test]
async fn empty_generator_payload_still_yields_a_profile() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, PORTFOLIO_HTML));
    let mut deps = bare_deps(fetcher);
    deps.generator = Some(Arc::new(MockGenerator::returning("{}")));
    let (engine, _) = engine_with(deps);

    // A parseable but contentless response must not fail assembly; the
    // subject name comes from the page title instead.
    let profile = engine.generate(PORTFOLIO_URL).await.unwrap();
    assert_eq!(profile.name, "Jane Doe");
    assert_eq!(profile.project_count, 0);
}

#[tokio::test]
async fn unreachable_site_still_yields_a_degraded_profile() {
    let fetcher = Arc::new(FailingFetcher::new());
    let (engine, _) = engine_with(bare_deps(fetcher));

    let profile = engine.generate("https://unreachable.example/").await.unwrap();
    assert_eq!(profile.name, "Unknown");
    assert_eq!(profile.confidence, 0.4);
    assert_eq!(profile.project_count, 0);
    assert_eq!(profile.platforms, vec![Platform::Website]);
    assert!(profile.crawl_summary.title.is_none());
}

#[tokio::test]
async fn full_pipeline_matches_catalogs_and_reconciles_media() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, PORTFOLIO_HTML));
    let catalog = Arc::new(MockCatalog::with_candidates(vec![CandidateMatch {
        title: "The Long Road Home".to_string(),
        date: Some("2019-05-01".to_string()),
        artwork: Some("https://image.tmdb.org/t/p/w500/road.jpg".to_string()),
        source_id: "77".to_string(),
        kind: MatchKind::Movie,
        canonical_url: "https://www.themoviedb.org/movie/77".to_string(),
    }]));
    let uploads = vec![ChannelVideo {
        id: "vid1".to_string(),
        url: "https://www.youtube.com/watch?v=vid1".to_string(),
        title: "Echoes official short".to_string(),
        description: "The short film Echoes.".to_string(),
        thumbnail: "https://i.ytimg.com/vi/vid1/hqdefault.jpg".to_string(),
        published_at: "2021-03-01T00:00:00Z".to_string(),
    }];
    let channel = Arc::new(MockChannelSource::with_videos(Platform::Youtube, uploads));

    let mut deps = bare_deps(fetcher);
    deps.searcher = Some(Arc::new(MockSearcher::returning(
        "Jane Doe directed The Long Road Home (2019).",
    )));
    deps.generator = Some(Arc::new(MockGenerator::returning(synthesis_json())));
    deps.catalog_sources = vec![catalog.clone()];
    deps.channel_sources = vec![channel.clone()];
    let (engine, _) = engine_with(deps);

    let profile = engine.generate(PORTFOLIO_URL).await.unwrap();

    assert_eq!(profile.name, "Jane Doe");
    assert_eq!(profile.confidence, 0.9);
    assert_eq!(profile.project_count, profile.projects.len());
    assert_eq!(profile.project_count, 2);

    let road = profile
        .projects
        .iter()
        .find(|p| p.title == "The Long Road Home")
        .unwrap();
    assert_eq!(
        road.cover_image.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/road.jpg")
    );
    assert_eq!(
        road.source_url.as_deref(),
        Some("https://www.themoviedb.org/movie/77")
    );

    let echoes = profile.projects.iter().find(|p| p.title == "Echoes").unwrap();
    assert_eq!(
        echoes.cover_image.as_deref(),
        Some("https://i.ytimg.com/vi/vid1/hqdefault.jpg")
    );
    assert!(echoes.has_video);

    // Channel uploads replace the synthesized YouTube guesses; the
    // Vimeo item survives because no Vimeo channel was listed.
    assert!(profile
        .media
        .iter()
        .any(|m| m.url == "https://www.youtube.com/watch?v=vid1"));
    assert!(profile.media.iter().any(|m| m.url == "https://vimeo.com/123456"));
    assert_eq!(channel.calls(), 1);
}

#[tokio::test]
async fn patched_cover_image_survives_regeneration_requests() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, PORTFOLIO_HTML));
    let mut deps = bare_deps(fetcher);
    deps.searcher = Some(Arc::new(MockSearcher::returning(
        "Jane Doe directed The Long Road Home (2019).",
    )));
    let store = Arc::new(MemoryStore::new());
    let engine = ProfileEngine::new(deps, store.clone());

    let profile = engine.generate(PORTFOLIO_URL).await.unwrap();
    let project_id = profile.projects[0].id.clone();

    store
        .patch_project_cover_image(&profile.id, &project_id, "https://img.example/mine.jpg")
        .await
        .unwrap();

    let again = engine.generate(PORTFOLIO_URL).await.unwrap();
    let project = again.projects.iter().find(|p| p.id == project_id).unwrap();
    assert_eq!(project.cover_image.as_deref(), Some("https://img.example/mine.jpg"));
    assert!(project.cover_image_locked);
}

#[tokio::test]
async fn imageless_pages_fall_back_to_a_person_headshot() {
    let html = r#"
        <html>
        <head><title>Jane Doe - Director</title></head>
        <body><p>Films by Jane Doe.</p></body>
        </html>
    "#;
    let fetcher = Arc::new(MockFetcher::new().with_page(PORTFOLIO_URL, html));
    let lookup = Arc::new(MockPersonLookup::returning(Some(
        "https://image.tmdb.org/t/p/w500/jane.jpg".to_string(),
    )));

    let mut deps = bare_deps(fetcher);
    deps.person_lookup = Some(lookup.clone());
    let (engine, _) = engine_with(deps);

    let profile = engine.generate(PORTFOLIO_URL).await.unwrap();
    assert_eq!(
        profile.image_url.as_deref(),
        Some("https://image.tmdb.org/t/p/w500/jane.jpg")
    );
    assert_eq!(lookup.calls(), 1);
}
