use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use showreel_common::Config;
use showreel_engine::{MemoryStore, ProfileEngine, ProfileStore};

mod rest;

pub struct AppState {
    pub engine: ProfileEngine,
    pub store: Arc<dyn ProfileStore>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("showreel=info".parse()?))
        .init();

    let config = Config::from_env();
    let store: Arc<dyn ProfileStore> = Arc::new(MemoryStore::new());
    let engine = ProfileEngine::from_config(&config, store.clone());

    let state = Arc::new(AppState { engine, store });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/profiles/generate", post(rest::api_generate_profile))
        .route("/api/profiles", get(rest::api_list_profiles))
        .route("/api/profiles/{id}", get(rest::api_profile_detail))
        .route(
            "/api/profiles/{id}/projects/{project_id}/cover-image",
            patch(rest::api_patch_cover_image),
        )
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(%addr, "Starting showreel API");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
