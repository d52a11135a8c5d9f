use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::warn;

use showreel_common::ShowreelError;

use crate::AppState;

// --- Request bodies ---

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImageRequest {
    pub cover_image: String,
}

// --- Error mapping ---

fn error_response(err: ShowreelError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        ShowreelError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        ShowreelError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(error = %err, "Request failed");
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}

// --- Handlers ---

pub async fn api_generate_profile(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> impl IntoResponse {
    match state.engine.generate(&body.url).await {
        Ok(profile) => (StatusCode::OK, Json(serde_json::json!(profile))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn api_list_profiles(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(profiles) => (StatusCode::OK, Json(serde_json::json!(profiles))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn api_profile_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(serde_json::json!(profile))).into_response(),
        Ok(None) => error_response(ShowreelError::NotFound(id)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn api_patch_cover_image(
    State(state): State<Arc<AppState>>,
    Path((id, project_id)): Path<(String, String)>,
    Json(body): Json<CoverImageRequest>,
) -> impl IntoResponse {
    match state
        .store
        .patch_project_cover_image(&id, &project_id, &body.cover_image)
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(serde_json::json!(profile))).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
