//! Aggregated torrent search endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use magnetar_core::{AggregateError, MediaQuery, ProviderReport, TorrentResult};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<TorrentResult>,
    pub duration_ms: u64,
    /// Per-provider outcome of this query.
    pub providers: Vec<ProviderReport>,
}

#[derive(Debug, Deserialize)]
pub struct EpisodeParams {
    pub title: Option<String>,
}

/// GET /torrents/movie/{id}
pub async fn find_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    run_query(&state, MediaQuery::movie(id)).await
}

/// GET /torrents/episode/{id}?title=...
pub async fn find_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<EpisodeParams>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    let title = match params.title.map(|t| t.trim().to_string()) {
        Some(title) if !title.is_empty() => title,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "missing episode title".to_string(),
                }),
            ))
        }
    };

    run_query(&state, MediaQuery::episode(id, title)).await
}

async fn run_query(
    state: &AppState,
    query: MediaQuery,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();

    match state.aggregator().query_detailed(&query).await {
        Ok((results, outcome)) => Ok(Json(SearchResponse {
            results,
            duration_ms: start.elapsed().as_millis() as u64,
            providers: outcome.providers,
        })),
        Err(e @ AggregateError::AllProvidersFailed(_)) => {
            warn!(id = %query.id(), error = %e, "Torrent search failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
