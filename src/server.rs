use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::conflict::{ConflictPair, find_conflicts};
use crate::data::{GenerationInput, GenerationOutput, Offering};
use crate::ingest::{Normalized, OfferingRow, normalize_rows};
use crate::solver;

#[derive(Debug, Clone)]
struct AppState {
    max_combinations: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRequest {
    pub offerings: Vec<Offering>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub conflict_free: bool,
    pub conflicts: Vec<ConflictPair>,
    /// Human-readable lines, one per conflict.
    pub lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeRequest {
    pub rows: Vec<OfferingRow>,
}

async fn solve_handler(
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<GenerationInput>,
) -> Result<Json<GenerationOutput>, (StatusCode, String)> {
    let cap = &mut input.preferences.max_combinations;
    *cap = (*cap).min(state.max_combinations);
    // enumeration is CPU-bound; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || solver::solve(&input))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    match result {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn conflicts_handler(Json(request): Json<ConflictRequest>) -> Json<ConflictReport> {
    let conflicts = find_conflicts(&request.offerings);
    Json(ConflictReport {
        conflict_free: conflicts.is_empty(),
        lines: conflicts.iter().map(ToString::to_string).collect(),
        conflicts,
    })
}

async fn normalize_handler(Json(request): Json<NormalizeRequest>) -> Json<Normalized> {
    Json(normalize_rows(&request.rows))
}

pub fn router(config: &Config) -> Router {
    let state = Arc::new(AppState {
        max_combinations: config.max_combinations,
    });
    Router::new()
        .route("/v1/schedule/solve", post(solve_handler))
        .route("/v1/schedule/conflicts", post(conflicts_handler))
        .route("/v1/offerings/normalize", post(normalize_handler))
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let app = router(&config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
