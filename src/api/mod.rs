use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::pipeline::AnalysisPipeline;
use crate::core::{AnalysisResult, EntityType, Transaction};
use crate::synth;

/// Transactions analyzed per batch request.
const BATCH_SIZE: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/entity/:name", get(entity_details))
        .route("/api/v1/risk-score/:name", get(entity_risk_score))
        .route("/api/v1/generate-transaction", get(generate_transaction))
        .route("/api/v1/batch-analyze", post(batch_analyze))
        .route("/api/v1/extract-entities", get(extract_entities))
        .layer(Extension(state))
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze(
    Extension(state): Extension<AppState>,
    Json(tx): Json<Transaction>,
) -> Json<Vec<AnalysisResult>> {
    Json(state.pipeline.analyze(&tx).await)
}

async fn entity_details(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.pipeline.enricher().detail(&name, Utc::now()).await {
        Some(entity) => Json(entity).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "entity not found" })),
        )
            .into_response(),
    }
}

async fn entity_risk_score(
    Extension(state): Extension<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.pipeline.enricher().detail(&name, Utc::now()).await {
        Some(entity) => {
            let risk_score = state.pipeline.scorer().score(&entity, &[], None);
            Json(json!({ "entity_id": name, "risk_score": risk_score })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "entity not found" })),
        )
            .into_response(),
    }
}

async fn generate_transaction() -> Json<Transaction> {
    Json(synth::generate_transaction(Utc::now(), &mut rand::thread_rng()))
}

async fn batch_analyze(Extension(state): Extension<AppState>) -> Json<Vec<AnalysisResult>> {
    let mut results = Vec::new();
    for _ in 0..BATCH_SIZE {
        let tx = synth::generate_transaction(Utc::now(), &mut rand::thread_rng());
        results.extend(state.pipeline.analyze(&tx).await);
    }
    Json(results)
}

#[derive(Debug, Deserialize)]
struct ExtractParams {
    text: String,
}

#[derive(Debug, Serialize)]
struct ExtractedEntity {
    name: String,
    #[serde(rename = "type")]
    entity_type: EntityType,
    confidence: f64,
}

async fn extract_entities(
    Extension(state): Extension<AppState>,
    Query(params): Query<ExtractParams>,
) -> Json<Vec<ExtractedEntity>> {
    let entities = state
        .pipeline
        .extractor()
        .extract(&params.text)
        .into_iter()
        .map(|e| ExtractedEntity {
            name: e.name,
            entity_type: e.entity_type,
            confidence: e.confidence_score,
        })
        .collect();
    Json(entities)
}
