mod anomaly;
mod api;
mod config;
mod core;
mod enrich;
mod extract;
mod risk;
mod synth;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::anomaly::history::HistoryTracker;
use crate::api::AppState;
use crate::config::Config;
use crate::core::pipeline::AnalysisPipeline;
use crate::enrich::registry::RegistryClient;
use crate::enrich::Enricher;
use crate::extract::EntityExtractor;
use crate::risk::RiskScorer;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("riskradar=info".parse().unwrap()),
        )
        .init();

    tracing::info!("riskradar starting...");

    // Load configuration
    let config = Config::load("config.toml");
    tracing::info!("Config: {:?}", config);

    // Shared rule tables
    let jurisdictions = config.risk.jurisdiction_table();
    let thresholds = config.anomaly.thresholds();

    // Scoring and anomaly components
    let scorer = RiskScorer::new(config.risk.weights(), jurisdictions.clone());
    let history = HistoryTracker::new(thresholds.clone(), config.anomaly.max_tracked_entities);

    // Enrichment: synthetic by default, registry-first when configured
    let registry = config.enrichment.use_registry.then(|| {
        RegistryClient::new(
            &config.enrichment.lei_url,
            &config.enrichment.screening_url,
            config.enrichment.screening_api_key.clone(),
        )
    });
    if registry.is_some() {
        tracing::info!("Registry enrichment enabled");
    }
    let enricher = Enricher::new(config.enrichment.cache_capacity, registry);

    let pipeline = AnalysisPipeline::new(
        EntityExtractor::new(),
        enricher,
        scorer,
        thresholds,
        jurisdictions,
        history,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = api::router(state);

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind API listener");
    tracing::info!("API listening on {addr}");

    axum::serve(listener, app).await.expect("API server failed");
}
