use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::anomaly::{self, history::HistoryTracker, AnomalyThresholds};
use crate::core::{AnalysisResult, JurisdictionRisk, Transaction};
use crate::enrich::Enricher;
use crate::extract::EntityExtractor;
use crate::risk::RiskScorer;

/// One-transaction analysis pipeline: extract entities, enrich each one,
/// run both anomaly variants, then score and explain per entity.
pub struct AnalysisPipeline {
    extractor: EntityExtractor,
    enricher: Enricher,
    scorer: RiskScorer,
    thresholds: AnomalyThresholds,
    jurisdictions: JurisdictionRisk,
    history: Mutex<HistoryTracker>,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: EntityExtractor,
        enricher: Enricher,
        scorer: RiskScorer,
        thresholds: AnomalyThresholds,
        jurisdictions: JurisdictionRisk,
        history: HistoryTracker,
    ) -> Self {
        Self {
            extractor,
            enricher,
            scorer,
            thresholds,
            jurisdictions,
            history: Mutex::new(history),
        }
    }

    /// Analyze against the current wall clock.
    pub async fn analyze(&self, tx: &Transaction) -> Vec<AnalysisResult> {
        self.analyze_at(tx, Utc::now()).await
    }

    /// Analyze at an explicit evaluation time. The clock is read once per
    /// request; everything below this point is deterministic in `now`.
    pub async fn analyze_at(&self, tx: &Transaction, now: DateTime<Utc>) -> Vec<AnalysisResult> {
        let extracted = self.extractor.extract(&tx.description);
        debug!(
            transaction_id = %tx.transaction_id,
            count = extracted.len(),
            "entities extracted"
        );

        // Enrichment is awaited per entity; order between entities does not
        // matter, results are scored independently.
        let mut entities = Vec::with_capacity(extracted.len());
        for entity in &extracted {
            entities.push(self.enricher.enrich(&entity.name, now).await);
        }

        let mut anomalies = anomaly::detect(
            tx.amount,
            &tx.currency,
            &entities,
            now,
            &self.thresholds,
            &self.jurisdictions,
        );
        anomalies.extend(self.history.lock().unwrap().observe(
            tx.amount,
            &tx.currency,
            &entities,
            now,
        ));

        let results: Vec<AnalysisResult> = entities
            .iter()
            .map(|entity| {
                let risk_score = self.scorer.score(entity, &anomalies, Some(tx.amount));
                let reason = self.scorer.explain(entity, risk_score, &anomalies);
                AnalysisResult {
                    transaction_id: tx.transaction_id.clone(),
                    entity_name: entity.name.clone(),
                    entity_type: entity.entity_type,
                    risk_score,
                    supporting_evidence: entity.evidence_sources.clone(),
                    confidence_score: entity.confidence_score,
                    reason,
                }
            })
            .collect();

        info!(
            transaction_id = %tx.transaction_id,
            entities = entities.len(),
            anomalies = anomalies.len(),
            "transaction analyzed"
        );

        results
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }
}
