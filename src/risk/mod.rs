use std::collections::HashMap;

use crate::core::{clamp01, Anomaly, Entity, EntityType, JurisdictionRisk};

/// Sanctioned entities contribute this much on the sanctions axis. The
/// scale is deliberately asymmetric (0.8, not 1.0): a list hit is strong
/// but partial evidence.
const SANCTIONS_RISK: f64 = 0.8;

/// Substituted wherever an optional input (reputation, jurisdiction,
/// unmapped entity type) is absent.
const NEUTRAL_RISK: f64 = 0.5;

/// Transaction amounts are normalized against this when folded into the
/// anomaly sub-score.
const AMOUNT_NORMALIZER: f64 = 1_000_000.0;

/// Relative weight of each risk factor. Must sum to 1.0; the scorer
/// refuses to start otherwise, since a skewed table silently corrupts
/// every score.
#[derive(Debug, Clone)]
pub struct RiskWeights {
    pub entity_type: f64,
    pub sanctions: f64,
    pub reputation: f64,
    pub anomalies: f64,
    pub geographic: f64,
}

impl RiskWeights {
    fn sum(&self) -> f64 {
        self.entity_type + self.sanctions + self.reputation + self.anomalies + self.geographic
    }
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            entity_type: 0.30,
            sanctions: 0.25,
            reputation: 0.20,
            anomalies: 0.15,
            geographic: 0.10,
        }
    }
}

fn entity_type_risk_table() -> HashMap<EntityType, f64> {
    [
        (EntityType::ShellCompany, 0.8),
        (EntityType::FinancialIntermediary, 0.6),
        (EntityType::Corporation, 0.4),
        (EntityType::NonProfit, 0.3),
        (EntityType::GovernmentAgency, 0.2),
        (EntityType::Unknown, 0.5),
    ]
    .into_iter()
    .collect()
}

/// Combines entity type, sanctions status, reputation, anomaly severities
/// and jurisdiction into one bounded risk score with a human-readable
/// explanation.
pub struct RiskScorer {
    weights: RiskWeights,
    type_risk: HashMap<EntityType, f64>,
    jurisdictions: JurisdictionRisk,
}

impl RiskScorer {
    /// Panics if the weights do not sum to 1.0 — a misconfigured weight
    /// table is a fatal setup error, not a recoverable one.
    pub fn new(weights: RiskWeights, jurisdictions: JurisdictionRisk) -> Self {
        let sum = weights.sum();
        assert!(
            (sum - 1.0).abs() < 1e-6,
            "risk weights must sum to 1.0, got {sum}"
        );
        Self {
            weights,
            type_risk: entity_type_risk_table(),
            jurisdictions,
        }
    }

    /// Weighted risk score in [0, 1] for one entity, given the anomalies
    /// raised by the surrounding transaction (if any).
    pub fn score(
        &self,
        entity: &Entity,
        anomalies: &[Anomaly],
        transaction_amount: Option<f64>,
    ) -> f64 {
        let type_risk = self
            .type_risk
            .get(&entity.entity_type)
            .copied()
            .unwrap_or(NEUTRAL_RISK);
        let sanctions_risk = if entity.sanctions_status {
            SANCTIONS_RISK
        } else {
            0.0
        };
        let reputation_risk = entity
            .reputation_score
            .map(|r| 1.0 - r)
            .unwrap_or(NEUTRAL_RISK);
        let anomaly_risk = anomaly_risk(anomalies, transaction_amount);
        let geographic_risk = self.geographic_risk(entity.jurisdiction.as_deref());

        clamp01(
            type_risk * self.weights.entity_type
                + sanctions_risk * self.weights.sanctions
                + reputation_risk * self.weights.reputation
                + anomaly_risk * self.weights.anomalies
                + geographic_risk * self.weights.geographic,
        )
    }

    fn geographic_risk(&self, jurisdiction: Option<&str>) -> f64 {
        match jurisdiction {
            Some(code) => self.jurisdictions.weight(code).unwrap_or(NEUTRAL_RISK),
            None => NEUTRAL_RISK,
        }
    }

    /// Ordered, human-readable explanation of a score. Never empty: if no
    /// clause applies, a fallback clause is emitted.
    pub fn explain(&self, entity: &Entity, _score: f64, anomalies: &[Anomaly]) -> String {
        let mut reasons: Vec<String> = Vec::new();

        match entity.entity_type {
            EntityType::ShellCompany => {
                reasons.push("Entity is classified as a shell company".to_string());
            }
            EntityType::FinancialIntermediary => {
                reasons.push("Entity is a financial intermediary".to_string());
            }
            _ => {}
        }

        if entity.sanctions_status {
            reasons.push("Entity is on sanctions list".to_string());
        }

        if entity.reputation_score.is_some_and(|r| r < 0.3) {
            reasons.push("Entity has poor reputation based on news analysis".to_string());
        }

        for anomaly in anomalies {
            reasons.push(format!("Anomaly detected: {}", anomaly.description));
        }

        if let Some(code) = entity.jurisdiction.as_deref() {
            if self.jurisdictions.contains(code) {
                reasons.push(format!(
                    "Entity is based in a high-risk jurisdiction ({code})"
                ));
            }
        }

        if reasons.is_empty() {
            reasons.push("Risk score based on standard entity assessment".to_string());
        }

        reasons.join(" | ")
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(RiskWeights::default(), JurisdictionRisk::default())
    }
}

/// Average anomaly severity, optionally re-averaged 50/50 with the
/// normalized transaction amount. No anomalies means no anomaly risk,
/// whatever the amount.
fn anomaly_risk(anomalies: &[Anomaly], transaction_amount: Option<f64>) -> f64 {
    if anomalies.is_empty() {
        return 0.0;
    }

    let avg: f64 =
        anomalies.iter().map(|a| a.severity).sum::<f64>() / anomalies.len() as f64;

    match transaction_amount {
        Some(amount) => {
            let amount_factor = (amount / AMOUNT_NORMALIZER).min(1.0);
            (avg + amount_factor) / 2.0
        }
        None => avg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(entity_type: EntityType) -> Entity {
        Entity::new("Test Entity", entity_type, 0.9, vec![])
    }

    fn anomaly(severity: f64, description: &str) -> Anomaly {
        Anomaly::new("test", severity, description, vec![])
    }

    #[test]
    fn sanctioned_shell_in_high_risk_jurisdiction_exact_sum() {
        let scorer = RiskScorer::default();
        let mut e = entity(EntityType::ShellCompany);
        e.sanctions_status = true;
        e.jurisdiction = Some("ru".to_string());

        // 0.8*0.30 + 0.8*0.25 + 0.5*0.20 + 0.0*0.15 + 0.8*0.10
        let expected = 0.24 + 0.20 + 0.10 + 0.0 + 0.08;
        let score = scorer.score(&e, &[], None);
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn anomaly_term_averages_severities() {
        let scorer = RiskScorer::default();
        let e = entity(EntityType::Corporation);
        let anomalies = vec![anomaly(0.6, "a"), anomaly(0.8, "b")];

        // type 0.4*0.30 + reputation 0.5*0.20 + anomalies 0.7*0.15 + geo 0.5*0.10
        let expected = 0.12 + 0.10 + 0.105 + 0.05;
        let score = scorer.score(&e, &anomalies, None);
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn amount_reaverages_anomaly_term() {
        let scorer = RiskScorer::default();
        let e = entity(EntityType::Corporation);
        let anomalies = vec![anomaly(0.6, "a"), anomaly(0.8, "b")];

        // (0.7 + 0.5) / 2 = 0.6 on the anomaly axis
        let expected = 0.12 + 0.10 + 0.6 * 0.15 + 0.05;
        let score = scorer.score(&e, &anomalies, Some(500_000.0));
        assert!((score - expected).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn amount_without_anomalies_is_ignored() {
        let scorer = RiskScorer::default();
        let e = entity(EntityType::Corporation);
        let with = scorer.score(&e, &[], Some(5_000_000.0));
        let without = scorer.score(&e, &[], None);
        assert_eq!(with, without);
    }

    #[test]
    fn reputation_inverts_into_risk() {
        let scorer = RiskScorer::default();
        let mut trusted = entity(EntityType::Corporation);
        trusted.reputation_score = Some(0.9);
        let mut distrusted = entity(EntityType::Corporation);
        distrusted.reputation_score = Some(0.1);

        assert!(scorer.score(&distrusted, &[], None) > scorer.score(&trusted, &[], None));
    }

    #[test]
    fn unknown_jurisdiction_is_neutral() {
        let scorer = RiskScorer::default();
        let mut listed = entity(EntityType::Corporation);
        listed.jurisdiction = Some("ch".to_string());
        let unlisted = entity(EntityType::Corporation);

        assert_eq!(
            scorer.score(&listed, &[], None),
            scorer.score(&unlisted, &[], None)
        );
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let scorer = RiskScorer::default();
        let mut worst = entity(EntityType::ShellCompany);
        worst.sanctions_status = true;
        worst.jurisdiction = Some("kp".to_string());
        worst.reputation_score = Some(0.0);
        let anomalies = vec![anomaly(1.0, "a"), anomaly(1.0, "b")];

        let score = scorer.score(&worst, &anomalies, Some(10_000_000.0));
        assert!((0.0..=1.0).contains(&score));

        let best = entity(EntityType::GovernmentAgency);
        let score = scorer.score(&best, &[], None);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    #[should_panic(expected = "risk weights must sum to 1.0")]
    fn skewed_weights_refused() {
        let weights = RiskWeights {
            entity_type: 0.9,
            ..RiskWeights::default()
        };
        let _ = RiskScorer::new(weights, JurisdictionRisk::default());
    }

    #[test]
    fn explain_fallback_for_plain_entity() {
        let scorer = RiskScorer::default();
        let e = entity(EntityType::Corporation);
        assert_eq!(
            scorer.explain(&e, 0.3, &[]),
            "Risk score based on standard entity assessment"
        );
    }

    #[test]
    fn explain_clause_order_is_fixed() {
        let scorer = RiskScorer::default();
        let mut e = entity(EntityType::ShellCompany);
        e.sanctions_status = true;
        e.reputation_score = Some(0.1);
        e.jurisdiction = Some("RU".to_string());
        let anomalies = vec![anomaly(0.7, "Round number transaction: 5000 USD")];

        let reason = scorer.explain(&e, 0.9, &anomalies);
        assert_eq!(
            reason,
            "Entity is classified as a shell company | \
             Entity is on sanctions list | \
             Entity has poor reputation based on news analysis | \
             Anomaly detected: Round number transaction: 5000 USD | \
             Entity is based in a high-risk jurisdiction (RU)"
        );
    }

    #[test]
    fn explain_lists_anomalies_in_given_order() {
        let scorer = RiskScorer::default();
        let e = entity(EntityType::Corporation);
        let anomalies = vec![anomaly(0.5, "first"), anomaly(0.9, "second")];

        let reason = scorer.explain(&e, 0.4, &anomalies);
        assert_eq!(
            reason,
            "Anomaly detected: first | Anomaly detected: second"
        );
    }

    #[test]
    fn explain_reputation_clause_needs_known_reputation() {
        let scorer = RiskScorer::default();
        // None means unknown, which is neutral, not poor.
        let e = entity(EntityType::Corporation);
        assert!(!scorer.explain(&e, 0.5, &[]).contains("poor reputation"));
    }

    #[test]
    fn explain_never_empty() {
        let scorer = RiskScorer::default();
        for ty in [
            EntityType::Corporation,
            EntityType::NonProfit,
            EntityType::ShellCompany,
            EntityType::GovernmentAgency,
            EntityType::FinancialIntermediary,
            EntityType::Unknown,
        ] {
            assert!(!scorer.explain(&entity(ty), 0.5, &[]).is_empty());
        }
    }
}
