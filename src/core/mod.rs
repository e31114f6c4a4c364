pub mod pipeline;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Clamp a sub-score or confidence value into the unit interval.
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Categorical entity type, assigned at classification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "Corporation")]
    Corporation,
    #[serde(rename = "Non-Profit")]
    NonProfit,
    #[serde(rename = "Shell Company")]
    ShellCompany,
    #[serde(rename = "Government Agency")]
    GovernmentAgency,
    #[serde(rename = "Financial Intermediary")]
    FinancialIntermediary,
    #[serde(rename = "Unknown")]
    Unknown,
}

/// A named organization subject to risk assessment.
///
/// The display name is the de-facto primary key: caching and transaction
/// history are keyed by it, case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub confidence_score: f64,
    /// Append-only, duplicates allowed, order = discovery order.
    pub evidence_sources: Vec<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    /// ISO-2-like country code; producers disagree on case, consumers
    /// normalize at lookup time.
    #[serde(default)]
    pub jurisdiction: Option<String>,
    /// Calendar date in `YYYY-MM-DD` string form. May fail to parse, in
    /// which case date-based rules treat it as absent.
    #[serde(default)]
    pub incorporation_date: Option<String>,
    #[serde(default)]
    pub directors: Option<Vec<String>>,
    #[serde(default)]
    pub shareholders: Option<Vec<String>>,
    #[serde(default)]
    pub sanctions_status: bool,
    #[serde(default)]
    pub risk_factors: Option<HashMap<String, f64>>,
    /// Higher = better reputation (inverse of risk). `None` means unknown,
    /// which the scorer treats as its neutral default.
    #[serde(default)]
    pub reputation_score: Option<f64>,
}

impl Entity {
    /// Create a bare entity as produced by name-based classification.
    pub fn new(
        name: impl Into<String>,
        entity_type: EntityType,
        confidence_score: f64,
        evidence_sources: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            entity_type,
            confidence_score: clamp01(confidence_score),
            evidence_sources,
            registration_number: None,
            jurisdiction: None,
            incorporation_date: None,
            directors: None,
            shareholders: None,
            sanctions_status: false,
            risk_factors: None,
            reputation_score: None,
        }
    }

    /// Parsed incorporation date, treating malformed strings as absent.
    pub fn incorporation_date_parsed(&self) -> Option<NaiveDate> {
        let raw = self.incorporation_date.as_deref()?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

/// A flagged, severity-scored irregularity in a transaction or entity
/// profile. Immutable once constructed; never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: f64,
    pub description: String,
    pub evidence: Vec<String>,
}

impl Anomaly {
    pub fn new(
        kind: impl Into<String>,
        severity: f64,
        description: impl Into<String>,
        evidence: Vec<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity: clamp01(severity),
            description: description.into(),
            evidence,
        }
    }
}

/// A transaction as submitted for analysis or emitted by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub description: String,
    pub amount: f64,
    pub currency: String,
    pub date: String,
}

/// One scoring outcome per (transaction, entity) pair. Produced fresh per
/// request, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub transaction_id: String,
    pub entity_name: String,
    pub entity_type: EntityType,
    pub risk_score: f64,
    /// Copied from the entity at scoring time.
    pub supporting_evidence: Vec<String>,
    pub confidence_score: f64,
    pub reason: String,
}

/// High-risk jurisdiction table shared by the anomaly engine and the risk
/// scorer. Keys are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct JurisdictionRisk {
    weights: HashMap<String, f64>,
}

impl JurisdictionRisk {
    /// Build from an arbitrary-case map (e.g. config overrides).
    pub fn from_map(weights: &HashMap<String, f64>) -> Self {
        Self {
            weights: weights
                .iter()
                .map(|(code, w)| (code.to_lowercase(), *w))
                .collect(),
        }
    }

    /// Risk weight for a country code, if listed.
    pub fn weight(&self, code: &str) -> Option<f64> {
        self.weights.get(&code.to_lowercase()).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.weights.contains_key(&code.to_lowercase())
    }
}

impl Default for JurisdictionRisk {
    fn default() -> Self {
        let weights = [
            ("ru", 0.8),
            ("cn", 0.7),
            ("ir", 0.9),
            ("kp", 0.9),
            ("sy", 0.8),
            ("ve", 0.7),
            ("mm", 0.7),
            ("zw", 0.6),
        ]
        .into_iter()
        .map(|(code, w)| (code.to_string(), w))
        .collect();
        Self { weights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.3), 0.0);
        assert_eq!(clamp01(1.7), 1.0);
        assert_eq!(clamp01(0.42), 0.42);
    }

    #[test]
    fn entity_new_clamps_confidence() {
        let e = Entity::new("Acme Corp", EntityType::Corporation, 1.4, vec![]);
        assert_eq!(e.confidence_score, 1.0);
    }

    #[test]
    fn incorporation_date_valid() {
        let mut e = Entity::new("Acme Corp", EntityType::Corporation, 0.9, vec![]);
        e.incorporation_date = Some("2021-06-15".to_string());
        assert_eq!(
            e.incorporation_date_parsed(),
            NaiveDate::from_ymd_opt(2021, 6, 15)
        );
    }

    #[test]
    fn incorporation_date_malformed_is_absent() {
        let mut e = Entity::new("Acme Corp", EntityType::Corporation, 0.9, vec![]);
        e.incorporation_date = Some("June 2021".to_string());
        assert_eq!(e.incorporation_date_parsed(), None);
    }

    #[test]
    fn jurisdiction_lookup_case_insensitive() {
        let table = JurisdictionRisk::default();
        assert_eq!(table.weight("RU"), Some(0.8));
        assert_eq!(table.weight("ru"), Some(0.8));
        assert!(table.contains("Kp"));
        assert_eq!(table.weight("us"), None);
    }

    #[test]
    fn jurisdiction_from_map_normalizes_keys() {
        let mut overrides = HashMap::new();
        overrides.insert("PA".to_string(), 0.65);
        let table = JurisdictionRisk::from_map(&overrides);
        assert_eq!(table.weight("pa"), Some(0.65));
    }

    #[test]
    fn entity_type_wire_labels() {
        let json = serde_json::to_string(&EntityType::ShellCompany).unwrap();
        assert_eq!(json, "\"Shell Company\"");
        let back: EntityType = serde_json::from_str("\"Non-Profit\"").unwrap();
        assert_eq!(back, EntityType::NonProfit);
    }
}
