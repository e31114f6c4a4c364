use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::anomaly::AnomalyThresholds;
use crate::core::JurisdictionRisk;
use crate::risk::RiskWeights;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub risk: RiskConfig,
    pub anomaly: AnomalyConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RiskConfig {
    pub entity_type_weight: f64,
    pub sanctions_weight: f64,
    pub reputation_weight: f64,
    pub anomalies_weight: f64,
    pub geographic_weight: f64,
    /// Country code -> risk weight overrides. Empty means the built-in
    /// high-risk table.
    pub high_risk_jurisdictions: HashMap<String, f64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnomalyConfig {
    pub large_amount: f64,
    pub round_unit: f64,
    pub round_floor: f64,
    pub daily_frequency: usize,
    pub daily_velocity: f64,
    pub new_entity_days: i64,
    pub recent_incorporation_days: i64,
    pub history_window_days: i64,
    /// LRU bound on the number of entities with tracked history.
    pub max_tracked_entities: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// LRU bound on cached entity profiles.
    pub cache_capacity: usize,
    /// Consult the network registry before the synthetic fallback.
    pub use_registry: bool,
    pub lei_url: String,
    pub screening_url: String,
    pub screening_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            risk: RiskConfig::default(),
            anomaly: AnomalyConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8081,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        let weights = RiskWeights::default();
        Self {
            entity_type_weight: weights.entity_type,
            sanctions_weight: weights.sanctions,
            reputation_weight: weights.reputation,
            anomalies_weight: weights.anomalies,
            geographic_weight: weights.geographic,
            high_risk_jurisdictions: HashMap::new(),
        }
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        let thresholds = AnomalyThresholds::default();
        Self {
            large_amount: thresholds.large_amount,
            round_unit: thresholds.round_unit,
            round_floor: thresholds.round_floor,
            daily_frequency: thresholds.daily_frequency,
            daily_velocity: thresholds.daily_velocity,
            new_entity_days: thresholds.new_entity_days,
            recent_incorporation_days: thresholds.recent_incorporation_days,
            history_window_days: thresholds.history_window_days,
            max_tracked_entities: 10_000,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 10_000,
            use_registry: false,
            lei_url: "https://api.gleif.org/api/v1/lei-records".into(),
            screening_url: "https://api.trade.gov/consolidated_screening_list/search".into(),
            screening_api_key: None,
        }
    }
}

impl RiskConfig {
    pub fn weights(&self) -> RiskWeights {
        RiskWeights {
            entity_type: self.entity_type_weight,
            sanctions: self.sanctions_weight,
            reputation: self.reputation_weight,
            anomalies: self.anomalies_weight,
            geographic: self.geographic_weight,
        }
    }

    pub fn jurisdiction_table(&self) -> JurisdictionRisk {
        if self.high_risk_jurisdictions.is_empty() {
            JurisdictionRisk::default()
        } else {
            JurisdictionRisk::from_map(&self.high_risk_jurisdictions)
        }
    }
}

impl AnomalyConfig {
    pub fn thresholds(&self) -> AnomalyThresholds {
        AnomalyThresholds {
            large_amount: self.large_amount,
            round_unit: self.round_unit,
            round_floor: self.round_floor,
            daily_frequency: self.daily_frequency,
            daily_velocity: self.daily_velocity,
            new_entity_days: self.new_entity_days,
            recent_incorporation_days: self.recent_incorporation_days,
            history_window_days: self.history_window_days,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }
}
