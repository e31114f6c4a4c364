pub mod history;

use chrono::{DateTime, Utc};

use crate::core::{Anomaly, Entity, EntityType, JurisdictionRisk};

pub const LARGE_TRANSACTION: &str = "large_transaction";
pub const ROUND_AMOUNT: &str = "round_amount";
pub const HIGH_FREQUENCY: &str = "high_frequency";
pub const HIGH_VELOCITY: &str = "high_velocity";
pub const NEW_ENTITY: &str = "new_entity";
pub const HIGH_RISK_JURISDICTION: &str = "high_risk_jurisdiction";
pub const SHELL_COMPANY: &str = "shell_company";

/// Jurisdiction weights at or below this value do not raise an anomaly on
/// their own (they still contribute to the geographic sub-score).
const JURISDICTION_ANOMALY_FLOOR: f64 = 0.6;

/// Numeric thresholds for every anomaly rule. Built from config once and
/// passed into the engine; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AnomalyThresholds {
    /// Amounts above this flag `large_transaction`.
    pub large_amount: f64,
    /// `round_amount` fires on exact multiples of this unit...
    pub round_unit: f64,
    /// ...but only above this floor. 0 flags every multiple.
    pub round_floor: f64,
    /// Same-day transaction count above this flags `high_frequency`.
    pub daily_frequency: usize,
    /// Same-day amount sum above this flags `high_velocity`.
    pub daily_velocity: f64,
    /// Entities first observed fewer than this many days ago are new.
    pub new_entity_days: i64,
    /// Incorporation dates fewer than this many days ago are recent.
    pub recent_incorporation_days: i64,
    /// Trailing window kept per entity by the stateful variant.
    pub history_window_days: i64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            large_amount: 1_000_000.0,
            round_unit: 1_000.0,
            round_floor: 0.0,
            daily_frequency: 5,
            daily_velocity: 100_000.0,
            new_entity_days: 30,
            recent_incorporation_days: 180,
            history_window_days: 30,
        }
    }
}

/// Transaction-level rules shared by the stateless and stateful variants.
pub(crate) fn amount_rules(
    amount: f64,
    currency: &str,
    thresholds: &AnomalyThresholds,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    if amount > thresholds.large_amount {
        anomalies.push(Anomaly::new(
            LARGE_TRANSACTION,
            (amount / thresholds.large_amount).min(1.0),
            format!("Large transaction amount: {amount} {currency}"),
            vec!["Transaction amount exceeds threshold".to_string()],
        ));
    }

    if thresholds.round_unit > 0.0
        && amount % thresholds.round_unit == 0.0
        && amount > thresholds.round_floor
    {
        anomalies.push(Anomaly::new(
            ROUND_AMOUNT,
            0.7,
            format!("Round number transaction: {amount} {currency}"),
            vec!["Transaction amount is a round number".to_string()],
        ));
    }

    anomalies
}

/// Stateless anomaly detection: a pure function of the transaction amount,
/// the entity profiles and the supplied evaluation time.
///
/// Every rule is evaluated independently; a transaction may trigger any
/// subset, and each anomaly carries its own evidence.
pub fn detect(
    amount: f64,
    currency: &str,
    entities: &[Entity],
    now: DateTime<Utc>,
    thresholds: &AnomalyThresholds,
    jurisdictions: &JurisdictionRisk,
) -> Vec<Anomaly> {
    let mut anomalies = amount_rules(amount, currency, thresholds);

    for entity in entities {
        if let Some(code) = entity.jurisdiction.as_deref() {
            if let Some(weight) = jurisdictions.weight(code) {
                if weight > JURISDICTION_ANOMALY_FLOOR {
                    anomalies.push(Anomaly::new(
                        HIGH_RISK_JURISDICTION,
                        weight,
                        format!("Entity in high-risk jurisdiction: {code}"),
                        vec![format!("Entity jurisdiction is {code}")],
                    ));
                }
            }
        }

        if entity.entity_type == EntityType::ShellCompany {
            anomalies.push(Anomaly::new(
                SHELL_COMPANY,
                0.8,
                format!("Entity appears to be a shell company: {}", entity.name),
                vec![
                    "Entity classification".to_string(),
                    "Structure analysis".to_string(),
                ],
            ));
        }

        // Unparsable incorporation dates are skipped, not flagged.
        if let Some(date) = entity.incorporation_date_parsed() {
            let days_since = (now.date_naive() - date).num_days();
            if days_since < thresholds.recent_incorporation_days {
                anomalies.push(Anomaly::new(
                    NEW_ENTITY,
                    0.6,
                    format!("Recently formed entity: {}", entity.name),
                    vec![format!(
                        "Incorporation date: {}",
                        entity.incorporation_date.as_deref().unwrap_or_default()
                    )],
                ));
            }
        }
    }

    anomalies
}
