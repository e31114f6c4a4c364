use std::collections::HashMap;
use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use lru::LruCache;

use crate::core::{Anomaly, Entity};

use super::{
    amount_rules, AnomalyThresholds, HIGH_FREQUENCY, HIGH_VELOCITY, NEW_ENTITY,
};

/// One observed transaction in an entity's trailing window.
#[derive(Debug, Clone)]
struct HistoryEntry {
    time: DateTime<Utc>,
    amount: f64,
}

/// Per-entity activity record. `first_seen` survives pruning so an entity
/// stays "known" even after a quiet month.
#[derive(Debug)]
struct EntityHistory {
    first_seen: DateTime<Utc>,
    transactions: Vec<HistoryEntry>,
    daily_totals: HashMap<NaiveDate, f64>,
}

impl EntityHistory {
    fn new(first_seen: DateTime<Utc>) -> Self {
        Self {
            first_seen,
            transactions: Vec::new(),
            daily_totals: HashMap::new(),
        }
    }
}

/// Outcome of folding one observation into an entity's history.
struct ActivityFlags {
    high_frequency: bool,
    high_velocity: bool,
    new_entity: bool,
}

/// Stateful anomaly variant: tracks a trailing 30-day window per entity
/// name and flags frequency, velocity and first-seen anomalies.
///
/// The entity map is LRU-bounded; evicting an entity forgets its window,
/// and its next observation registers it as new again.
pub struct HistoryTracker {
    thresholds: AnomalyThresholds,
    histories: LruCache<String, EntityHistory>,
}

impl HistoryTracker {
    pub fn new(thresholds: AnomalyThresholds, max_entities: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entities).unwrap_or(NonZeroUsize::MIN);
        Self {
            thresholds,
            histories: LruCache::new(capacity),
        }
    }

    /// Record one transaction against every involved entity and return the
    /// anomalies it raises. Shares the transaction-level rules with the
    /// stateless variant; the per-entity rules consult the updated history.
    pub fn observe(
        &mut self,
        amount: f64,
        currency: &str,
        entities: &[Entity],
        now: DateTime<Utc>,
    ) -> Vec<Anomaly> {
        let mut anomalies = amount_rules(amount, currency, &self.thresholds);

        for entity in entities {
            let flags = self.update(&entity.name, amount, now);

            if flags.high_frequency {
                anomalies.push(Anomaly::new(
                    HIGH_FREQUENCY,
                    0.8,
                    format!("High transaction frequency for {}", entity.name),
                    vec!["Transaction frequency exceeds threshold".to_string()],
                ));
            }
            if flags.high_velocity {
                anomalies.push(Anomaly::new(
                    HIGH_VELOCITY,
                    0.8,
                    format!("High transaction velocity for {}", entity.name),
                    vec!["Transaction velocity exceeds threshold".to_string()],
                ));
            }
            if flags.new_entity {
                anomalies.push(Anomaly::new(
                    NEW_ENTITY,
                    0.6,
                    format!("New entity detected: {}", entity.name),
                    vec!["Entity is new to the system".to_string()],
                ));
            }
        }

        anomalies
    }

    /// Number of entities currently tracked.
    #[allow(dead_code)]
    pub fn tracked_entities(&self) -> usize {
        self.histories.len()
    }

    fn update(&mut self, name: &str, amount: f64, now: DateTime<Utc>) -> ActivityFlags {
        if !self.histories.contains(name) {
            self.histories
                .put(name.to_string(), EntityHistory::new(now));
        }
        let Some(history) = self.histories.get_mut(name) else {
            // Unreachable with a nonzero capacity; stay silent rather than
            // corrupt the anomaly list.
            return ActivityFlags {
                high_frequency: false,
                high_velocity: false,
                new_entity: false,
            };
        };

        history.transactions.push(HistoryEntry { time: now, amount });
        let today = now.date_naive();
        *history.daily_totals.entry(today).or_insert(0.0) += amount;

        // Prune the trailing window after every update.
        let cutoff = now - Duration::days(self.thresholds.history_window_days);
        history.transactions.retain(|t| t.time > cutoff);
        let cutoff_date = cutoff.date_naive();
        history.daily_totals.retain(|date, _| *date > cutoff_date);

        let today_count = history
            .transactions
            .iter()
            .filter(|t| t.time.date_naive() == today)
            .count();
        let today_total = history.daily_totals.get(&today).copied().unwrap_or(0.0);

        ActivityFlags {
            high_frequency: today_count > self.thresholds.daily_frequency,
            high_velocity: today_total > self.thresholds.daily_velocity,
            new_entity: now - history.first_seen < Duration::days(self.thresholds.new_entity_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityType;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn entity(name: &str) -> Vec<Entity> {
        vec![Entity::new(name, EntityType::Corporation, 0.9, vec![])]
    }

    fn tracker() -> HistoryTracker {
        HistoryTracker::new(AnomalyThresholds::default(), 1000)
    }

    fn has_kind(anomalies: &[Anomaly], kind: &str) -> bool {
        anomalies.iter().any(|a| a.kind == kind)
    }

    #[test]
    fn sixth_same_day_transaction_trips_frequency() {
        let mut tracker = tracker();
        let entities = entity("Acme Corp");
        let now = fixed_now();

        for i in 0..5 {
            let found = tracker.observe(101.0, "USD", &entities, now + Duration::minutes(i));
            assert!(!has_kind(&found, HIGH_FREQUENCY), "fired on observation {i}");
        }
        let found = tracker.observe(101.0, "USD", &entities, now + Duration::minutes(5));
        assert!(has_kind(&found, HIGH_FREQUENCY));
    }

    #[test]
    fn daily_velocity_sums_amounts() {
        let mut tracker = tracker();
        let entities = entity("Acme Corp");
        let now = fixed_now();

        let found = tracker.observe(60_001.0, "USD", &entities, now);
        assert!(!has_kind(&found, HIGH_VELOCITY));
        let found = tracker.observe(60_001.0, "USD", &entities, now + Duration::hours(1));
        assert!(has_kind(&found, HIGH_VELOCITY));
    }

    #[test]
    fn first_observation_is_new_entity() {
        let mut tracker = tracker();
        let found = tracker.observe(101.0, "USD", &entity("Acme Corp"), fixed_now());
        assert!(has_kind(&found, NEW_ENTITY));
    }

    #[test]
    fn entity_stops_being_new_after_window() {
        let mut tracker = tracker();
        let entities = entity("Acme Corp");
        let now = fixed_now();

        tracker.observe(101.0, "USD", &entities, now);
        let found = tracker.observe(101.0, "USD", &entities, now + Duration::days(30));
        assert!(!has_kind(&found, NEW_ENTITY));
    }

    #[test]
    fn old_activity_excluded_from_frequency_and_velocity() {
        let mut tracker = tracker();
        let entities = entity("Acme Corp");
        let now = fixed_now();

        // Heavy activity well past the threshold, all on one day.
        for i in 0..10 {
            tracker.observe(60_001.0, "USD", &entities, now + Duration::minutes(i));
        }
        // 40 days later the window is empty again.
        let found = tracker.observe(101.0, "USD", &entities, now + Duration::days(40));
        assert!(!has_kind(&found, HIGH_FREQUENCY));
        assert!(!has_kind(&found, HIGH_VELOCITY));
    }

    #[test]
    fn transaction_level_rules_included() {
        let mut tracker = tracker();
        let found = tracker.observe(2_000_000.0, "USD", &entity("Acme Corp"), fixed_now());
        assert!(has_kind(&found, super::super::LARGE_TRANSACTION));
        assert!(has_kind(&found, super::super::ROUND_AMOUNT));
    }

    #[test]
    fn eviction_forgets_entities_at_capacity() {
        let mut tracker = HistoryTracker::new(AnomalyThresholds::default(), 2);
        let now = fixed_now();

        tracker.observe(101.0, "USD", &entity("Alpha Corp"), now);
        tracker.observe(101.0, "USD", &entity("Beta Corp"), now);
        tracker.observe(101.0, "USD", &entity("Gamma Corp"), now);
        assert_eq!(tracker.tracked_entities(), 2);

        // Alpha was evicted; it registers as new again later.
        let later = now + Duration::days(60);
        let found = tracker.observe(101.0, "USD", &entity("Alpha Corp"), later);
        assert!(has_kind(&found, NEW_ENTITY));
    }

    #[test]
    fn zero_capacity_clamped_to_one() {
        let mut tracker = HistoryTracker::new(AnomalyThresholds::default(), 0);
        let found = tracker.observe(101.0, "USD", &entity("Acme Corp"), fixed_now());
        assert!(has_kind(&found, NEW_ENTITY));
        assert_eq!(tracker.tracked_entities(), 1);
    }
}
