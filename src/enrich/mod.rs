pub mod registry;

use std::num::NonZeroUsize;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::core::Entity;
use crate::synth;
use self::registry::{RegistryClient, RegistryRecord};

/// Resolves an entity name to a full profile, memoized per name.
///
/// The primary path is the synthetic generator; when a registry client is
/// configured its data is merged in additively first. Network misses and
/// faults degrade to the synthetic path — enrichment never fails a request.
pub struct Enricher {
    cache: Mutex<LruCache<String, Entity>>,
    registry: Option<RegistryClient>,
}

impl Enricher {
    pub fn new(cache_capacity: usize, registry: Option<RegistryClient>) -> Self {
        let capacity = NonZeroUsize::new(cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            registry,
        }
    }

    /// Idempotent per name: the first call builds and caches the profile,
    /// later calls return the cached copy unchanged.
    pub async fn enrich(&self, name: &str, now: DateTime<Utc>) -> Entity {
        if let Some(hit) = self.cache.lock().unwrap().get(name) {
            return hit.clone();
        }

        let entity = self.build(name, now).await;
        self.cache.lock().unwrap().put(name.to_string(), entity.clone());
        entity
    }

    /// Like `enrich`, but a registry-mode lookup miss surfaces as `None`
    /// so the API layer can answer "not found".
    pub async fn detail(&self, name: &str, now: DateTime<Utc>) -> Option<Entity> {
        if let Some(hit) = self.cache.lock().unwrap().get(name) {
            return Some(hit.clone());
        }

        if let Some(registry) = &self.registry {
            match registry.lookup(name).await {
                Ok(Some(_)) => {}
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!("registry lookup failed for {name}: {e}");
                    return None;
                }
            }
        }

        Some(self.enrich(name, now).await)
    }

    /// Number of cached entity profiles.
    #[allow(dead_code)]
    pub fn cached_entities(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    async fn build(&self, name: &str, now: DateTime<Utc>) -> Entity {
        let mut entity = synth::generate_entity(name, now, &mut rand::thread_rng());

        if let Some(registry) = &self.registry {
            let mut augmented = false;

            match registry.lookup(name).await {
                Ok(Some(record)) => {
                    merge_registry(&mut entity, record);
                    augmented = true;
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("LEI lookup failed for {name}: {e}"),
            }

            match registry.check_sanctions(name).await {
                Ok(true) => {
                    entity.sanctions_status = true;
                    entity.evidence_sources.push("Sanctions List".to_string());
                    augmented = true;
                }
                Ok(false) => {}
                Err(e) => tracing::debug!("sanctions check failed for {name}: {e}"),
            }

            if augmented {
                entity.confidence_score = updated_confidence(&entity);
            }
        }

        entity
    }
}

/// Additive merge: registry data only fills fields nothing has set yet,
/// and its source tag is appended to the evidence trail.
fn merge_registry(entity: &mut Entity, record: RegistryRecord) {
    if entity.registration_number.is_none() {
        entity.registration_number = record.registration_number;
    }
    if entity.jurisdiction.is_none() {
        entity.jurisdiction = record.jurisdiction;
    }
    entity.evidence_sources.push(record.source);
}

/// Confidence grows with the evidence trail and the completeness of the
/// profile, capped at 1.0.
fn updated_confidence(entity: &Entity) -> f64 {
    let mut score = entity.confidence_score + entity.evidence_sources.len() as f64 * 0.1;

    if entity.registration_number.is_some() {
        score += 0.1;
    }
    if entity.jurisdiction.is_some() {
        score += 0.1;
    }
    if entity.incorporation_date.is_some() {
        score += 0.1;
    }
    if entity.directors.as_ref().is_some_and(|d| !d.is_empty()) {
        score += 0.1;
    }
    if entity.shareholders.as_ref().is_some_and(|s| !s.is_empty()) {
        score += 0.1;
    }

    score.min(1.0)
}
