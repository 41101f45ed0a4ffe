use crate::models::{CognitiveProfile, MatchResult, TutorCandidate};
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Two-tier match result cache keyed by request fingerprint.
///
/// L1 is an in-process `moka` cache with the configured TTL; L2 is an
/// optional shared Redis store written with the same TTL via SETEX. The
/// cache runs L1-only when no Redis connection is configured. Inserts are
/// whole-entry, so a reader never observes a partially written result set.
pub struct ResultCache {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl ResultCache {
    /// Create an L1-only cache.
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    /// Create a cache backed by Redis in addition to the in-process tier.
    pub async fn with_redis(
        redis_url: &str,
        l1_size: u64,
        ttl_secs: u64,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let mut cache = Self::in_memory(l1_size, ttl_secs);
        cache.redis = Some(Arc::new(tokio::sync::Mutex::new(redis)));
        Ok(cache)
    }

    /// Look up a cached result set. Expired entries and L2 errors are
    /// treated as a miss.
    pub async fn get(&self, fingerprint: &str) -> Option<Vec<MatchResult>> {
        let key = Self::key(fingerprint);

        if let Some(bytes) = self.l1_cache.get(&key).await {
            match serde_json::from_slice(&bytes) {
                Ok(results) => {
                    tracing::trace!("L1 cache hit: {}", key);
                    return Some(results);
                }
                Err(e) => {
                    tracing::warn!("Discarding undecodable L1 entry {}: {}", key, e);
                    self.l1_cache.invalidate(&key).await;
                }
            }
        }

        let redis = self.redis.as_ref()?;
        let mut conn = redis.lock().await;
        let value: Option<String> = match redis::cmd("GET").arg(&key).query_async(&mut *conn).await
        {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Redis read failed for {}: {}", key, e);
                return None;
            }
        };
        drop(conn);

        let json = value?;
        match serde_json::from_str::<Vec<MatchResult>>(&json) {
            Ok(results) => {
                tracing::trace!("L2 cache hit: {}", key);
                // Populate L1 for subsequent lookups
                self.l1_cache.insert(key, json.into_bytes()).await;
                Some(results)
            }
            Err(e) => {
                tracing::warn!("Discarding undecodable L2 entry {}: {}", key, e);
                None
            }
        }
    }

    /// Store a result set in both tiers.
    pub async fn put(&self, fingerprint: &str, results: &[MatchResult]) -> Result<(), CacheError> {
        let key = Self::key(fingerprint);
        let json = serde_json::to_string(results)?;

        self.l1_cache
            .insert(key.clone(), json.as_bytes().to_vec())
            .await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(&key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    #[inline]
    fn key(fingerprint: &str) -> String {
        format!("match:{fingerprint}")
    }
}

/// Deterministic request fingerprint.
///
/// A pure function of the learner identity, the cognitive parameters, and
/// the full identity and content of the candidate pool, so any change to
/// pool membership, tutor content, or assessment values produces a new
/// fingerprint and the stale entry is simply never looked up again.
pub struct Fingerprint;

impl Fingerprint {
    pub fn compute(
        learner_id: &str,
        cognitive: &CognitiveProfile,
        pool: &[TutorCandidate],
    ) -> String {
        let mut hasher = Sha256::new();

        hasher.update(learner_id.as_bytes());
        hasher.update([0u8]);

        for value in cognitive.parameter_values() {
            hasher.update(value.to_bits().to_be_bytes());
        }

        let mut tutors: Vec<&TutorCandidate> = pool.iter().collect();
        tutors.sort_by(|a, b| a.id.cmp(&b.id));

        for tutor in tutors {
            hasher.update(tutor.id.as_bytes());
            hasher.update([0u8]);
            hasher.update(tutor.price.to_bits().to_be_bytes());
            for subject in &tutor.subjects {
                hasher.update(subject.as_bytes());
                hasher.update([1u8]);
            }
            hasher.update(tutor.pedagogy.summary().as_bytes());
            hasher.update([0u8]);
        }

        hex::encode(hasher.finalize())[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PedagogyProfile, Support};

    fn cognitive() -> CognitiveProfile {
        CognitiveProfile {
            confidence: 20.0,
            anxiety: 80.0,
            processing_speed: 35.0,
            working_memory: 45.0,
            precision: 55.0,
            error_correction: 60.0,
            exploration: 75.0,
            impulsivity: 30.0,
            logical_reasoning: 65.0,
            hypothetical_reasoning: 70.0,
        }
    }

    fn tutor(id: &str, price: f64) -> TutorCandidate {
        TutorCandidate {
            id: id.to_string(),
            name: format!("Tutor {id}"),
            price,
            subjects: vec!["Mathematics".to_string()],
            pedagogy: PedagogyProfile {
                tcs: Support::High,
                tspi: Support::High,
                twmls: Support::High,
                tpo: Support::High,
                tecp: Support::High,
                tet: Support::Low,
                tics: Support::High,
                trd: Support::Low,
            },
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let pool = vec![tutor("a", 500.0), tutor("b", 600.0)];
        let first = Fingerprint::compute("learner-1", &cognitive(), &pool);
        let second = Fingerprint::compute("learner-1", &cognitive(), &pool);
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_fingerprint_ignores_pool_order() {
        let forward = vec![tutor("a", 500.0), tutor("b", 600.0)];
        let reversed = vec![tutor("b", 600.0), tutor("a", 500.0)];

        assert_eq!(
            Fingerprint::compute("learner-1", &cognitive(), &forward),
            Fingerprint::compute("learner-1", &cognitive(), &reversed)
        );
    }

    #[test]
    fn test_fingerprint_sensitive_to_learner() {
        let pool = vec![tutor("a", 500.0)];
        assert_ne!(
            Fingerprint::compute("learner-1", &cognitive(), &pool),
            Fingerprint::compute("learner-2", &cognitive(), &pool)
        );
    }

    #[test]
    fn test_fingerprint_sensitive_to_tutor_identity_and_content() {
        let base = vec![tutor("a", 500.0)];
        let renamed = vec![tutor("b", 500.0)];
        let repriced = vec![tutor("a", 550.0)];

        let fp = Fingerprint::compute("learner-1", &cognitive(), &base);
        assert_ne!(fp, Fingerprint::compute("learner-1", &cognitive(), &renamed));
        assert_ne!(fp, Fingerprint::compute("learner-1", &cognitive(), &repriced));
    }

    #[test]
    fn test_fingerprint_sensitive_to_cognitive_params() {
        let pool = vec![tutor("a", 500.0)];
        let mut changed = cognitive();
        changed.working_memory += 1.0;

        assert_ne!(
            Fingerprint::compute("learner-1", &cognitive(), &pool),
            Fingerprint::compute("learner-1", &changed, &pool)
        );
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let cache = ResultCache::in_memory(100, 60);
        let results = vec![MatchResult {
            tutor_id: "a".to_string(),
            name: "Tutor a".to_string(),
            price: 500.0,
            compatibility_score: 92.5,
            cognitive_match_count: 7,
            subject_overlap_ratio: 1.0,
            reasoning: "Cognitive compatibility 7/8".to_string(),
            subject_explanation: "Covers all requested subjects: Math".to_string(),
        }];

        assert!(cache.get("fp1").await.is_none());
        cache.put("fp1", &results).await.unwrap();

        let cached = cache.get("fp1").await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].tutor_id, "a");
        assert_eq!(cached[0].compatibility_score, 92.5);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = ResultCache::in_memory(100, 1);
        cache.put("fp1", &[]).await.unwrap();
        assert!(cache.get("fp1").await.is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(cache.get("fp1").await.is_none());
    }
}
