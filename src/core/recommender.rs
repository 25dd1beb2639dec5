use crate::core::{
    fetch::{fetch_both, FetchStage},
    parser::MalformedIdentifierError,
    prompt::RankingContract,
    reconcile::InventoryIndex,
};
use crate::models::{PreferenceProfile, PropertyRecord, Recommendation};
use crate::services::{RankingError, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Read access to the property inventory and user preferences
#[async_trait]
pub trait PropertyReader: Send + Sync {
    async fn fetch_all_properties(&self) -> Result<Vec<PropertyRecord>, StoreError>;

    async fn fetch_preferences(&self, user_id: i64) -> Result<PreferenceProfile, StoreError>;
}

/// External service that ranks properties from a text prompt
#[async_trait]
pub trait Ranker: Send + Sync {
    async fn rank(&self, prompt: &str) -> Result<String, RankingError>;
}

/// Recommendation failure, tagged with the stage it came from
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("{stage} fetch failed: {source}")]
    DependencyFetch {
        stage: FetchStage,
        #[source]
        source: StoreError,
    },

    #[error("Ranking call failed: {0}")]
    RankingCall(#[source] RankingError),

    #[error("Ranking response violated the output contract: {0}")]
    MalformedIdentifier(#[from] MalformedIdentifierError),
}

impl RecommendError {
    /// Short tag naming the failed stage
    pub fn stage(&self) -> &'static str {
        match self {
            RecommendError::DependencyFetch { .. } => "fetch",
            RecommendError::RankingCall(_) => "ranking",
            RecommendError::MalformedIdentifier(_) => "parse",
        }
    }

    /// Whether the same request may succeed if repeated
    ///
    /// Contract violations are not retryable: the same prompt is likely to
    /// produce the same malformed output.
    pub fn is_retryable(&self) -> bool {
        match self {
            RecommendError::DependencyFetch { source, .. } => source.is_transient(),
            RecommendError::RankingCall(source) => source.is_transient(),
            RecommendError::MalformedIdentifier(_) => false,
        }
    }
}

/// Recommendation orchestrator
///
/// # Pipeline Stages
/// 1. Concurrent fetch of inventory and preferences
/// 2. Prompt composition
/// 3. External ranking call under a timeout
/// 4. Identifier parsing
/// 5. Reconciliation against the inventory snapshot
#[derive(Clone)]
pub struct Recommender {
    reader: Arc<dyn PropertyReader>,
    ranker: Arc<dyn Ranker>,
    contract: RankingContract,
    timeout: Duration,
}

impl Recommender {
    pub fn new(
        reader: Arc<dyn PropertyReader>,
        ranker: Arc<dyn Ranker>,
        contract: RankingContract,
        timeout: Duration,
    ) -> Self {
        Self {
            reader,
            ranker,
            contract,
            timeout,
        }
    }

    pub fn contract(&self) -> &RankingContract {
        &self.contract
    }

    /// Rank the full inventory for a user
    ///
    /// Any stage failure short-circuits the rest. Ranked ids that are not in
    /// the inventory are dropped, so an empty result is still a success.
    pub async fn recommend(&self, user_id: i64) -> Result<Recommendation, RecommendError> {
        let (inventory, preferences) = fetch_both(
            (FetchStage::Inventory, self.reader.fetch_all_properties()),
            (FetchStage::Preferences, self.reader.fetch_preferences(user_id)),
        )
        .await
        .map_err(|errors| {
            for failure in errors.iter() {
                tracing::warn!("Recommendation for user {}: {}", user_id, failure);
            }
            let first = errors.into_first();
            RecommendError::DependencyFetch {
                stage: first.stage,
                source: first.source,
            }
        })?;

        let inventory_size = inventory.len();
        let prompt = self.contract.compose(&preferences, &inventory);

        tracing::debug!(
            "Composed ranking prompt for user {} ({} properties, {} bytes)",
            user_id,
            inventory_size,
            prompt.len()
        );

        let response = tokio::time::timeout(self.timeout, self.ranker.rank(&prompt))
            .await
            .map_err(|_| RankingError::Timeout(self.timeout))
            .and_then(|result| result)
            .map_err(|e| {
                tracing::warn!("Ranking call failed for user {}: {}", user_id, e);
                RecommendError::RankingCall(e)
            })?;

        let ranked = self.contract.parse(&response).map_err(|e| {
            tracing::error!("Malformed ranking response for user {}: {}", user_id, e);
            RecommendError::MalformedIdentifier(e)
        })?;

        let reconciled = InventoryIndex::new(inventory).reconcile(&ranked);

        if reconciled.properties.is_empty() {
            tracing::info!(
                "No ranked ids matched the inventory for user {} ({} ranked)",
                user_id,
                ranked.len()
            );
        }

        tracing::info!(
            "Recommended {} properties for user {} ({} ranked, {} unmatched, {} in inventory)",
            reconciled.properties.len(),
            user_id,
            ranked.len(),
            reconciled.unmatched.len(),
            inventory_size
        );

        Ok(Recommendation {
            properties: reconciled.properties,
            unmatched_ids: reconciled.unmatched,
            inventory_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedReader;

    #[async_trait]
    impl PropertyReader for FixedReader {
        async fn fetch_all_properties(&self) -> Result<Vec<PropertyRecord>, StoreError> {
            Ok(Vec::new())
        }

        async fn fetch_preferences(&self, user_id: i64) -> Result<PreferenceProfile, StoreError> {
            Ok(PreferenceProfile {
                user_id,
                locations: vec![],
                budget: String::new(),
                bedrooms: 1,
                min_area_sqft: 0.0,
                amenities: vec![],
            })
        }
    }

    struct CountingRanker {
        calls: AtomicUsize,
        reply: String,
    }

    #[async_trait]
    impl Ranker for CountingRanker {
        async fn rank(&self, _prompt: &str) -> Result<String, RankingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_empty_inventory_is_success() {
        let ranker = Arc::new(CountingRanker {
            calls: AtomicUsize::new(0),
            reply: "4\n2\n".to_string(),
        });
        let recommender = Recommender::new(
            Arc::new(FixedReader),
            ranker.clone(),
            RankingContract::default(),
            Duration::from_secs(1),
        );

        let result = recommender.recommend(1).await.unwrap();

        assert!(result.properties.is_empty());
        assert_eq!(result.unmatched_ids, vec![4, 2]);
        assert_eq!(ranker.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_error_classification() {
        let malformed = RecommendError::MalformedIdentifier(MalformedIdentifierError {
            line: 1,
            found: "x".to_string(),
        });
        assert_eq!(malformed.stage(), "parse");
        assert!(!malformed.is_retryable());

        let timeout = RecommendError::RankingCall(RankingError::Timeout(Duration::from_secs(12)));
        assert_eq!(timeout.stage(), "ranking");
        assert!(timeout.is_retryable());

        let unavailable = RecommendError::RankingCall(RankingError::ApiError {
            status: 503,
            body: "unavailable".to_string(),
        });
        assert!(unavailable.is_retryable());

        let bad_key = RecommendError::RankingCall(RankingError::ApiError {
            status: 401,
            body: "unauthorized".to_string(),
        });
        assert_eq!(bad_key.stage(), "ranking");
        assert!(!bad_key.is_retryable());

        let garbled = RecommendError::RankingCall(RankingError::InvalidResponse("not json".to_string()));
        assert!(!garbled.is_retryable());

        let missing = RecommendError::DependencyFetch {
            stage: FetchStage::Preferences,
            source: StoreError::NotFound("prefs".to_string()),
        };
        assert_eq!(missing.stage(), "fetch");
        assert!(!missing.is_retryable());
    }
}
