//! Smart Prop - property rental backend
//!
//! Users save housing preferences, browse and book properties, and receive
//! property recommendations ranked by an external language model. The
//! recommendation pipeline fetches inventory and preferences concurrently,
//! composes a ranking prompt, parses the model's id list and reconciles it
//! against the inventory snapshot.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{parse_identifiers, reconcile, RankingContract, RecommendError, Recommender};
pub use crate::models::{PreferenceProfile, PropertyRecord, Recommendation};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(parse_identifiers("1\n2").unwrap(), vec![1, 2]);
        assert!(reconcile(&[1], Vec::new()).properties.is_empty());
    }
}
