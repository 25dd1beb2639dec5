use crate::core::parser::{parse_identifiers, MalformedIdentifierError};
use crate::models::{PreferenceProfile, PropertyRecord};
use serde_json::{json, Value};
use std::fmt::Write;

/// Prompt template and response grammar for the external ranking service
///
/// The instructions produced by [`RankingContract::compose`] and the grammar
/// accepted by [`RankingContract::parse`] change together. Bump
/// [`RankingContract::VERSION`] whenever either side changes.
#[derive(Debug, Clone)]
pub struct RankingContract {
    max_results: usize,
}

impl RankingContract {
    pub const VERSION: &'static str = "ranked-ids/v1";

    /// Sample response embedded in the prompt
    pub const EXAMPLE_RESPONSE: &'static str = "23\n45\n67\n";

    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.max(1),
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Build the ranking prompt for one user and one inventory snapshot
    ///
    /// Pure and deterministic: JSON objects are emitted with sorted keys and
    /// the inventory is ordered by id, so identical inputs yield identical text.
    pub fn compose(&self, preferences: &PreferenceProfile, inventory: &[PropertyRecord]) -> String {
        let mut sorted: Vec<&PropertyRecord> = inventory.iter().collect();
        sorted.sort_by_key(|p| p.id);

        let properties = Value::Array(sorted.into_iter().map(property_view).collect());

        let mut prompt = String::with_capacity(1024 + inventory.len() * 256);

        // Writing into a String cannot fail
        let _ = writeln!(prompt, "Ranking contract: {}", Self::VERSION);
        let _ = writeln!(
            prompt,
            "Task: From the available properties below, choose up to {} properties that best fit the user's preferences, best match first.",
            self.max_results
        );
        prompt.push_str("Criteria:\n");
        prompt.push_str("- Property area must be equal to or greater than the user's minimum area (min_area_sqft)\n");
        prompt.push_str("- Location must match the cities or types of areas listed in the user's locations\n");
        prompt.push_str("- Amenities should closely match or be similar to the user's preferred amenities\n");
        prompt.push_str("- Prefer properties with at least the requested bedrooms and a price within the budget\n\n");

        prompt.push_str("---User Preferences---\n");
        prompt.push_str(&preference_view(preferences).to_string());
        prompt.push_str("\n\n");

        prompt.push_str("---Available Properties---\n");
        prompt.push_str(&properties.to_string());
        prompt.push_str("\n\n");

        prompt.push_str("RESPONSE FORMAT (MANDATORY): Return ONLY the ids of the chosen properties, one id per line, best match first. ");
        prompt.push_str("Do not include explanations, numbering, bullet points, code fences or any other text.\n");
        prompt.push_str("Example:\n");
        prompt.push_str(Self::EXAMPLE_RESPONSE);

        prompt
    }

    /// Decode a ranking response under this contract's grammar
    pub fn parse(&self, response: &str) -> Result<Vec<u64>, MalformedIdentifierError> {
        parse_identifiers(response)
    }
}

impl Default for RankingContract {
    fn default() -> Self {
        Self::new(10)
    }
}

fn preference_view(preferences: &PreferenceProfile) -> Value {
    json!({
        "amenities": preferences.amenities,
        "bedrooms": preferences.bedrooms,
        "budget": preferences.budget,
        "locations": preferences.locations,
        "min_area_sqft": preferences.min_area_sqft,
    })
}

fn property_view(property: &PropertyRecord) -> Value {
    json!({
        "address": property.address,
        "amenities": property.amenities,
        "area_sqft": property.area_sqft,
        "bathrooms": property.bathrooms,
        "bedrooms": property.bedrooms,
        "city": property.city,
        "currency": property.currency,
        "description": property.description,
        "id": property.id,
        "price": property.price,
        "price_period": property.price_period,
        "property_type": property.property_type,
        "title": property.title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferences() -> PreferenceProfile {
        PreferenceProfile {
            user_id: 7,
            locations: vec!["Borrowdale".to_string(), "suburban".to_string()],
            budget: "1000-1500".to_string(),
            bedrooms: 3,
            min_area_sqft: 1200.0,
            amenities: vec!["pool".to_string(), "garden".to_string()],
        }
    }

    fn property(id: i64, title: &str) -> PropertyRecord {
        PropertyRecord {
            id,
            title: title.to_string(),
            description: "Quiet street".to_string(),
            property_type: "house".to_string(),
            address: format!("{} Main St", id),
            city: "Harare".to_string(),
            price: 1200.0,
            currency: "USD".to_string(),
            price_period: "month".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            area_sqft: 1500.0,
            amenities: vec!["pool".to_string()],
            source_website: "listings".to_string(),
            source_url: "https://example.test/1".to_string(),
            external_id: "ext-1".to_string(),
            image_urls: vec![],
            created_at: None,
            updated_at: None,
            last_scraped_at: None,
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let contract = RankingContract::default();
        let forward = vec![property(1, "A"), property(2, "B")];
        let reversed = vec![property(2, "B"), property(1, "A")];

        let first = contract.compose(&preferences(), &forward);
        let second = contract.compose(&preferences(), &reversed);

        assert_eq!(first, second);
    }

    #[test]
    fn test_compose_embeds_both_datasets() {
        let prompt = RankingContract::default().compose(&preferences(), &[property(31, "Garden Cottage")]);

        assert!(prompt.contains("\"min_area_sqft\":1200.0"));
        assert!(prompt.contains("Borrowdale"));
        assert!(prompt.contains("\"id\":31"));
        assert!(prompt.contains("Garden Cottage"));
    }

    #[test]
    fn test_compose_states_contract() {
        let prompt = RankingContract::new(5).compose(&preferences(), &[]);

        assert!(prompt.contains(RankingContract::VERSION));
        assert!(prompt.contains("up to 5 properties"));
        assert!(prompt.contains("one id per line"));
        assert!(prompt.ends_with(RankingContract::EXAMPLE_RESPONSE));
    }

    #[test]
    fn test_compose_omits_provenance_noise() {
        let prompt = RankingContract::default().compose(&preferences(), &[property(1, "A")]);

        assert!(!prompt.contains("https://example.test/1"));
        assert!(!prompt.contains("ext-1"));
        assert!(!prompt.contains("\"user_id\""));
    }

    #[test]
    fn test_example_response_satisfies_parser() {
        let contract = RankingContract::default();
        assert_eq!(contract.parse(RankingContract::EXAMPLE_RESPONSE).unwrap(), vec![23, 45, 67]);
    }

    #[test]
    fn test_max_results_floor() {
        assert_eq!(RankingContract::new(0).max_results(), 1);
    }
}
