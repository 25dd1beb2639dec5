// Unit tests for the ranking contract, parser and reconciler

use smart_prop::core::{
    parse_identifiers, reconcile, serialize_identifiers, RankingContract, StayRange,
};
use smart_prop::models::{PreferenceProfile, PropertyRecord};

fn create_property(id: i64) -> PropertyRecord {
    PropertyRecord {
        id,
        title: format!("Property {}", id),
        description: String::new(),
        property_type: "house".to_string(),
        address: format!("{} Borrowdale Rd", id),
        city: "Harare".to_string(),
        price: 1000.0 + id as f64,
        currency: "USD".to_string(),
        price_period: "month".to_string(),
        bedrooms: 3,
        bathrooms: 2,
        area_sqft: 1400.0,
        amenities: vec!["garden".to_string()],
        source_website: "test".to_string(),
        source_url: String::new(),
        external_id: String::new(),
        image_urls: vec![],
        created_at: None,
        updated_at: None,
        last_scraped_at: None,
    }
}

/// Small deterministic generator so the invariant checks cover many shapes
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}

#[test]
fn test_reconcile_bounded_and_ordered() {
    let mut rng = Lcg(7);

    for _ in 0..200 {
        let inventory: Vec<PropertyRecord> = (0..rng.below(15))
            .map(|_| create_property(rng.below(30) as i64 + 1))
            .collect();
        let ranked: Vec<u64> = (0..rng.below(20)).map(|_| rng.below(35)).collect();
        let inventory_len = inventory.len();

        let result = reconcile(&ranked, inventory);

        assert!(result.properties.len() <= ranked.len().min(inventory_len));

        // Output ids appear in ranked order
        let mut cursor = 0;
        for property in &result.properties {
            let id = property.id as u64;
            let pos = ranked[cursor..]
                .iter()
                .position(|r| *r == id)
                .expect("output id must come from the ranked list");
            cursor += pos + 1;
        }
    }
}

#[test]
fn test_parse_returns_exact_integers() {
    let mut rng = Lcg(11);

    for _ in 0..200 {
        let ids: Vec<u64> = (0..rng.below(12)).map(|_| rng.next()).collect();

        let mut text = String::new();
        for id in &ids {
            for _ in 0..rng.below(3) {
                text.push('\n');
            }
            text.push_str(&format!("  {}  \n", id));
        }

        let parsed = parse_identifiers(&text).unwrap();
        assert_eq!(parsed, ids);
        assert_eq!(parse_identifiers(&serialize_identifiers(&parsed)).unwrap(), parsed);
    }
}

#[test]
fn test_parse_rejects_any_non_numeric_line() {
    let base = ["4", "8", "15", "16"];

    for bad_at in 0..=base.len() {
        let mut lines: Vec<&str> = base.to_vec();
        lines.insert(bad_at, "sixteen");
        let text = lines.join("\n");

        let err = parse_identifiers(&text).unwrap_err();
        assert_eq!(err.line, bad_at + 1);
    }
}

#[test]
fn test_contract_prompt_and_parser_agree() {
    let contract = RankingContract::new(3);
    let preferences = PreferenceProfile {
        user_id: 1,
        locations: vec!["Mount Pleasant".to_string()],
        budget: "1200".to_string(),
        bedrooms: 3,
        min_area_sqft: 1000.0,
        amenities: vec!["garden".to_string()],
    };
    let inventory: Vec<PropertyRecord> = (1..=4).map(create_property).collect();

    let prompt = contract.compose(&preferences, &inventory);

    // The prompt's own example must be accepted by the parser
    let example = prompt
        .split("Example:\n")
        .nth(1)
        .expect("prompt contains an example");
    assert_eq!(contract.parse(example).unwrap(), vec![23, 45, 67]);

    // A response in the documented bracket form reconciles cleanly
    let ranked = contract.parse("[4, 1]").unwrap();
    let result = reconcile(&ranked, inventory);
    let ids: Vec<i64> = result.properties.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 1]);
}

#[test]
fn test_stay_range_overlap_is_symmetric() {
    let a = StayRange::parse("2025-05-01", "2025-05-05").unwrap();
    let b = StayRange::parse("2025-05-04", "2025-05-08").unwrap();
    let c = StayRange::parse("2025-05-05", "2025-05-06").unwrap();

    assert!(a.overlaps(&b) && b.overlaps(&a));
    assert!(!a.overlaps(&c) && !c.overlaps(&a));
    assert!(b.overlaps(&c) && c.overlaps(&b));
}
