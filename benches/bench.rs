// Criterion benchmarks for the recommendation pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smart_prop::core::{parse_identifiers, reconcile, serialize_identifiers, RankingContract};
use smart_prop::models::{PreferenceProfile, PropertyRecord};

fn create_property(id: i64) -> PropertyRecord {
    PropertyRecord {
        id,
        title: format!("Property {}", id),
        description: "Two bedroom apartment close to shops".to_string(),
        property_type: "apartment".to_string(),
        address: format!("{} Second St", id),
        city: if id % 2 == 0 { "Harare" } else { "Bulawayo" }.to_string(),
        price: 400.0 + (id % 50) as f64 * 10.0,
        currency: "USD".to_string(),
        price_period: "month".to_string(),
        bedrooms: 1 + (id % 4) as u32,
        bathrooms: 1,
        area_sqft: 600.0 + (id % 20) as f64 * 50.0,
        amenities: vec!["parking".to_string(), "borehole".to_string()],
        source_website: "bench".to_string(),
        source_url: String::new(),
        external_id: String::new(),
        image_urls: vec![],
        created_at: None,
        updated_at: None,
        last_scraped_at: None,
    }
}

fn create_preferences() -> PreferenceProfile {
    PreferenceProfile {
        user_id: 1,
        locations: vec!["Harare".to_string(), "suburban".to_string()],
        budget: "800".to_string(),
        bedrooms: 2,
        min_area_sqft: 900.0,
        amenities: vec!["parking".to_string()],
    }
}

fn bench_parse(c: &mut Criterion) {
    let ids: Vec<u64> = (0..100).map(|i| i * 37 % 1000).collect();
    let text = serialize_identifiers(&ids);

    c.bench_function("parse_identifiers_100", |b| {
        b.iter(|| parse_identifiers(black_box(&text)))
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [100, 1000, 10000].iter() {
        let inventory: Vec<PropertyRecord> = (1..=*size as i64).map(create_property).collect();
        let ranked: Vec<u64> = (0..10).map(|i| (i * 97 % *size) as u64 + 1).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| reconcile(black_box(&ranked), inventory.clone()))
        });
    }

    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let contract = RankingContract::default();
    let preferences = create_preferences();
    let inventory: Vec<PropertyRecord> = (1..=500).map(create_property).collect();

    c.bench_function("compose_prompt_500", |b| {
        b.iter(|| contract.compose(black_box(&preferences), black_box(&inventory)))
    });
}

criterion_group!(benches, bench_parse, bench_reconcile, bench_compose);
criterion_main!(benches);
