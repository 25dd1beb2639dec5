use serde::{Deserialize, Serialize};

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A user's housing preferences
///
/// One profile per user; saving a new one replaces the previous profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub user_id: i64,
    pub locations: Vec<String>,
    pub budget: String,
    pub bedrooms: u32,
    #[serde(rename = "property_size")]
    pub min_area_sqft: f64,
    pub amenities: Vec<String>,
}

/// A rentable property as stored in the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub price_period: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub source_website: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub external_id: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub last_scraped_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_currency() -> String { "USD".to_string() }

/// A confirmed stay at a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub property_id: i64,
    pub user_id: i64,
    pub booking_date: chrono::NaiveDate,
    pub booking_time: String,
    pub checkout_date: chrono::NaiveDate,
    pub checkout_time: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Booking data before it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub property_id: i64,
    pub user_id: i64,
    pub booking_date: chrono::NaiveDate,
    pub booking_time: String,
    pub checkout_date: chrono::NaiveDate,
    pub checkout_time: String,
}

/// Ordered outcome of a recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub properties: Vec<PropertyRecord>,
    /// Ranked identifiers that matched nothing in the inventory snapshot
    pub unmatched_ids: Vec<u64>,
    pub inventory_size: usize,
}
