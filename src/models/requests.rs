use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to register a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 72))]
    pub password: String,
}

/// Request to log in with email and password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request to save the caller's housing preferences
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePreferencesRequest {
    #[serde(default)]
    #[validate(length(max = 50))]
    pub locations: Vec<String>,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    #[validate(range(max = 100))]
    pub bedrooms: u32,
    #[serde(default, alias = "min_area_sqft")]
    #[validate(range(min = 0.0))]
    pub property_size: f64,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub amenities: Vec<String>,
}

/// Request to book a property
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1))]
    pub property_id: i64,
    /// `YYYY-MM-DD`
    #[validate(length(equal = 10))]
    pub booking_date: String,
    #[serde(default)]
    pub booking_time: String,
    /// `YYYY-MM-DD`
    #[validate(length(equal = 10))]
    pub checkout_date: String,
    #[serde(default)]
    pub checkout_time: String,
}
