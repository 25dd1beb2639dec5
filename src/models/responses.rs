use serde::{Deserialize, Serialize};
use crate::models::domain::{Booking, PropertyRecord};

/// Response for the recommended properties endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub properties: Vec<PropertyRecord>,
    pub total_results: usize,
    pub inventory_size: usize,
}

/// Response for the unranked inventory endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertiesResponse {
    pub properties: Vec<PropertyRecord>,
    pub count: usize,
}

/// Response for register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub token: String,
}

/// Response for booking creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreatedResponse {
    pub success: bool,
    pub booking_id: i64,
}

/// Response listing a user's bookings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
