// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{User, PreferenceProfile, PropertyRecord, Booking, NewBooking, Recommendation};
pub use requests::{RegisterRequest, LoginRequest, SavePreferencesRequest, CreateBookingRequest};
pub use responses::{RecommendationsResponse, PropertiesResponse, AuthResponse, BookingCreatedResponse, BookingsResponse, HealthResponse, ErrorResponse};
