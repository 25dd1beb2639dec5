use super::{auth::AuthenticatedUser, ApiError, AppState};
use crate::models::{PreferenceProfile, PropertiesResponse, RecommendationsResponse, SavePreferencesRequest};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure preference and property routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/preferences", web::put().to(save_preferences))
        .route("/preferences", web::get().to(get_preferences))
        .route("/properties", web::get().to(list_properties))
        .route("/properties/recommended", web::get().to(recommended_properties));
}

/// Save preferences endpoint
///
/// PUT /api/v1/preferences
///
/// Request body:
/// ```json
/// {
///   "locations": ["string"],
///   "budget": "string",
///   "bedrooms": 2,
///   "property_size": 900.0,
///   "amenities": ["string"]
/// }
/// ```
async fn save_preferences(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<SavePreferencesRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let req = req.into_inner();
    let profile = PreferenceProfile {
        user_id: user.user_id(),
        locations: clean_list(req.locations),
        budget: req.budget.trim().to_string(),
        bedrooms: req.bedrooms,
        min_area_sqft: req.property_size,
        amenities: clean_list(req.amenities),
    };

    state.store.save_preferences(&profile).await?;

    tracing::info!("Saved preferences for user {}", profile.user_id);

    Ok(HttpResponse::Ok().json(profile))
}

/// Get the caller's saved preferences
async fn get_preferences(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let profile = state.store.get_preferences(user.user_id()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Unranked inventory
async fn list_properties(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let properties = state.store.list_properties().await?;

    Ok(HttpResponse::Ok().json(PropertiesResponse {
        count: properties.len(),
        properties,
    }))
}

/// Recommended properties endpoint
///
/// GET /api/v1/properties/recommended
///
/// Ranks the full inventory against the caller's saved preferences.
async fn recommended_properties(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let user_id = user.user_id();

    tracing::info!("Finding recommendations for user: {}", user_id);

    let recommendation = state.recommender.recommend(user_id).await.map_err(|e| {
        tracing::warn!(
            "Recommendation failed for user {} at {} stage (retryable: {}): {}",
            user_id,
            e.stage(),
            e.is_retryable(),
            e
        );
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(RecommendationsResponse {
        total_results: recommendation.properties.len(),
        inventory_size: recommendation.inventory_size,
        properties: recommendation.properties,
    }))
}

/// Trim entries and drop blanks and repeats, keeping first-seen order
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !cleaned.iter().any(|seen| seen.eq_ignore_ascii_case(item)) {
            cleaned.push(item.to_string());
        }
    }
    cleaned
}
