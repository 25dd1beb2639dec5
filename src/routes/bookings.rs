use super::{auth::AuthenticatedUser, ApiError, AppState};
use crate::core::StayRange;
use crate::models::{BookingCreatedResponse, BookingsResponse, CreateBookingRequest, NewBooking};
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/bookings", web::post().to(create_booking))
        .route("/bookings", web::get().to(list_bookings));
}

/// Create booking endpoint
///
/// POST /api/v1/bookings
///
/// Request body:
/// ```json
/// {
///   "property_id": 1,
///   "booking_date": "2025-03-01",
///   "booking_time": "14:00",
///   "checkout_date": "2025-03-04",
///   "checkout_time": "10:00"
/// }
/// ```
async fn create_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let stay = StayRange::parse(&req.booking_date, &req.checkout_date)?;
    let req = req.into_inner();

    let booking = NewBooking {
        property_id: req.property_id,
        user_id: user.user_id(),
        booking_date: stay.booking_date,
        booking_time: req.booking_time.trim().to_string(),
        checkout_date: stay.checkout_date,
        checkout_time: req.checkout_time.trim().to_string(),
    };

    let created = state.store.create_booking(&booking).await.map_err(|e| {
        tracing::info!(
            "Booking rejected for user {} on property {}: {}",
            booking.user_id,
            booking.property_id,
            e
        );
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Created().json(BookingCreatedResponse {
        success: true,
        booking_id: created.id,
    }))
}

/// List the caller's bookings, most recent stay first
async fn list_bookings(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let bookings = state.store.list_bookings(user.user_id()).await?;

    Ok(HttpResponse::Ok().json(BookingsResponse {
        count: bookings.len(),
        bookings,
    }))
}
