//! Booking lifecycle endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use persistence::repositories::BookingRepository;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{
    BookingActionRequest, BookingResponse, CreateBookingRequest, UserBookingItem,
};

/// Create a reservation.
///
/// POST /api/v1/reserve
pub async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    request.validate()?;
    let booking = state.booking.create(&request).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Check in to a scheduled booking inside its grace window.
///
/// POST /api/v1/check-in
pub async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<BookingActionRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    request.validate()?;
    let booking = state
        .booking
        .check_in(request.booking_id, &request.user_name)
        .await?;
    Ok(Json(booking.into()))
}

/// Complete a checked-in booking early.
///
/// POST /api/v1/check-out
pub async fn check_out(
    State(state): State<AppState>,
    Json(request): Json<BookingActionRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    request.validate()?;
    let booking = state
        .booking
        .check_out(request.booking_id, &request.user_name)
        .await?;
    Ok(Json(booking.into()))
}

/// Release a scheduled booking.
///
/// POST /api/v1/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Json(request): Json<BookingActionRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    request.validate()?;
    let booking = state
        .booking
        .cancel(request.booking_id, &request.user_name)
        .await?;
    Ok(Json(booking.into()))
}

/// All bookings of one user, newest first.
///
/// GET /api/v1/bookings/user/:userName
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<UserBookingItem>>, ApiError> {
    if user_name.trim().is_empty() {
        return Err(ApiError::Validation("userName must not be empty".into()));
    }
    let repo = BookingRepository::new(state.pool.clone());
    let bookings = repo.list_for_user(&user_name).await?;
    Ok(Json(
        bookings
            .into_iter()
            .map(|entity| UserBookingItem {
                id: entity.id,
                facility_id: entity.facility_id,
                facility_name: entity.facility_name,
                facility_category: entity.facility_category,
                unit_id: entity.unit_id,
                unit_name: entity.unit_name,
                booking_type: entity.booking_type.into(),
                starts_at: entity.starts_at,
                ends_at: entity.ends_at,
                status: entity.status.into(),
                created_at: entity.created_at,
            })
            .collect(),
    ))
}
