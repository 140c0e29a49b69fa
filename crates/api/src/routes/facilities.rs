//! Facility unit and schedule endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate};
use persistence::entities::ScheduleRowEntity;
use persistence::repositories::{FacilityUnitRepository, ScheduleRepository};

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{
    FacilityUnit, ScheduleBookingItem, ScheduleQuery, ScheduleResponse, UnitResponse, UnitSchedule,
};

/// All units of a facility.
///
/// GET /api/v1/facilities/:id/units
pub async fn get_units(
    State(state): State<AppState>,
    Path(facility_id): Path<i64>,
) -> Result<Json<Vec<UnitResponse>>, ApiError> {
    let repo = FacilityUnitRepository::new(state.pool.clone());
    let units = repo.list_for_facility(facility_id).await?;
    Ok(Json(
        units
            .into_iter()
            .map(|entity| UnitResponse::from(FacilityUnit::from(entity)))
            .collect(),
    ))
}

/// Day grid of active bookings per operational unit.
///
/// GET /api/v1/facilities/:id/schedule?date=YYYY-MM-DD
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(facility_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let today = state.clock.now().date_naive();
    check_schedule_window(query.date, today, state.config.booking.max_horizon_days)?;

    let day_start = query
        .date
        .and_hms_opt(0, 0, 0)
        .expect("midnight exists")
        .and_utc();
    let day_end = day_start + Duration::days(1);

    let repo = ScheduleRepository::new(state.pool.clone());
    let rows = repo.day_grid(facility_id, day_start, day_end).await?;

    Ok(Json(ScheduleResponse {
        date: query.date,
        units: group_rows(rows),
    }))
}

/// The schedule is only served for dates inside the booking horizon.
fn check_schedule_window(
    date: NaiveDate,
    today: NaiveDate,
    horizon_days: i64,
) -> Result<(), ApiError> {
    let last = today + Duration::days(horizon_days - 1);
    if date < today || date > last {
        return Err(ApiError::Forbidden(format!(
            "Schedule is only available from {} to {}",
            today, last
        )));
    }
    Ok(())
}

/// Fold the ordered unit/booking rows into per-unit groups. Units without
/// bookings arrive as a single row with NULL booking columns.
fn group_rows(rows: Vec<ScheduleRowEntity>) -> Vec<UnitSchedule> {
    let mut units: Vec<UnitSchedule> = Vec::new();
    for row in rows {
        if units.last().map(|u| u.unit_id) != Some(row.unit_id) {
            units.push(UnitSchedule {
                unit_id: row.unit_id,
                unit_name: row.unit_name.clone(),
                bookings: Vec::new(),
            });
        }
        let (Some(id), Some(booked_by), Some(user_type), Some(booking_type), Some(starts_at), Some(ends_at), Some(status)) = (
            row.booking_id,
            row.booked_by,
            row.user_type,
            row.booking_type,
            row.starts_at,
            row.ends_at,
            row.status,
        ) else {
            continue;
        };
        units
            .last_mut()
            .expect("group created above")
            .bookings
            .push(ScheduleBookingItem {
                id,
                booked_by,
                user_type: user_type.into(),
                club_name: row.club_name,
                booking_type: booking_type.into(),
                starts_at,
                ends_at,
                status: status.into(),
            });
    }
    units
}
