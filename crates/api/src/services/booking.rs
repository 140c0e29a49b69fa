//! Transactional booking coordination.
//!
//! Owns the booking lifecycle: creation under concurrency, check-in,
//! check-out, and cancellation. Every operation runs in one store
//! transaction that locks rows in a globally consistent order
//! (facility, then unit, then booking) so concurrent requests on the same
//! facility serialize instead of deadlocking. The store's NOW() is the
//! authoritative instant inside each transaction.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use domain::models::facility::CLUB_ONLY_CATEGORY;
use domain::models::{
    Booking, BookingStatus, BookingType, ConflictDetails, CreateBookingRequest, Facility, UserType,
};
use domain::services::BookingPolicy;
use persistence::db;
use persistence::entities::{BookingEntity, BookingStatusDb};
use persistence::repositories::{BookingRepository, FacilityRepository, FacilityUnitRepository, NewBooking};

use crate::broadcast::Broadcaster;
use crate::error::ApiError;

/// Orchestrates booking mutations against the store.
#[derive(Clone)]
pub struct BookingService {
    pool: PgPool,
    policy: BookingPolicy,
    broadcaster: Broadcaster,
    registered_clubs: Arc<[String]>,
}

impl BookingService {
    pub fn new(
        pool: PgPool,
        policy: BookingPolicy,
        broadcaster: Broadcaster,
        registered_clubs: Vec<String>,
    ) -> Self {
        Self {
            pool,
            policy,
            broadcaster,
            registered_clubs: registered_clubs.into(),
        }
    }

    /// Create a booking. The whole conflict-resolution protocol runs inside
    /// one transaction; on success the broadcaster is signalled after
    /// commit.
    pub async fn create(&self, request: &CreateBookingRequest) -> Result<Booking, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;
        db::bound_lock_wait(&mut *tx).await.map_err(ApiError::from)?;
        let now = db::current_time(&mut *tx).await.map_err(ApiError::from)?;

        let starts_at = self.policy.snap_to_slot(request.starts_at);
        let ends_at = self.policy.snap_to_slot(request.ends_at);
        let idempotency_key = self.policy.idempotency_key(&request.user_name, starts_at);

        // Lock the facility first; this is the serialization point for all
        // writers touching it.
        let facility: Facility = FacilityRepository::lock_by_id(&mut *tx, request.facility_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::NotFound(format!("Facility {} not found", request.facility_id)))?
            .into();

        let booking_type =
            self.policy
                .validate(&facility, starts_at, ends_at, request.user_type, now)?;

        let (day_start, day_end) = civil_day_bounds(starts_at);

        // A standing full-day claim blocks every per-slot request on the
        // facility for that date.
        if booking_type == BookingType::TimeBased {
            if let Some(incumbent) =
                BookingRepository::find_full_day_on_facility(&mut *tx, facility.id, day_start, day_end)
                    .await
                    .map_err(ApiError::from)?
            {
                let details = conflict_details(&facility, &incumbent);
                return Err(ApiError::conflict_with(
                    format!(
                        "{} is reserved for the whole day by {}",
                        facility.name,
                        incumbent.club_name.as_deref().unwrap_or(&incumbent.booked_by)
                    ),
                    details,
                ));
            }
        }

        // A full-day claim on a pooled facility needs the entire day clear.
        // For unit-based facilities the same check runs under the unit lock
        // below, once the unit row is held.
        if booking_type == BookingType::FullDay && facility.is_pooled {
            if let Some(incumbent) =
                BookingRepository::find_active_on_facility(&mut *tx, facility.id, day_start, day_end)
                    .await
                    .map_err(ApiError::from)?
            {
                return Err(self.full_day_conflict(&facility, incumbent));
            }
        }

        if request.user_type == UserType::Club {
            let club = request
                .club_name
                .as_deref()
                .ok_or_else(|| ApiError::Validation("clubName is required for club bookings".into()))?;
            if !self.registered_clubs.iter().any(|c| c == club) {
                return Err(ApiError::Validation(format!("{} is not a registered club", club)));
            }
        }

        // One person, one slot: a user may not hold two overlapping claims
        // anywhere in the system.
        if BookingRepository::find_active_for_user(&mut *tx, &request.user_name, starts_at, ends_at)
            .await
            .map_err(ApiError::from)?
            .is_some()
        {
            return Err(ApiError::conflict(
                "You already have a booking overlapping this window",
            ));
        }

        let unit_id = if facility.is_pooled {
            let used =
                BookingRepository::count_active_on_facility(&mut *tx, facility.id, starts_at, ends_at)
                    .await
                    .map_err(ApiError::from)?;
            if used >= i64::from(facility.total_capacity) {
                return Err(ApiError::conflict(format!(
                    "{} is fully booked for this window",
                    facility.name
                )));
            }
            None
        } else {
            let unit_id = request.unit_id.ok_or_else(|| {
                ApiError::Validation("unitId is required for this facility".into())
            })?;
            let unit = FacilityUnitRepository::lock_by_id(&mut *tx, unit_id)
                .await
                .map_err(ApiError::from)?
                .filter(|u| u.facility_id == facility.id)
                .ok_or_else(|| {
                    ApiError::Validation(format!(
                        "Unit {} does not belong to facility {}",
                        unit_id, facility.id
                    ))
                })?;
            if !unit.is_operational {
                return Err(ApiError::Validation(format!(
                    "{} is not operational",
                    unit.unit_name
                )));
            }

            // Full-day claims block on anything within the civil day;
            // per-slot claims only on the requested window.
            let (from, until) = match booking_type {
                BookingType::FullDay => (day_start, day_end),
                BookingType::TimeBased => (starts_at, ends_at),
            };
            if let Some(incumbent) =
                BookingRepository::find_active_on_unit(&mut *tx, unit.id, from, until)
                    .await
                    .map_err(ApiError::from)?
            {
                return Err(match booking_type {
                    BookingType::FullDay => self.full_day_conflict(&facility, incumbent),
                    BookingType::TimeBased => {
                        let details = conflict_details(&facility, &incumbent);
                        ApiError::conflict_with(
                            format!("{} is already booked for this window", unit.unit_name),
                            details,
                        )
                    }
                });
            }
            Some(unit.id)
        };

        let inserted = BookingRepository::insert(
            &mut *tx,
            &NewBooking {
                facility_id: facility.id,
                unit_id,
                booked_by: request.user_name.clone(),
                user_type: request.user_type.into(),
                club_name: if request.user_type == UserType::Club {
                    request.club_name.clone()
                } else {
                    None
                },
                booking_type: booking_type.into(),
                starts_at,
                ends_at,
                idempotency_key,
            },
        )
        .await
        .map_err(ApiError::from)?;

        tx.commit().await.map_err(ApiError::from)?;

        let booking: Booking = inserted.into();
        info!(
            booking_id = %booking.id,
            facility_id = booking.facility_id,
            booked_by = %booking.booked_by,
            booking_type = %booking.booking_type,
            "Booking created"
        );
        self.broadcaster.notify();
        Ok(booking)
    }

    /// Move a scheduled booking to checked-in. Permitted only to the owner,
    /// and only inside the grace window starting at `starts_at`.
    pub async fn check_in(&self, booking_id: Uuid, caller: &str) -> Result<Booking, ApiError> {
        let grace = self.policy.grace();
        let booking = self
            .transition(booking_id, caller, move |booking, now| {
                if booking.status != BookingStatusDb::Scheduled {
                    return Err(wrong_status("check in", booking.status.into()));
                }
                if now < booking.starts_at {
                    return Err(ApiError::Forbidden(
                        "Check-in opens at the booking start time".into(),
                    ));
                }
                if now > booking.starts_at + grace {
                    return Err(ApiError::Forbidden("The check-in window has closed".into()));
                }
                Ok(Transition::SetStatus(BookingStatusDb::CheckedIn))
            })
            .await?;
        info!(booking_id = %booking.id, booked_by = %booking.booked_by, "Checked in");
        Ok(booking)
    }

    /// Complete a checked-in booking early, releasing the remainder of the
    /// window. `ends_at` is rewritten to the next slot boundary after now.
    pub async fn check_out(&self, booking_id: Uuid, caller: &str) -> Result<Booking, ApiError> {
        let policy = self.policy.clone();
        let booking = self
            .transition(booking_id, caller, move |booking, now| {
                if booking.status != BookingStatusDb::CheckedIn {
                    return Err(wrong_status("check out", booking.status.into()));
                }
                Ok(Transition::CompleteAt(policy.snap_to_next_boundary(now)))
            })
            .await?;
        info!(booking_id = %booking.id, ends_at = %booking.ends_at, "Checked out");
        Ok(booking)
    }

    /// Release a scheduled booking before its start.
    pub async fn cancel(&self, booking_id: Uuid, caller: &str) -> Result<Booking, ApiError> {
        let booking = self
            .transition(booking_id, caller, |booking, _now| {
                if booking.status != BookingStatusDb::Scheduled {
                    return Err(wrong_status("cancel", booking.status.into()));
                }
                Ok(Transition::SetStatus(BookingStatusDb::Released))
            })
            .await?;
        info!(booking_id = %booking.id, booked_by = %booking.booked_by, "Cancelled");
        Ok(booking)
    }

    /// Shared transition plumbing: one transaction, facility lock first,
    /// then the booking row, identity check, guard, update, commit, signal.
    async fn transition<G>(
        &self,
        booking_id: Uuid,
        caller: &str,
        guard: G,
    ) -> Result<Booking, ApiError>
    where
        G: FnOnce(&BookingEntity, DateTime<Utc>) -> Result<Transition, ApiError>,
    {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;
        db::bound_lock_wait(&mut *tx).await.map_err(ApiError::from)?;

        let facility_id = BookingRepository::facility_of(&mut *tx, booking_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::NotFound(format!("Booking {} not found", booking_id)))?;
        FacilityRepository::lock_by_id(&mut *tx, facility_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::NotFound(format!("Facility {} not found", facility_id)))?;

        let booking = BookingRepository::lock_by_id(&mut *tx, booking_id)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::NotFound(format!("Booking {} not found", booking_id)))?;

        if booking.booked_by != caller {
            return Err(ApiError::Forbidden(
                "Only the booking owner may perform this action".into(),
            ));
        }

        let now = db::current_time(&mut *tx).await.map_err(ApiError::from)?;

        let updated = match guard(&booking, now)? {
            Transition::SetStatus(status) => {
                BookingRepository::set_status(&mut *tx, booking_id, status)
                    .await
                    .map_err(ApiError::from)?
            }
            Transition::CompleteAt(ends_at) => {
                BookingRepository::complete_at(&mut *tx, booking_id, ends_at)
                    .await
                    .map_err(ApiError::from)?
            }
        };

        tx.commit().await.map_err(ApiError::from)?;
        self.broadcaster.notify();
        Ok(updated.into())
    }

    fn full_day_conflict(&self, facility: &Facility, incumbent: BookingEntity) -> ApiError {
        let message = match incumbent.booking_type {
            persistence::entities::BookingKindDb::FullDay => format!(
                "The day is already taken by {}",
                incumbent.club_name.as_deref().unwrap_or(&incumbent.booked_by)
            ),
            persistence::entities::BookingKindDb::TimeBased => {
                "There are existing per-slot bookings on this day".to_string()
            }
        };
        let details = conflict_details(facility, &incumbent);
        ApiError::conflict_with(message, details)
    }
}

/// What a guarded transition does to the row.
enum Transition {
    SetStatus(BookingStatusDb),
    CompleteAt(DateTime<Utc>),
}

fn wrong_status(action: &str, status: BookingStatus) -> ApiError {
    ApiError::Validation(format!("Cannot {} a booking that is {}", action, status))
}

/// The civil day [00:00, 24:00) containing `t`.
pub fn civil_day_bounds(t: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = t.date_naive().and_hms_opt(0, 0, 0).expect("midnight exists").and_utc();
    (start, start + Duration::days(1))
}

/// Conflict details shown to the loser of a race. For club-only categories
/// with a club incumbent, the club is surfaced instead of the individual
/// identity behind it.
fn conflict_details(facility: &Facility, incumbent: &BookingEntity) -> ConflictDetails {
    let user_type: UserType = incumbent.user_type.into();
    let booked_by = match (&incumbent.club_name, user_type) {
        (Some(club), UserType::Club) if facility.category == CLUB_ONLY_CATEGORY => club.clone(),
        _ => incumbent.booked_by.clone(),
    };
    ConflictDetails {
        booked_by,
        club_name: incumbent.club_name.clone(),
        user_type,
        starts_at: incumbent.starts_at,
        ends_at: incumbent.ends_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use persistence::entities::{BookingKindDb, UserTypeDb};

    fn facility(category: &str) -> Facility {
        Facility {
            id: 5,
            name: "Main Auditorium".into(),
            category: category.into(),
            description: None,
            total_capacity: 1,
            is_pooled: false,
            min_duration_minutes: 60,
            max_duration_minutes: 600,
            open_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            close_time: NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
            timezone: "UTC".into(),
            created_at: "2025-01-01T00:00:00Z".parse().unwrap(),
        }
    }

    fn incumbent(user_type: UserTypeDb, club_name: Option<&str>) -> BookingEntity {
        BookingEntity {
            id: Uuid::nil(),
            facility_id: 5,
            unit_id: Some(50),
            booked_by: "roobooru-lead".into(),
            user_type,
            club_name: club_name.map(String::from),
            booking_type: BookingKindDb::FullDay,
            starts_at: "2025-06-02T00:00:00Z".parse().unwrap(),
            ends_at: "2025-06-02T23:30:00Z".parse().unwrap(),
            status: BookingStatusDb::Scheduled,
            idempotency_key: "roobooru-lead_1748822400000".into(),
            created_at: "2025-06-01T09:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn civil_day_bounds_cover_midnight_to_midnight() {
        let (start, end) = civil_day_bounds("2025-06-02T15:45:12Z".parse().unwrap());
        assert_eq!(start, "2025-06-02T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(end, "2025-06-03T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn event_space_conflicts_surface_the_club() {
        let details = conflict_details(
            &facility(CLUB_ONLY_CATEGORY),
            &incumbent(UserTypeDb::Club, Some("Roobooru")),
        );
        assert_eq!(details.booked_by, "Roobooru");
        assert_eq!(details.user_type, UserType::Club);
    }

    #[test]
    fn ordinary_categories_surface_the_individual() {
        let details = conflict_details(
            &facility("Sports"),
            &incumbent(UserTypeDb::Club, Some("Roobooru")),
        );
        assert_eq!(details.booked_by, "roobooru-lead");
    }

    #[test]
    fn individual_incumbents_are_never_masked() {
        let details = conflict_details(
            &facility(CLUB_ONLY_CATEGORY),
            &incumbent(UserTypeDb::Individual, None),
        );
        assert_eq!(details.booked_by, "roobooru-lead");
    }
}
