//! Booking policy evaluation.
//!
//! The evaluator is a pure function over (facility, requested window, user
//! type, current instant). It snaps endpoints to slot boundaries, enforces
//! the temporal rules in a fixed order, classifies the booking as
//! time-based or full-day, and derives the idempotency key. It never
//! touches the store.

use chrono::{DateTime, Duration, Timelike, Utc};
use thiserror::Error;

use crate::models::booking::{BookingType, UserType};
use crate::models::facility::Facility;

/// Tunable policy knobs, loaded from configuration by the composition root.
#[derive(Debug, Clone)]
pub struct BookingRules {
    /// Slot granularity; endpoints snap to multiples of this.
    pub slot_size_minutes: i64,
    /// Minutes after `starts_at` during which check-in is allowed.
    pub no_show_grace_minutes: i64,
    /// Advance-booking horizon for individuals, in days.
    pub max_horizon_days: i64,
    /// Extended horizon for registered clubs, in days.
    pub club_horizon_days: i64,
    /// Global floor on session length, in minutes.
    pub min_session_minutes: i64,
    /// Sessions at or above this duration classify as full-day.
    pub full_day_threshold_hours: i64,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            slot_size_minutes: 30,
            no_show_grace_minutes: 15,
            max_horizon_days: 7,
            club_horizon_days: 30,
            min_session_minutes: 30,
            full_day_threshold_hours: 8,
        }
    }
}

/// A policy rule the request failed, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("booking cannot start in the past")]
    StartsInPast,

    #[error("booking starts beyond the {horizon_days}-day advance horizon")]
    BeyondHorizon { horizon_days: i64 },

    #[error("booking must end after it starts")]
    EmptyWindow,

    #[error("requested time falls outside operating hours ({open}-{close})")]
    OutsideOperatingHours { open: chrono::NaiveTime, close: chrono::NaiveTime },

    #[error("full-day bookings are reserved for registered clubs")]
    FullDayRequiresClub,

    #[error("session is shorter than the {min_minutes}-minute minimum")]
    TooShort { min_minutes: i64 },

    #[error("session is longer than the {max_minutes}-minute maximum")]
    TooLong { max_minutes: i64 },
}

/// Pure evaluator for booking requests.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    rules: BookingRules,
}

impl BookingPolicy {
    pub fn new(rules: BookingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    /// The check-in grace window length.
    pub fn grace(&self) -> Duration {
        Duration::minutes(self.rules.no_show_grace_minutes)
    }

    /// Round `t` to the nearest slot boundary. Seconds and sub-seconds are
    /// zeroed first; ties on the half-slot round up.
    pub fn snap_to_slot(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let slot = self.rules.slot_size_minutes;
        let t = truncate_to_minute(t);
        let rem = i64::from(t.minute()) % slot;
        if rem == 0 {
            t
        } else if rem * 2 >= slot {
            t + Duration::minutes(slot - rem)
        } else {
            t - Duration::minutes(rem)
        }
    }

    /// The smallest slot boundary strictly greater than `t`: add one minute,
    /// then ceil to the next slot multiple. A `t` already on a boundary
    /// therefore jumps to the following one.
    pub fn snap_to_next_boundary(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let slot = self.rules.slot_size_minutes;
        let t = truncate_to_minute(t);
        let minute = i64::from(t.minute());
        let offset = (minute + slot) / slot * slot;
        t - Duration::minutes(minute) + Duration::minutes(offset)
    }

    /// Deterministic duplicate-submission key: the same caller re-posting
    /// the same snapped start must collide.
    pub fn idempotency_key(&self, user_name: &str, starts_at: DateTime<Utc>) -> String {
        format!("{}_{}", user_name, starts_at.timestamp_millis())
    }

    /// Validate a snapped window against the facility's policy and classify
    /// it. Rules run in a fixed order; the first failure wins.
    pub fn validate(
        &self,
        facility: &Facility,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        user_type: UserType,
        now: DateTime<Utc>,
    ) -> Result<BookingType, PolicyViolation> {
        if starts_at < now {
            return Err(PolicyViolation::StartsInPast);
        }

        let horizon_days = match user_type {
            UserType::Club => self.rules.club_horizon_days,
            UserType::Individual => self.rules.max_horizon_days,
        };
        if starts_at > now + Duration::days(horizon_days) {
            return Err(PolicyViolation::BeyondHorizon { horizon_days });
        }

        if ends_at <= starts_at {
            return Err(PolicyViolation::EmptyWindow);
        }

        let duration = ends_at - starts_at;
        if duration >= Duration::hours(self.rules.full_day_threshold_hours) {
            if user_type != UserType::Club {
                return Err(PolicyViolation::FullDayRequiresClub);
            }
            return Ok(BookingType::FullDay);
        }

        let start_tod = starts_at.time();
        let end_tod = ends_at.time();
        if start_tod < facility.open_time || end_tod > facility.close_time || end_tod < start_tod {
            return Err(PolicyViolation::OutsideOperatingHours {
                open: facility.open_time,
                close: facility.close_time,
            });
        }

        let minutes = duration.num_minutes();
        let min_minutes =
            i64::from(facility.min_duration_minutes).max(self.rules.min_session_minutes);
        if minutes < min_minutes {
            return Err(PolicyViolation::TooShort { min_minutes });
        }
        let max_minutes = i64::from(facility.max_duration_minutes);
        if minutes > max_minutes {
            return Err(PolicyViolation::TooLong { max_minutes });
        }

        Ok(BookingType::TimeBased)
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::new(BookingRules::default())
    }
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t - Duration::seconds(i64::from(t.second())) - Duration::nanoseconds(i64::from(t.nanosecond()))
}
