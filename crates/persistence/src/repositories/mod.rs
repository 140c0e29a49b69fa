//! Repository implementations for database operations.

pub mod availability;
pub mod booking;
pub mod facility;
pub mod facility_unit;
pub mod schedule;
pub mod seed;

pub use availability::AvailabilityRepository;
pub use booking::{BookingRepository, NewBooking};
pub use facility::FacilityRepository;
pub use facility_unit::FacilityUnitRepository;
pub use schedule::ScheduleRepository;
pub use seed::SeedRepository;
