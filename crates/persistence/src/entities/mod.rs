//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod asset;
pub mod booking;
pub mod facility;
pub mod facility_unit;
pub mod schedule;

pub use asset::AssetEntity;
pub use booking::{
    BookingEntity, BookingKindDb, BookingStatusDb, UserBookingEntity, UserTypeDb,
};
pub use facility::FacilityEntity;
pub use facility_unit::FacilityUnitEntity;
pub use schedule::ScheduleRowEntity;
