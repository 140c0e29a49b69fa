//! Domain models for facility booking.

pub mod booking;
pub mod facility;
pub mod schedule;

pub use booking::{
    Booking, BookingActionRequest, BookingResponse, BookingStatus, BookingType, ConflictDetails,
    CreateBookingRequest, UserBookingItem, UserType,
};
pub use facility::{AssetResponse, Facility, FacilityUnit, ListAssetsQuery, UnitResponse};
pub use schedule::{ScheduleBookingItem, ScheduleQuery, ScheduleResponse, UnitSchedule};
