//! HTTP middleware.

pub mod logging;
pub mod trace_id;
