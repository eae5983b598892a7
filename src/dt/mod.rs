//! Date arithmetic relative to now and day boundaries
//!
//! Every helper is generic over [`chrono::TimeZone`]; pass `&Utc` for the
//! usual case or `&Local` for the machine's zone.

pub mod days;

pub use days::*;
