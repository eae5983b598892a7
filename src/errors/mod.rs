//! Error handling

pub mod nanos_error;

pub use nanos_error::*;
