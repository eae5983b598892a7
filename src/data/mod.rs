//! Shaping helpers for records and nested JSON documents

pub mod idfy;
pub mod prune;

pub use idfy::*;
pub use prune::*;
