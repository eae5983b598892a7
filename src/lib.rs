//! nanos - small convenience helpers
//!
//! A stopwatch-style [`Timer`] with carry-correct formatting, binary byte
//! sizes, date boundaries, logging setup with a per-type logger capability,
//! and two JSON shaping helpers: [`idfy`] keys records by id and
//! [`remove_empty_members`] strips empty values from nested documents.

pub mod config;
pub mod errors;
pub mod data;
pub mod dt;
pub mod time;
pub mod utils;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{NanosError, NanosResult};
pub use data::{idfy, idfy_one, idfy_value, keyed_to_json, remove_empty_members, Identify, Keyed, RecordId};
pub use time::{Clock, SystemClock, Timer};
pub use utils::size;
