//! Custom error types for the helpers

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NanosError {
    #[error("Record has no usable identifier: {record}")]
    MissingId {
        record: String,
    },

    #[error("Identifier must be a scalar, got {kind}")]
    UnhashableId {
        kind: &'static str,
    },

    #[error("Expected a record or a list of records, got {kind}")]
    NotARecord {
        kind: &'static str,
    },

    #[error("Two identifiers render as the same JSON key: {key}")]
    DuplicateKey {
        key: String,
    },

    #[error("Logger names must be a string or a list of strings, got {found}")]
    InvalidLoggerNames {
        found: String,
    },

    #[error("Invalid log level: {value}")]
    InvalidLevel {
        value: String,
    },

    #[error("Invalid log target entry: {entry}")]
    InvalidLogTarget {
        entry: String,
    },

    #[error("Shifting by {days} days leaves the supported date range")]
    DateOutOfRange {
        days: i64,
    },

    #[error("Local time {datetime} does not exist in the requested timezone")]
    NonexistentLocalTime {
        datetime: String,
    },

    #[error("Logging error: {message}")]
    Logging {
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },
}

impl NanosError {
    /// Short name of a JSON value's shape, used in error messages.
    pub fn kind_of(value: &serde_json::Value) -> &'static str {
        match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "bool",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        }
    }
}

pub type NanosResult<T> = Result<T, NanosError>;
