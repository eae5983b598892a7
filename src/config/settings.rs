//! Helper defaults and environment variable handling

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

use crate::errors::{NanosError, NanosResult};
use crate::utils::logging::LoggingSettings;

// Timer constants
pub const DEFAULT_TIMER_PRECISION: u32 = 2;
pub const MAX_TIMER_PRECISION: u32 = 9; // nanoseconds

// Size formatting constants
pub const DEFAULT_SIZE_PRECISION: u32 = 1;
pub const MAX_SIZE_PRECISION: u32 = 9;

// Logging constants
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

#[derive(Debug, Clone)]
pub struct Config {
    pub timer_precision: u32,
    pub size_precision: u32,
    // Logging Configuration
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    pub log_targets: Vec<(String, LevelFilter)>,
    /// Environment entries `load` could not use and replaced by defaults.
    pub rejected: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer_precision: DEFAULT_TIMER_PRECISION,
            size_precision: DEFAULT_SIZE_PRECISION,
            log_level: DEFAULT_LOG_LEVEL,
            log_file: None,
            log_targets: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any `NANOS_*` variable source.
    ///
    /// Unusable values fall back to their defaults and are remembered in
    /// `rejected` so that [`Config::validate`] can report them.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(raw) = lookup("NANOS_TIMER_PRECISION") {
            match raw.trim().parse::<u32>() {
                Ok(precision) => config.timer_precision = precision.min(MAX_TIMER_PRECISION),
                Err(_) => config.rejected.push(format!("NANOS_TIMER_PRECISION={}", raw)),
            }
        }
        if let Some(raw) = lookup("NANOS_SIZE_PRECISION") {
            match raw.trim().parse::<u32>() {
                Ok(precision) => config.size_precision = precision.min(MAX_SIZE_PRECISION),
                Err(_) => config.rejected.push(format!("NANOS_SIZE_PRECISION={}", raw)),
            }
        }
        if let Some(raw) = lookup("NANOS_LOG_LEVEL") {
            match parse_level(&raw) {
                Ok(level) => config.log_level = level,
                Err(_) => config.rejected.push(format!("NANOS_LOG_LEVEL={}", raw)),
            }
        }
        config.log_file = lookup("NANOS_LOG_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        if let Some(raw) = lookup("NANOS_LOG_TARGETS") {
            for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
                match parse_log_target(entry) {
                    Ok(target) => config.log_targets.push(target),
                    Err(_) => config
                        .rejected
                        .push(format!("NANOS_LOG_TARGETS entry {:?}", entry.trim())),
                }
            }
        }
        config
    }

    pub fn validate(&self) -> NanosResult<()> {
        if !self.rejected.is_empty() {
            return Err(NanosError::Config {
                message: format!("unusable settings: {}", self.rejected.join(", ")),
            });
        }
        if self.timer_precision > MAX_TIMER_PRECISION {
            return Err(NanosError::Config {
                message: format!(
                    "timer_precision must be at most {}, got {}",
                    MAX_TIMER_PRECISION, self.timer_precision
                ),
            });
        }
        if self.size_precision > MAX_SIZE_PRECISION {
            return Err(NanosError::Config {
                message: format!(
                    "size_precision must be at most {}, got {}",
                    MAX_SIZE_PRECISION, self.size_precision
                ),
            });
        }
        if let Some((target, _)) = self.log_targets.iter().find(|(t, _)| t.trim().is_empty()) {
            return Err(NanosError::Config {
                message: format!("log target name cannot be blank: {:?}", target),
            });
        }
        Ok(())
    }

    /// Logging settings derived from this configuration.
    pub fn logging(&self) -> LoggingSettings {
        LoggingSettings {
            level: self.log_level,
            file: self.log_file.clone(),
            targets: self.log_targets.clone(),
            ..LoggingSettings::default()
        }
    }
}

/// Parse one `target=level` entry such as `nanos::data=debug`.
pub fn parse_log_target(entry: &str) -> NanosResult<(String, LevelFilter)> {
    let invalid = || NanosError::InvalidLogTarget {
        entry: entry.trim().to_string(),
    };
    let (target, level) = entry.split_once('=').ok_or_else(invalid)?;
    let target = target.trim();
    if target.is_empty() {
        return Err(invalid());
    }
    let level = parse_level(level).map_err(|_| invalid())?;
    Ok((target.to_string(), level))
}

/// Parse a `target=level` list such as `nanos::data=debug,hyper=warn`,
/// failing on the first malformed entry.
pub fn parse_log_targets(raw: &str) -> NanosResult<Vec<(String, LevelFilter)>> {
    raw.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(parse_log_target)
        .collect()
}

pub fn parse_level(raw: &str) -> NanosResult<LevelFilter> {
    LevelFilter::from_str(raw.trim()).map_err(|_| NanosError::InvalidLevel {
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timer_precision, 2);
        assert_eq!(config.size_precision, 1);
        assert_eq!(config.log_level, LevelFilter::INFO);
        assert!(config.log_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_large_precision() {
        let mut config = Config::default();
        config.timer_precision = 12;
        assert!(matches!(config.validate(), Err(NanosError::Config { .. })));

        config.timer_precision = 3;
        config.size_precision = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_log_targets() {
        let targets = parse_log_targets("nanos::data=debug, hyper = warn,").unwrap();
        assert_eq!(
            targets,
            vec![
                ("nanos::data".to_string(), LevelFilter::DEBUG),
                ("hyper".to_string(), LevelFilter::WARN),
            ]
        );
        for bad in ["broken", "=info", "x=loud"] {
            assert_eq!(
                parse_log_target(bad).unwrap_err(),
                NanosError::InvalidLogTarget { entry: bad.to_string() }
            );
        }
        assert!(parse_log_targets("a=info,x=loud").is_err());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_and_clamps() {
        let config = Config::from_lookup(lookup(&[
            ("NANOS_TIMER_PRECISION", "4"),
            ("NANOS_SIZE_PRECISION", "30"),
            ("NANOS_LOG_LEVEL", "debug"),
            ("NANOS_LOG_FILE", "logs/nanos.log"),
            ("NANOS_LOG_TARGETS", "nanos::data=trace,hyper=warn"),
        ]));
        assert_eq!(config.timer_precision, 4);
        assert_eq!(config.size_precision, MAX_SIZE_PRECISION);
        assert_eq!(config.log_level, LevelFilter::DEBUG);
        assert_eq!(config.log_file, Some(PathBuf::from("logs/nanos.log")));
        assert_eq!(config.log_targets.len(), 2);
        assert!(config.rejected.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_empty_env_is_default() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.timer_precision, DEFAULT_TIMER_PRECISION);
        assert!(config.log_targets.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unusable_entries_fall_back_and_fail_validation() {
        let config = Config::from_lookup(lookup(&[
            ("NANOS_TIMER_PRECISION", "two"),
            ("NANOS_LOG_LEVEL", "loud"),
            ("NANOS_LOG_TARGETS", "nanos=debug,broken,x=loud"),
        ]));
        assert_eq!(config.timer_precision, DEFAULT_TIMER_PRECISION);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(
            config.log_targets,
            vec![("nanos".to_string(), LevelFilter::DEBUG)]
        );
        assert_eq!(config.rejected.len(), 4);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("NANOS_LOG_LEVEL=loud"), "{}", err);
        assert!(err.contains("\"broken\""), "{}", err);
        assert!(err.contains("\"x=loud\""), "{}", err);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE").unwrap(), LevelFilter::TRACE);
        assert_eq!(parse_level(" off ").unwrap(), LevelFilter::OFF);
        assert!(matches!(parse_level("loud"), Err(NanosError::InvalidLevel { .. })));
    }

    #[test]
    fn test_logging_settings_follow_config() {
        let config = Config {
            log_level: LevelFilter::WARN,
            log_file: Some(PathBuf::from("out/nanos.log")),
            log_targets: vec![("nanos".to_string(), LevelFilter::TRACE)],
            ..Config::default()
        };
        let settings = config.logging();
        assert_eq!(settings.level, LevelFilter::WARN);
        assert_eq!(settings.file, Some(PathBuf::from("out/nanos.log")));
        assert_eq!(settings.targets.len(), 1);
    }
}
