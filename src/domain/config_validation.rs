//! Configuration validation.
//!
//! Validates all config fields before the store is opened.

use crate::domain::date_range::DATE_FORMAT;
use crate::domain::error::FolioError;
use crate::ports::config_port::ConfigPort;
use chrono::{Local, NaiveDate};

pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const MAX_POOL_SIZE: u32 = 64;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), FolioError> {
    validate_database_path(config)?;
    validate_pool_size(config)?;
    configured_today(config)?;
    Ok(())
}

fn validate_database_path(config: &dyn ConfigPort) -> Result<(), FolioError> {
    match config.get_string("database", "path") {
        Some(path) if !path.trim().is_empty() => Ok(()),
        Some(_) => Err(FolioError::ConfigInvalid {
            section: "database".to_string(),
            key: "path".to_string(),
            reason: "path must not be empty".to_string(),
        }),
        None => Err(FolioError::ConfigMissing {
            section: "database".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), FolioError> {
    pool_size(config).map(|_| ())
}

/// `[database] pool_size`, defaulting to 4 when unset.
pub fn pool_size(config: &dyn ConfigPort) -> Result<u32, FolioError> {
    let invalid = |reason: String| FolioError::ConfigInvalid {
        section: "database".to_string(),
        key: "pool_size".to_string(),
        reason,
    };
    let Some(raw) = config.get_string("database", "pool_size") else {
        return Ok(DEFAULT_POOL_SIZE);
    };
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| {
            invalid(format!(
                "{raw:?} is not a whole number between 1 and {MAX_POOL_SIZE}"
            ))
        })?;
    if !(1..=MAX_POOL_SIZE).contains(&value) {
        return Err(invalid(format!(
            "pool_size must be between 1 and {MAX_POOL_SIZE}"
        )));
    }
    Ok(value)
}

/// The `[valuation] today` override, if set.
pub fn configured_today(config: &dyn ConfigPort) -> Result<Option<NaiveDate>, FolioError> {
    match config.get_string("valuation", "today") {
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| FolioError::ConfigInvalid {
                section: "valuation".to_string(),
                key: "today".to_string(),
                reason: "invalid date format (expected YYYY-MM-DD)".to_string(),
            }),
        None => Ok(None),
    }
}

/// The date treated as "today": the configured override or the local date.
pub fn resolve_today(config: &dyn ConfigPort) -> Result<NaiveDate, FolioError> {
    Ok(configured_today(config)?.unwrap_or_else(|| Local::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            MapConfig(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
    }

    #[test]
    fn valid_minimal_config() {
        let config = MapConfig::new(&[("database", "path", "folio.db")]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn missing_path() {
        let config = MapConfig::new(&[]);
        match validate_config(&config) {
            Err(FolioError::ConfigMissing { section, key }) => {
                assert_eq!(section, "database");
                assert_eq!(key, "path");
            }
            other => panic!("expected ConfigMissing, got: {other:?}"),
        }
    }

    #[test]
    fn empty_path() {
        let config = MapConfig::new(&[("database", "path", "  ")]);
        assert!(matches!(
            validate_config(&config),
            Err(FolioError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn zero_pool_size() {
        let config = MapConfig::new(&[("database", "path", "x.db"), ("database", "pool_size", "0")]);
        match validate_config(&config) {
            Err(FolioError::ConfigInvalid { key, .. }) => assert_eq!(key, "pool_size"),
            other => panic!("expected ConfigInvalid, got: {other:?}"),
        }
    }

    #[test]
    fn pool_size_defaults_when_unset() {
        let config = MapConfig::new(&[("database", "path", "x.db")]);
        assert_eq!(pool_size(&config).unwrap(), DEFAULT_POOL_SIZE);
    }

    #[test]
    fn pool_size_beyond_u32_rejected() {
        let config = MapConfig::new(&[
            ("database", "path", "x.db"),
            ("database", "pool_size", "4294967296"),
        ]);
        match validate_config(&config) {
            Err(FolioError::ConfigInvalid { key, .. }) => assert_eq!(key, "pool_size"),
            other => panic!("expected ConfigInvalid, got: {other:?}"),
        }
    }

    #[test]
    fn pool_size_above_cap_rejected() {
        let config = MapConfig::new(&[("database", "pool_size", "65")]);
        assert!(matches!(
            pool_size(&config),
            Err(FolioError::ConfigInvalid { .. })
        ));
        let config = MapConfig::new(&[("database", "pool_size", "64")]);
        assert_eq!(pool_size(&config).unwrap(), 64);
    }

    #[test]
    fn non_numeric_pool_size_rejected() {
        let config = MapConfig::new(&[
            ("database", "path", "x.db"),
            ("database", "pool_size", "many"),
        ]);
        match validate_config(&config) {
            Err(FolioError::ConfigInvalid { key, reason, .. }) => {
                assert_eq!(key, "pool_size");
                assert!(reason.contains("\"many\""), "{reason}");
            }
            other => panic!("expected ConfigInvalid, got: {other:?}"),
        }
    }

    #[test]
    fn today_override_parsed() {
        let config = MapConfig::new(&[("valuation", "today", "2016-09-30")]);
        assert_eq!(
            resolve_today(&config).unwrap(),
            NaiveDate::from_ymd_opt(2016, 9, 30).unwrap()
        );
    }

    #[test]
    fn today_override_invalid() {
        let config = MapConfig::new(&[
            ("database", "path", "x.db"),
            ("valuation", "today", "30/09/2016"),
        ]);
        match validate_config(&config) {
            Err(FolioError::ConfigInvalid { section, key, .. }) => {
                assert_eq!(section, "valuation");
                assert_eq!(key, "today");
            }
            other => panic!("expected ConfigInvalid, got: {other:?}"),
        }
    }

    #[test]
    fn today_unset_without_override() {
        let config = MapConfig::new(&[]);
        assert_eq!(configured_today(&config).unwrap(), None);
    }
}
