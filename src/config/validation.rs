//! Configuration validation.
//!
//! Semantic checks run after serde has accepted the file: address and URL
//! syntax, timeout ranges, and the location set. All errors are returned,
//! not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AggregatorConfig;
use crate::visits::locations::{LocationError, LocationSet};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not an absolute http(s) URL")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("upstream.locations: {0}")]
    Locations(#[from] LocationError),

    #[error("observability.log_level: unknown level '{0}'")]
    LogLevel(String),

    #[error(
        "timeouts.request_secs ({request_secs}) must exceed upstream.timeout_secs + store.timeout_secs ({fetch_and_insert_secs})"
    )]
    RequestTimeoutTooShort {
        request_secs: u64,
        fetch_and_insert_secs: u64,
    },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &AggregatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_url(&mut errors, "upstream.base_url", &config.upstream.base_url);
    check_url(&mut errors, "store.url", &config.store.url);

    if let Err(e) = LocationSet::resolve(&config.upstream.locations) {
        errors.push(ValidationError::Locations(e));
    }

    if config.store.table.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "store.table" });
    }
    if config.store.api_key.is_empty() {
        errors.push(ValidationError::Empty { field: "store.api_key" });
    }

    check_timeout(&mut errors, "upstream.timeout_secs", config.upstream.timeout_secs);
    check_timeout(&mut errors, "store.timeout_secs", config.store.timeout_secs);
    check_timeout(&mut errors, "timeouts.request_secs", config.timeouts.request_secs);
    if config.schedule.enabled {
        check_timeout(&mut errors, "schedule.interval_secs", config.schedule.interval_secs);
    }

    // A run is one fetch round plus one insert; the request must outlive both.
    let fetch_and_insert_secs = config
        .upstream
        .timeout_secs
        .saturating_add(config.store.timeout_secs);
    if config.timeouts.request_secs <= fetch_and_insert_secs {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.timeouts.request_secs,
            fetch_and_insert_secs,
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let ok = url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_timeout(errors: &mut Vec<ValidationError>, field: &'static str, secs: u64) {
    if secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AggregatorConfig {
        let mut config = AggregatorConfig::default();
        config.store.api_key = "key".to_string();
        config
    }

    #[test]
    fn test_default_with_key_is_valid() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_default_without_key_is_rejected() {
        let errors = validate_config(&AggregatorConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Empty { field: "store.api_key" }]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.listener.bind_address = "not-an-address".to_string();
        config.upstream.base_url = "ftp://example.com".to_string();
        config.upstream.timeout_secs = 0;
        config.upstream.locations = vec!["belmont".into(), "belmont".into()];
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTimeout {
            field: "upstream.timeout_secs"
        }));
        assert!(errors.contains(&ValidationError::Locations(LocationError::Duplicate(
            "belmont".to_string()
        ))));
    }

    #[test]
    fn test_schedule_interval_only_checked_when_enabled() {
        let mut config = valid_config();
        config.schedule.interval_secs = 0;
        assert!(validate_config(&config).is_ok());

        config.schedule.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ZeroTimeout {
                field: "schedule.interval_secs"
            }]
        );
    }

    #[test]
    fn test_request_timeout_must_cover_fetch_and_insert() {
        let mut config = valid_config();
        config.upstream.timeout_secs = 10;
        config.store.timeout_secs = 10;

        config.timeouts.request_secs = 20;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::RequestTimeoutTooShort {
                request_secs: 20,
                fetch_and_insert_secs: 20
            }]
        );

        config.timeouts.request_secs = 21;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::InvalidUrl {
            field: "store.url",
            value: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "store.url: 'nope' is not an absolute http(s) URL");
    }
}
