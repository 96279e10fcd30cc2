//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Upper bound for `limits.idle_timeout` and `udp.sweep_interval`, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("limits.max_message_len must be greater than zero")]
    ZeroMessageLen,
    #[error("limits.idle_timeout must be greater than zero")]
    ZeroIdleTimeout,
    #[error("limits.{0} must be greater than zero")]
    ZeroQueue(&'static str),
    #[error("udp.sweep_interval must be greater than zero")]
    ZeroSweepInterval,
    #[error("{0} must be at most {MAX_INTERVAL_SECS} seconds")]
    IntervalTooLong(&'static str),
    #[error("storage.{0} must not be empty")]
    EmptyPath(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_message_len == 0 {
        errors.push(ValidationError::ZeroMessageLen);
    }
    if config.limits.idle_timeout == 0 {
        errors.push(ValidationError::ZeroIdleTimeout);
    } else if config.limits.idle_timeout > MAX_INTERVAL_SECS {
        errors.push(ValidationError::IntervalTooLong("limits.idle_timeout"));
    }
    if config.limits.outbound_queue == 0 {
        errors.push(ValidationError::ZeroQueue("outbound_queue"));
    }
    if config.limits.coordinator_queue == 0 {
        errors.push(ValidationError::ZeroQueue("coordinator_queue"));
    }

    if config.storage.log_dir.is_empty() {
        errors.push(ValidationError::EmptyPath("log_dir"));
    }
    if config.storage.metrics_file.is_empty() {
        errors.push(ValidationError::EmptyPath("metrics_file"));
    }

    if let Some(udp) = &config.udp {
        if udp.sweep_interval == 0 {
            errors.push(ValidationError::ZeroSweepInterval);
        } else if udp.sweep_interval > MAX_INTERVAL_SECS {
            errors.push(ValidationError::IntervalTooLong("udp.sweep_interval"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
