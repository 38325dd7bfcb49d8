//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check mount points are usable as route prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `api.ticker_limit`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address", config.listener.bind_address),
        ));
    }

    check_mount_path(&mut errors, "api.root_path", &config.api.root_path);
    check_mount_path(&mut errors, "api.admin_path", &config.api.admin_path);
    if config.api.root_path.trim_matches('/') == config.api.admin_path.trim_matches('/') {
        errors.push(ValidationError::new(
            "api.admin_path",
            "must differ from api.root_path",
        ));
    }

    if config.api.ticker_limit == 0 {
        errors.push(ValidationError::new("api.ticker_limit", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.fetch_secs == 0 {
        errors.push(ValidationError::new("timeouts.fetch_secs", "must be greater than 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    let hooks = &config.webhooks;
    if hooks.max_attempts == 0 {
        errors.push(ValidationError::new("webhooks.max_attempts", "must be at least 1"));
    }
    if hooks.timeout_secs == 0 {
        errors.push(ValidationError::new("webhooks.timeout_secs", "must be greater than 0"));
    }
    if hooks.base_delay_ms > hooks.max_delay_ms {
        errors.push(ValidationError::new(
            "webhooks.base_delay_ms",
            "must not exceed webhooks.max_delay_ms",
        ));
    }

    if matches!(&config.admin.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::new("admin.api_key", "must not be empty when set"));
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_mount_path(errors: &mut Vec<ValidationError>, field: &'static str, path: &str) {
    if !path.starts_with('/') {
        errors.push(ValidationError::new(field, "must start with '/'"));
    }
    if path.contains(['{', '}']) {
        errors.push(ValidationError::new(field, "must not contain path variables"));
    }
    if path.trim_matches('/').is_empty() {
        errors.push(ValidationError::new(field, "must not be the root path"));
    }
}
