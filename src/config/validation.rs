//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SiteConfig;
use crate::contact::form::is_valid_email;
use crate::page::geometry::RootMargin;
use crate::page::selector::Selector;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("contact.admin_email: {0:?} is not a valid address")]
    InvalidAdminEmail(String),

    #[error("contact.endpoint_path must start with '/' (got {0:?})")]
    InvalidEndpointPath(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("lazy_loading.threshold must be within 0.0..=1.0 (got {0})")]
    ThresholdOutOfRange(f64),

    #[error("lazy_loading.root_margin: {0}")]
    RootMargin(String),

    #[error("lazy_loading.selector: {0}")]
    Selector(String),

    #[error("lazy_loading.base_url: {0}")]
    BaseUrl(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if !is_valid_email(&config.contact.admin_email) {
        errors.push(ValidationError::InvalidAdminEmail(config.contact.admin_email.clone()));
    }
    if !config.contact.endpoint_path.starts_with('/') {
        errors.push(ValidationError::InvalidEndpointPath(config.contact.endpoint_path.clone()));
    }
    if config.contact.max_message_length == 0 {
        errors.push(ValidationError::Zero { field: "contact.max_message_length" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero { field: "security.max_body_size" });
    }

    let lazy = &config.lazy_loading;
    if !(0.0..=1.0).contains(&lazy.threshold) {
        errors.push(ValidationError::ThresholdOutOfRange(lazy.threshold));
    }
    if let Err(e) = lazy.root_margin.parse::<RootMargin>() {
        errors.push(ValidationError::RootMargin(e.to_string()));
    }
    if let Err(e) = lazy.selector.parse::<Selector>() {
        errors.push(ValidationError::Selector(e.to_string()));
    }
    if let Err(e) = url::Url::parse(&lazy.base_url) {
        errors.push(ValidationError::BaseUrl(e.to_string()));
    }
    if lazy.fetch_timeout_secs == 0 {
        errors.push(ValidationError::Zero { field: "lazy_loading.fetch_timeout_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
