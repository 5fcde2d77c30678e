//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address, static files).
    pub listener: ListenerConfig,

    /// Contact endpoint settings.
    pub contact: ContactConfig,

    /// Outgoing mail transport.
    pub mail: MailConfig,

    /// Lazy image loading settings.
    pub lazy_loading: LazyLoadConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Directory served for every path the router does not handle.
    pub static_root: Option<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            static_root: None,
        }
    }
}

/// Contact form endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Path the form posts to.
    pub endpoint_path: String,

    /// Address every submission is delivered to.
    pub admin_email: String,

    /// Maximum message length in characters (inclusive).
    pub max_message_length: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/contact".to_string(),
            admin_email: "admin@example.com".to_string(),
            max_message_length: 3000,
        }
    }
}

/// Mail transport selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Pipe messages to a local sendmail binary.
    Sendmail,
    /// Only log messages (development).
    Log,
}

/// Outgoing mail configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransport,

    /// Path to the sendmail-compatible binary.
    pub sendmail_path: String,

    /// Value of the `X-Mailer` header.
    pub x_mailer: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::Log,
            sendmail_path: "/usr/sbin/sendmail".to_string(),
            x_mailer: format!("folio-site/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Lazy image loading configuration.
///
/// Immutable once a loader is built from it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LazyLoadConfig {
    /// Margin around the viewport, CSS shorthand (e.g. "50px 0px").
    pub root_margin: String,

    /// Minimum visible ratio before a load starts.
    pub threshold: f64,

    /// Class applied while an image waits or loads.
    pub loading_class: String,

    /// Class applied once the real source is displayed.
    pub loaded_class: String,

    /// Class applied after retries are exhausted.
    pub error_class: String,

    /// Selector matching deferred images.
    pub selector: String,

    /// Source shown before the real image loads.
    pub placeholder_src: String,

    /// Retries after the first failed attempt.
    pub max_retries: u32,

    /// Linear backoff unit in milliseconds.
    pub retry_base_ms: u64,

    /// Per-attempt fetch timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Base URL relative image sources are resolved against.
    pub base_url: String,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self {
            root_margin: "50px 0px".to_string(),
            threshold: 0.01,
            loading_class: "loading".to_string(),
            loaded_class: "loaded".to_string(),
            error_class: "error".to_string(),
            selector: ".lazy-image".to_string(),
            placeholder_src: "assets/images/placeholder.jpg".to_string(),
            max_retries: 3,
            retry_base_ms: 1000,
            fetch_timeout_secs: 10,
            base_url: "http://localhost:8080/".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [contact]
            admin_email = "me@folio.dev"

            [lazy_loading]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.contact.admin_email, "me@folio.dev");
        assert_eq!(config.contact.max_message_length, 3000);
        assert_eq!(config.lazy_loading.max_retries, 5);
        assert_eq!(config.lazy_loading.retry_base_ms, 1000);
        assert_eq!(config.lazy_loading.selector, ".lazy-image");
        assert_eq!(config.mail.transport, MailTransport::Log);
    }

    #[test]
    fn test_mail_transport_names() {
        let config: MailConfig = toml::from_str(r#"transport = "sendmail""#).unwrap();
        assert_eq!(config.transport, MailTransport::Sendmail);
    }
}
