//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → cloned into the HTTP server and the lazy loader
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::ContactConfig;
pub use schema::LazyLoadConfig;
pub use schema::ListenerConfig;
pub use schema::MailConfig;
pub use schema::MailTransport;
pub use schema::ObservabilityConfig;
pub use schema::SiteConfig;
