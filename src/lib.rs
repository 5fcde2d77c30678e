//! Portfolio site backend: the contact form endpoint and its client, and
//! the lazy image loading pipeline.

pub mod config;
pub mod contact;
pub mod http;
pub mod lazy;
pub mod lifecycle;
pub mod observability;
pub mod page;
pub mod resilience;

pub use config::SiteConfig;
pub use http::HttpServer;
pub use lazy::LazyLoader;
pub use lifecycle::Shutdown;
