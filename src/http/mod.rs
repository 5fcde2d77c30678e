//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → contact::handler (POST contact endpoint)
//!     → ServeDir fallback for the static site
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
