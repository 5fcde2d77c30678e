//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Image preload fails
//!     → lazy::coordinator checks the retry ledger
//!     → backoff.rs (linear delay for the next attempt)
//! ```

pub mod backoff;
