//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and middleware produce:
//!     → tracing events (registration, resolution, access logs)
//!     → logging.rs (subscriber: filter + formatter)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than interpolated strings
//! - Request ID flows through request extensions into access logs
//! - Filter configurable via config, overridable by `RUST_LOG`

pub mod logging;

pub use logging::init;
