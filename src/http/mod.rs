//! HTTP transport wiring.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, HTTP/1.1 + HTTP/2)
//!     → tower-http layers (trace, timeout)
//!     → routing::Router as the fallback service
//!     → composed handler
//! ```

pub mod server;

pub use server::{shutdown_signal, HttpServer};
