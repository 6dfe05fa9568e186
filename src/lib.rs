//! Scoped HTTP request router with ordered middleware composition.
//!
//! A [`Router`] maps (method, path) to one handler that was wrapped, at
//! registration time, in the middleware chain of its scope. Sub-routers
//! scope registrations under a path prefix and inherit a snapshot of their
//! parent's chain.

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::Config;
pub use error::RouterError;
pub use handler::Handler;
pub use http::HttpServer;
pub use middleware::{from_fn, Chain, Middleware, Next};
pub use routing::{PathParams, Router};
