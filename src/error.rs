//! Error types for route registration.
//!
//! Dispatch itself never fails: an unmatched request resolves to the
//! not-found handler. Everything here is a startup-time misconfiguration.

use axum::http::Method;

/// Misconfiguration detected while building a route tree.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The method is not one of the nine standard HTTP methods.
    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(Method),

    /// The pattern was rejected by the path matcher.
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    /// A route pattern must start with `/`.
    #[error("route pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    /// A sub-router prefix is not a plain `/segment[/segment...]` path.
    #[error("invalid sub-router prefix `{prefix}`: {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },

    /// Another sub-router is already mounted at this prefix.
    #[error("a sub-router is already mounted at `{0}`")]
    PrefixConflict(String),
}
