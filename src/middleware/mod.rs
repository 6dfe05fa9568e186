//! Middleware subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup):
//!     Router chain [m0, m1, ..., mN-1] + terminal handler h
//!     → chain.rs (fold right-to-left)
//!     → m0(m1(...mN-1(h)))  stored in the route table
//!
//! Request time:
//!     m0 before → m1 before → ... → h → ... → m1 after → m0 after
//! ```
//!
//! # Design Decisions
//! - A middleware is anything implementing [`Middleware::wrap`]
//! - Composition happens once per route, never per request
//! - Chains are persistent lists: appending shares the existing prefix

pub mod auth;
pub mod chain;
pub mod inject;
pub mod logging;
pub mod request_id;

use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

use crate::handler::Handler;

pub use auth::BearerAuth;
pub use chain::Chain;
pub use inject::Inject;
pub use logging::RequestLogger;
pub use request_id::{RequestId, RequestIdValue, X_REQUEST_ID};

/// A handler transform.
///
/// Given the inner handler, return an outer handler that may run logic
/// before and after delegating to it, or not delegate at all.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, inner: Handler) -> Handler;
}

/// The remainder of the chain, as seen from inside a [`from_fn`] middleware.
#[derive(Clone, Debug)]
pub struct Next {
    inner: Handler,
}

impl Next {
    /// Run the rest of the chain and the terminal handler.
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

/// Middleware built from an async function.
///
/// # Example
/// ```rust,ignore
/// let timing = middleware::from_fn(|req, next: Next| async move {
///     let started = Instant::now();
///     let res = next.run(req).await;
///     tracing::info!(elapsed = ?started.elapsed(), "done");
///     res
/// });
/// ```
pub struct FromFn<F> {
    f: Arc<F>,
}

pub fn from_fn<F, Fut, R>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    FromFn { f: Arc::new(f) }
}

impl<F, Fut, R> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn wrap(&self, inner: Handler) -> Handler {
        let f = self.f.clone();
        Handler::from_fn(move |req| {
            let next = Next {
                inner: inner.clone(),
            };
            f(req, next)
        })
    }
}
