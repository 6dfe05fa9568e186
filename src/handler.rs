//! Type-erased request handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

type BoxedFn = dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync;

/// A composed or terminal request handler.
///
/// Cloning is a reference-count bump; the callable itself is immutable once
/// built, which is what lets a registered route be shared by every request.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<BoxedFn>,
}

impl Handler {
    /// Build a handler from an async function returning anything that
    /// converts into a response.
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        Self {
            inner: Arc::new(move |req| f(req).map(IntoResponse::into_response).boxed()),
        }
    }

    /// Invoke the handler.
    pub fn call(&self, req: Request) -> BoxFuture<'static, Response> {
        (self.inner)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
