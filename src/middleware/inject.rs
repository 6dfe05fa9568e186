//! Context injection through request extensions.

use super::Middleware;
use crate::handler::Handler;

/// Inserts a clone of `T` into every request's extensions.
///
/// Handlers read it back with `req.extensions().get::<T>()`.
#[derive(Debug, Clone)]
pub struct Inject<T> {
    value: T,
}

impl<T> Inject<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Middleware for Inject<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn wrap(&self, inner: Handler) -> Handler {
        let value = self.value.clone();
        Handler::from_fn(move |mut req| {
            req.extensions_mut().insert(value.clone());
            inner.call(req)
        })
    }
}
