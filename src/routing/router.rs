//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Compose handlers with the router's middleware at registration time
//! - Store composed handlers in the scope's dispatch table
//! - Branch (`add_middleware`) or extend (`add_global_middleware`) the chain
//! - Create prefix-scoped sub-routers
//! - Dispatch requests as a pure lookup-and-invoke
//!
//! # Design Decisions
//! - A registered route never changes behaviour when middleware is added later
//! - Branches share the dispatch table but own their chain
//! - Sub-routers snapshot the parent's chain at creation time
//! - Misconfiguration panics at startup; `try_*` variants return the error

use std::convert::Infallible;
use std::future::Future;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use super::table::Scope;
use crate::error::RouterError;
use crate::handler::Handler;
use crate::middleware::{Chain, Middleware};

/// Methods accepted by [`Router::route`].
pub const SUPPORTED_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

/// A routing scope: a dispatch table plus an ordered middleware chain.
///
/// # Example
/// ```rust,ignore
/// let mut router = Router::new();
/// router.add_global_middleware(RequestLogger::new());
/// router.get("/health", |_req| async { "ok" });
///
/// let mut api = router.subrouter("/api");
/// api.get("/users/{id}", show_user);
///
/// let mut admin = api.add_middleware(BearerAuth::new(token));
/// admin.delete("/users/{id}", delete_user);
/// ```
#[derive(Clone, Default)]
pub struct Router {
    scope: Scope,
    chain: Chain,
}

macro_rules! method_routes {
    ($($(#[$doc:meta])* $name:ident => $method:ident;)+) => {
        $(
            $(#[$doc])*
            ///
            /// # Panics
            /// If the pattern is rejected by the path matcher.
            pub fn $name<H, Fut, R>(&mut self, pattern: &str, handler: H) -> &mut Self
            where
                H: Fn(Request) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = R> + Send + 'static,
                R: IntoResponse + 'static,
            {
                self.route(Method::$method, pattern, handler)
            }
        )+
    };
}

impl Router {
    /// An empty router with no middleware.
    pub fn new() -> Self {
        Self {
            scope: Scope::new(),
            chain: Chain::new(),
        }
    }

    method_routes! {
        /// Register a GET handler. It also answers HEAD unless a HEAD route exists.
        get => GET;
        /// Register a HEAD handler.
        head => HEAD;
        /// Register a POST handler.
        post => POST;
        /// Register a PUT handler.
        put => PUT;
        /// Register a PATCH handler.
        patch => PATCH;
        /// Register a DELETE handler.
        delete => DELETE;
        /// Register an OPTIONS handler.
        options => OPTIONS;
        /// Register a CONNECT handler.
        connect => CONNECT;
        /// Register a TRACE handler.
        trace => TRACE;
    }

    /// Register a handler for an arbitrary supported method.
    ///
    /// # Panics
    /// If the method is unsupported or the pattern is rejected.
    pub fn route<H, Fut, R>(&mut self, method: Method, pattern: &str, handler: H) -> &mut Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        if let Err(err) = self.try_route(method, pattern, handler) {
            panic!("{err}");
        }
        self
    }

    /// Register a handler, returning the misconfiguration instead of panicking.
    pub fn try_route<H, Fut, R>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RouterError>
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        if !SUPPORTED_METHODS.contains(&method) {
            return Err(RouterError::UnsupportedMethod(method));
        }

        let composed = self.chain.compose(Handler::from_fn(handler));
        let replaced = self
            .scope
            .update(|table| table.insert_route(&method, pattern, composed))?;

        tracing::debug!(
            method = %method,
            pattern = %pattern,
            middleware = self.chain.len(),
            replaced,
            "Route registered"
        );
        Ok(self)
    }

    /// Register the handler invoked when nothing in this scope matches.
    ///
    /// Composed with the middleware chain as it stands now.
    pub fn not_found<H, Fut, R>(&mut self, handler: H) -> &mut Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        let composed = self.chain.compose(Handler::from_fn(handler));
        self.scope.update_with(|table| table.set_not_found(composed));
        tracing::debug!(middleware = self.chain.len(), "Not-found handler registered");
        self
    }

    /// Branch: a router sharing this dispatch table with `middleware`
    /// appended to a copy of the chain. `self` is unchanged.
    pub fn add_middleware<M: Middleware>(&self, middleware: M) -> Router {
        Router {
            scope: self.scope.clone(),
            chain: self.chain.push(middleware),
        }
    }

    /// Append `middleware` to this router's chain.
    ///
    /// Affects routes registered from now on, never routes already registered.
    pub fn add_global_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.chain = self.chain.push(middleware);
        self
    }

    /// Create a sub-router handling every path under `prefix`.
    ///
    /// # Panics
    /// If the prefix is malformed or already mounted.
    pub fn subrouter(&self, prefix: &str) -> Router {
        match self.try_subrouter(prefix) {
            Ok(router) => router,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create a sub-router, returning the misconfiguration instead of panicking.
    ///
    /// The child starts with a snapshot of this router's chain and its own
    /// empty dispatch table. Requests for `prefix` or `prefix/...` are
    /// delegated to it with the prefix stripped.
    pub fn try_subrouter(&self, prefix: &str) -> Result<Router, RouterError> {
        validate_prefix(prefix)?;

        let child = Scope::new();
        self.scope
            .update(|table| table.mount(prefix, child.clone()))?;

        tracing::debug!(prefix = %prefix, middleware = self.chain.len(), "Sub-router mounted");
        Ok(Router {
            scope: child,
            chain: self.chain.clone(),
        })
    }

    /// The middleware chain new registrations on this router are composed with.
    pub fn middleware(&self) -> &Chain {
        &self.chain
    }

    /// Every registered route as `"METHOD /path"`, sub-router routes included.
    pub fn routes(&self) -> Vec<String> {
        self.scope.routes()
    }

    /// Resolve `req` to one composed handler and invoke it.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let handler = self.scope.resolve(&mut req);
        handler.call(req).await
    }
}

fn validate_prefix(prefix: &str) -> Result<(), RouterError> {
    let invalid = |reason| {
        Err(RouterError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason,
        })
    };

    if !prefix.starts_with('/') {
        return invalid("must start with `/`");
    }
    if prefix.len() == 1 {
        return invalid("must not be the root path");
    }
    if prefix.ends_with('/') {
        return invalid("must not end with `/`");
    }
    if prefix.contains(['{', '}', '*']) {
        return invalid("must not contain pattern syntax");
    }
    if prefix.contains("//") {
        return invalid("must not contain empty segments");
    }
    Ok(())
}

impl tower::Service<Request> for Router {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let handler = self.scope.resolve(&mut req);
        handler.call(req).map(Ok).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("/api").is_ok());
        assert!(validate_prefix("/api/v1").is_ok());

        for bad in ["api", "/", "/api/", "/{id}", "/a//b", "/files/*"] {
            assert!(
                matches!(validate_prefix(bad), Err(RouterError::InvalidPrefix { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let mut router = Router::new();
        let method = Method::from_bytes(b"PURGE").unwrap();
        let err = router.try_route(method, "/cache", |_req| async { "purged" });
        assert!(matches!(err, Err(RouterError::UnsupportedMethod(_))));
    }

    #[test]
    #[should_panic(expected = "must start with `/`")]
    fn test_bad_pattern_panics() {
        Router::new().get("users", |_req| async { "" });
    }

    #[test]
    fn test_branch_shares_table_not_chain() {
        let root = Router::new();
        let mut branch = root.add_middleware(crate::middleware::RequestId);
        branch.get("/x", |_req| async { "x" });

        assert_eq!(root.middleware().len(), 0);
        assert_eq!(branch.middleware().len(), 1);
        assert_eq!(root.routes(), vec!["GET /x"]);
    }

    #[test]
    fn test_routes_include_subrouters() {
        let mut root = Router::new();
        root.get("/", |_req| async { "" });
        let mut api = root.subrouter("/api");
        api.post("/users", |_req| async { "" });

        assert_eq!(root.routes(), vec!["GET /", "POST /api/users"]);
    }
}
