//! Request ID propagation.
//!
//! # Responsibilities
//! - Reuse an incoming `x-request-id` header, or generate a UUID v4
//! - Expose the ID to inner handlers via request extensions
//! - Echo the ID on the response
//!
//! # Design Decisions
//! - Applied as early as possible so every log line can carry the ID
//! - Invalid header values are replaced, not rejected

use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

use super::Middleware;
use crate::handler::Handler;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request ID assigned to the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdValue(pub String);

impl RequestIdValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Middleware assigning a request ID to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestId;

impl Middleware for RequestId {
    fn wrap(&self, inner: Handler) -> Handler {
        Handler::from_fn(move |mut req| {
            let inner = inner.clone();
            async move {
                let id = req
                    .headers()
                    .get(&X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());

                // A UUID is always a valid header value; an echoed one already was.
                let header = HeaderValue::from_str(&id).ok();
                if let Some(value) = &header {
                    req.headers_mut().insert(X_REQUEST_ID, value.clone());
                }
                req.extensions_mut().insert(RequestIdValue(id));

                let mut res = inner.call(req).await;
                if let Some(value) = header {
                    res.headers_mut().insert(X_REQUEST_ID, value);
                }
                res
            }
        })
    }
}
