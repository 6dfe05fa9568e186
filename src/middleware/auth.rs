//! Bearer token authentication.

use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use super::Middleware;
use crate::handler::Handler;

/// Rejects requests whose `Authorization` header is not `Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    expected: Arc<str>,
}

impl BearerAuth {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            expected: format!("Bearer {}", token.as_ref()).into(),
        }
    }
}

impl Middleware for BearerAuth {
    fn wrap(&self, inner: Handler) -> Handler {
        let expected = self.expected.clone();
        Handler::from_fn(move |req| {
            let inner = inner.clone();
            let authorized = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .is_some_and(|v| v == &*expected);
            async move {
                if authorized {
                    return inner.call(req).await;
                }
                tracing::warn!(path = %req.uri().path(), "Rejected unauthenticated request");
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
        })
    }
}
