//! Per-request access logging.

use std::time::Instant;

use super::Middleware;
use crate::handler::Handler;

/// Logs method, path, status and latency once the inner handler returns.
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    scope: Option<String>,
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every log line with a scope name (e.g. `"api"`).
    pub fn scoped(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
        }
    }
}

impl Middleware for RequestLogger {
    fn wrap(&self, inner: Handler) -> Handler {
        let scope = self.scope.clone().unwrap_or_default();
        Handler::from_fn(move |req| {
            let inner = inner.clone();
            let scope = scope.clone();
            async move {
                let start = Instant::now();
                let method = req.method().clone();
                let path = req.uri().path().to_string();

                let res = inner.call(req).await;

                tracing::info!(
                    scope = %scope,
                    method = %method,
                    path = %path,
                    status = res.status().as_u16(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Request handled"
                );
                res
            }
        })
    }
}
