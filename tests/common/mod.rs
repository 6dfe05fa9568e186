//! Shared utilities for router integration tests.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use scoped_mux::{from_fn, Middleware, Next, Router};

/// Ordered record of side effects, shared between middleware and handlers.
pub type Log = Arc<Mutex<Vec<String>>>;

#[allow(dead_code)]
pub fn new_log() -> Log {
    Arc::default()
}

#[allow(dead_code)]
pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Middleware recording `[tag]` before delegating.
#[allow(dead_code)]
pub fn tag(log: &Log, tag: &'static str) -> impl Middleware {
    let log = log.clone();
    from_fn(move |req: Request, next: Next| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(format!("[{tag}]"));
            next.run(req).await
        }
    })
}

/// Middleware recording `tag>` before and `<tag` after the inner handler.
#[allow(dead_code)]
pub fn around(log: &Log, tag: &'static str) -> impl Middleware {
    let log = log.clone();
    from_fn(move |req: Request, next: Next| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(format!("{tag}>"));
            let res = next.run(req).await;
            log.lock().unwrap().push(format!("<{tag}"));
            res
        }
    })
}

#[allow(dead_code)]
pub fn request(method: Method, uri: &str) -> Request {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Dispatch a bodiless request and collect status and body text.
#[allow(dead_code)]
pub async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let res = router.dispatch(request(method, uri)).await;
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
