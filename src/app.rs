//! The route tree served by the binary.
//!
//! ```text
//! /                      GET   index
//! /health                GET   liveness probe
//! /api                   (RequestId, RequestLogger)
//!     /users             GET   list, POST create
//!     /users/{id}        GET   show
//!     /admin             (+ BearerAuth, only when auth.api_token is set)
//!         /status        GET   system status
//!         /routes        GET   registered routes
//! *                      JSON not-found
//! ```

use std::sync::{Arc, OnceLock};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::config::Config;
use crate::middleware::{BearerAuth, Inject, RequestId, RequestIdValue, RequestLogger};
use crate::routing::{PathParams, Router};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
}

#[derive(Serialize)]
struct User {
    id: u64,
    name: &'static str,
}

const USERS: [User; 2] = [
    User { id: 1, name: "alice" },
    User { id: 2, name: "bob" },
];

/// The full route table, injected into admin handlers. Filled once the
/// tree is complete so it includes the admin routes themselves.
#[derive(Clone, Default)]
struct RouteListing(Arc<OnceLock<Vec<String>>>);

impl RouteListing {
    fn routes(&self) -> &[String] {
        self.0.get().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Build the demo route tree from configuration.
pub fn build_router(config: &Config) -> Router {
    let mut root = Router::new();
    root.get("/", |_req| async { "scoped-mux" })
        .get("/health", |_req| async { "ok" })
        .not_found(not_found);

    let mut api = root.subrouter("/api");
    api.add_global_middleware(RequestId)
        .add_global_middleware(RequestLogger::scoped("api"));
    api.get("/users", |_req| async { Json(USERS) })
        .post("/users", |_req| async { StatusCode::CREATED })
        .get("/users/{id}", show_user)
        .not_found(not_found);

    let listing = RouteListing::default();
    if let Some(token) = &config.auth.api_token {
        let mut admin = api
            .subrouter("/admin")
            .add_middleware(BearerAuth::new(token))
            .add_middleware(Inject::new(listing.clone()));
        admin
            .get("/status", get_status)
            .get("/routes", get_routes);
    }

    listing.0.get_or_init(|| root.routes());
    root
}

async fn show_user(req: Request) -> impl IntoResponse {
    let id = req
        .extensions()
        .get::<PathParams>()
        .and_then(|p| p.get("id"))
        .and_then(|id| id.parse::<u64>().ok());

    match id.and_then(|id| USERS.into_iter().find(|u| u.id == id)) {
        Some(user) => Json(user).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_status(req: Request) -> Json<SystemStatus> {
    let routes = req
        .extensions()
        .get::<RouteListing>()
        .map_or(0, |l| l.routes().len());

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes,
    })
}

async fn get_routes(req: Request) -> Json<Vec<String>> {
    Json(
        req.extensions()
            .get::<RouteListing>()
            .map(|l| l.routes().to_vec())
            .unwrap_or_default(),
    )
}

async fn not_found(req: Request) -> impl IntoResponse {
    let request_id = req
        .extensions()
        .get::<RequestIdValue>()
        .map(|id| id.as_str().to_string());

    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "not found",
            "path": req.uri().path(),
            "request_id": request_id,
        })),
    )
}
