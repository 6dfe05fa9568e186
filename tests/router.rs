//! Router composition, scoping and dispatch tests.

use axum::extract::{OriginalUri, Request};
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use scoped_mux::{from_fn, Next, PathParams, Router};
use tower::ServiceExt;

mod common;

use common::{around, entries, new_log, send, tag};

#[tokio::test]
async fn test_get_route_and_missing_method() {
    let mut router = Router::new();
    router.get("/path", |_req| async { "GET / HTTPMethod" });

    let (status, body) = send(&router, Method::GET, "/path").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "GET / HTTPMethod");

    let (status, _) = send(&router, Method::POST, "/path").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_every_method_registers() {
    let mut router = Router::new();
    router
        .get("/m", |_req| async { "GET" })
        .head("/m", |_req| async { "HEAD" })
        .post("/m", |_req| async { "POST" })
        .put("/m", |_req| async { "PUT" })
        .patch("/m", |_req| async { "PATCH" })
        .delete("/m", |_req| async { "DELETE" })
        .options("/m", |_req| async { "OPTIONS" })
        .connect("/m", |_req| async { "CONNECT" })
        .trace("/m", |_req| async { "TRACE" });

    for method in scoped_mux::routing::SUPPORTED_METHODS {
        let (status, body) = send(&router, method.clone(), "/m").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, method.as_str());
    }
}

#[tokio::test]
async fn test_middleware_runs_in_registration_order() {
    let log = new_log();
    let mut router = Router::new();
    router
        .add_global_middleware(around(&log, "m0"))
        .add_global_middleware(around(&log, "m1"))
        .add_global_middleware(around(&log, "m2"));

    let handler_log = log.clone();
    router.get("/", move |_req| {
        let log = handler_log.clone();
        async move {
            log.lock().unwrap().push("h".to_string());
            "done"
        }
    });

    send(&router, Method::GET, "/").await;
    assert_eq!(
        entries(&log),
        vec!["m0>", "m1>", "m2>", "h", "<m2", "<m1", "<m0"]
    );
}

#[tokio::test]
async fn test_reregistration_overwrites() {
    let mut router = Router::new();
    router.get("/v", |_req| async { "first" });
    router.get("/v", |_req| async { "second" });

    let (_, body) = send(&router, Method::GET, "/v").await;
    assert_eq!(body, "second");
    assert_eq!(router.routes(), vec!["GET /v"]);
}

#[tokio::test]
async fn test_global_middleware_is_not_retroactive() {
    let log = new_log();
    let mut router = Router::new();
    router.get("/before", |_req| async { "before" });
    router.add_global_middleware(tag(&log, "late"));
    router.get("/after", |_req| async { "after" });

    send(&router, Method::GET, "/before").await;
    assert!(entries(&log).is_empty());

    send(&router, Method::GET, "/after").await;
    assert_eq!(entries(&log), vec!["[late]"]);
}

#[tokio::test]
async fn test_branch_isolation() {
    let log = new_log();
    let mut root = Router::new();
    root.add_global_middleware(tag(&log, "root"));

    let mut branch = root.add_middleware(tag(&log, "branch"));
    branch.get("/branch", |_req| async { "b" });
    root.get("/root", |_req| async { "r" });

    // Both live in the shared table.
    send(&root, Method::GET, "/branch").await;
    assert_eq!(entries(&log), vec!["[root]", "[branch]"]);

    log.lock().unwrap().clear();
    send(&branch, Method::GET, "/root").await;
    assert_eq!(entries(&log), vec!["[root]"]);

    // Appending to the root does not reach the branch, and vice versa.
    log.lock().unwrap().clear();
    root.add_global_middleware(tag(&log, "root-late"));
    branch.get("/branch2", |_req| async { "b2" });
    send(&root, Method::GET, "/branch2").await;
    assert_eq!(entries(&log), vec!["[root]", "[branch]"]);

    log.lock().unwrap().clear();
    branch.add_global_middleware(tag(&log, "branch-late"));
    root.get("/root2", |_req| async { "r2" });
    send(&root, Method::GET, "/root2").await;
    assert_eq!(entries(&log), vec!["[root]", "[root-late]"]);
}

#[tokio::test]
async fn test_subrouter_strips_prefix() {
    let mut root = Router::new();
    let mut api = root.subrouter("/api");
    api.get("/users", |req: Request| async move { req.uri().path().to_string() })
        .get("/", |_req| async { "api index" });
    root.get("/other", |_req| async { "other" });

    let (status, body) = send(&root, Method::GET, "/api/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "/users");

    let (_, body) = send(&root, Method::GET, "/api").await;
    assert_eq!(body, "api index");

    let (_, body) = send(&root, Method::GET, "/other").await;
    assert_eq!(body, "other");

    let (status, _) = send(&root, Method::GET, "/apiusers").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subrouter_preserves_query_and_original_uri() {
    let root = Router::new();
    let mut api = root.subrouter("/api");
    api.get("/search", |req: Request| async move {
        let original = req
            .extensions()
            .get::<OriginalUri>()
            .map(|u| u.0.to_string())
            .unwrap_or_default();
        format!("{} {}", req.uri(), original)
    });

    let (_, body) = send(&root, Method::GET, "/api/search?q=rust").await;
    assert_eq!(body, "/search?q=rust /api/search?q=rust");
}

#[tokio::test]
async fn test_inherited_middleware_runs_once() {
    let log = new_log();
    let mut a = Router::new();
    a.add_global_middleware(tag(&log, "M1"));

    let mut b = a.subrouter("/b");
    b.get("/x", |_req| async { "x" });

    let (status, _) = send(&b, Method::GET, "/x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries(&log), vec!["[M1]"]);

    log.lock().unwrap().clear();
    send(&a, Method::GET, "/b/x").await;
    assert_eq!(entries(&log), vec!["[M1]"]);
}

#[tokio::test]
async fn test_subrouter_snapshots_parent_chain() {
    let log = new_log();
    let mut parent = Router::new();
    parent.add_global_middleware(tag(&log, "early"));
    let mut child = parent.subrouter("/child");
    parent.add_global_middleware(tag(&log, "late"));

    child.get("/x", |_req| async { "x" });
    send(&parent, Method::GET, "/child/x").await;
    assert_eq!(entries(&log), vec!["[early]"]);

    log.lock().unwrap().clear();
    child.add_global_middleware(tag(&log, "child"));
    parent.get("/y", |_req| async { "y" });
    send(&parent, Method::GET, "/y").await;
    assert_eq!(entries(&log), vec!["[early]", "[late]"]);
}

#[tokio::test]
async fn test_nested_subrouters_compose_transitively() {
    let log = new_log();
    let mut root = Router::new();
    root.add_global_middleware(tag(&log, "root"));

    let mut v1 = root.subrouter("/api").subrouter("/v1");
    v1.add_global_middleware(tag(&log, "v1"));
    v1.get("/items/{id}", |req: Request| async move {
        let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
        format!("{} {}", req.uri().path(), params.get("id").unwrap_or("-"))
    });

    let (_, body) = send(&root, Method::GET, "/api/v1/items/9").await;
    assert_eq!(body, "/items/9 9");
    assert_eq!(entries(&log), vec!["[root]", "[v1]"]);
}

#[tokio::test]
async fn test_not_found_handlers() {
    let log = new_log();
    let mut root = Router::new();

    let (status, body) = send(&root, Method::GET, "/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 page not found");

    root.add_global_middleware(tag(&log, "nf"));
    root.not_found(|req: Request| async move {
        (StatusCode::NOT_FOUND, format!("no {}", req.uri().path()))
    });

    let (status, body) = send(&root, Method::GET, "/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "no /missing");
    assert_eq!(entries(&log), vec!["[nf]"]);

    // A sub-router without its own handler falls back to the default.
    let mut api = root.subrouter("/api");
    let (_, body) = send(&root, Method::GET, "/api/missing").await;
    assert_eq!(body, "404 page not found");

    api.not_found(|_req| async { (StatusCode::NOT_FOUND, "api miss") });
    let (_, body) = send(&root, Method::GET, "/api/missing").await;
    assert_eq!(body, "api miss");
}

#[tokio::test]
async fn test_not_found_not_retroactive() {
    let log = new_log();
    let mut router = Router::new();
    router.not_found(|_req| async { (StatusCode::NOT_FOUND, "miss") });
    router.add_global_middleware(tag(&log, "late"));

    let (status, body) = send(&router, Method::GET, "/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "miss");
    assert!(entries(&log).is_empty());

    // Registering again composes with the chain as it stands now.
    router.not_found(|_req| async { (StatusCode::NOT_FOUND, "miss again") });
    let (_, body) = send(&router, Method::GET, "/missing").await;
    assert_eq!(body, "miss again");
    assert_eq!(entries(&log), vec!["[late]"]);
}

#[tokio::test]
async fn test_branch_shares_not_found() {
    let log = new_log();
    let root = Router::new();
    let mut branch = root.add_middleware(tag(&log, "branch"));
    branch.not_found(|_req| async { (StatusCode::NOT_FOUND, "branch miss") });

    let (status, body) = send(&root, Method::GET, "/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "branch miss");
    assert_eq!(entries(&log), vec!["[branch]"]);
}

#[tokio::test]
async fn test_short_circuit_stops_request() {
    let log = new_log();
    let mut router = Router::new();
    router.add_global_middleware(from_fn(|req: Request, next: Next| async move {
        if req.headers().contains_key("x-allow") {
            next.run(req).await
        } else {
            StatusCode::FORBIDDEN.into_response()
        }
    }));
    router.add_global_middleware(tag(&log, "inner"));
    router.get("/secret", |_req| async { "secret" });

    let (status, _) = send(&router, Method::GET, "/secret").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(entries(&log).is_empty());
}

#[tokio::test]
async fn test_head_served_by_get_route() {
    let mut router = Router::new();
    router.get("/page", |_req| async { "page" });

    let (status, _) = send(&router, Method::HEAD, "/page").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_router_as_tower_service() {
    let mut router = Router::new();
    router.get("/svc", |_req| async { "via service" });

    let res = router
        .clone()
        .oneshot(common::request(Method::GET, "/svc"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = router
        .oneshot(common::request(Method::GET, "/nope"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_after_mount_is_visible() {
    let root = Router::new();
    let mut api = root.subrouter("/api");

    let (status, _) = send(&root, Method::GET, "/api/late").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    api.get("/late", |_req| async { "late" });
    let (status, body) = send(&root, Method::GET, "/api/late").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "late");
}

#[test]
#[should_panic(expected = "already mounted")]
fn test_duplicate_subrouter_panics() {
    let root = Router::new();
    let _a = root.subrouter("/api");
    let _b = root.subrouter("/api");
}
