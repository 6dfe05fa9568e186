//! Dispatch tables and request resolution.
//!
//! # Responsibilities
//! - Map (method, pattern) to a composed handler via a radix tree per method
//! - Hold prefix mounts that delegate a path subtree to a child table
//! - Resolve a request to exactly one handler, stripping mount prefixes
//!
//! # Design Decisions
//! - Tables are copy-on-write snapshots behind `ArcSwap`: lookups never lock
//! - Re-registering an identical pattern replaces its slot in place
//! - Route vs. mount: the longer literal prefix wins, ties go to the route
//! - HEAD falls back to the GET route when no HEAD route matches

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use arc_swap::ArcSwap;
use axum::extract::{OriginalUri, Request};
use axum::http::uri::PathAndQuery;
use axum::http::{Method, StatusCode, Uri};

use crate::error::RouterError;
use crate::handler::Handler;

/// Parameters captured by the matched route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Value of the named parameter, if the pattern captured it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone)]
struct Slot {
    pattern: String,
    literal_len: usize,
    handler: Handler,
}

/// Routes registered for one HTTP method.
#[derive(Clone, Default)]
struct MethodRoutes {
    matcher: matchit::Router<usize>,
    slots: Vec<Slot>,
    by_pattern: HashMap<String, usize>,
}

impl MethodRoutes {
    /// Returns true if an existing route was replaced.
    fn insert(&mut self, pattern: &str, handler: Handler) -> Result<bool, RouterError> {
        if let Some(&idx) = self.by_pattern.get(pattern) {
            self.slots[idx].handler = handler;
            return Ok(true);
        }

        let idx = self.slots.len();
        self.matcher
            .insert(pattern, idx)
            .map_err(|source| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        self.slots.push(Slot {
            pattern: pattern.to_string(),
            literal_len: literal_prefix_len(pattern),
            handler,
        });
        self.by_pattern.insert(pattern.to_string(), idx);
        Ok(false)
    }

    fn at(&self, path: &str) -> Option<(&Slot, PathParams)> {
        let matched = self.matcher.at(path).ok()?;
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some((&self.slots[*matched.value], PathParams(params)))
    }
}

/// Length of the pattern before its first parameter. `{{` and `}}` are
/// escaped literal braces, not parameters.
fn literal_prefix_len(pattern: &str) -> usize {
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => i += 2,
            b'}' if bytes.get(i + 1) == Some(&b'}') => i += 2,
            b'{' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[derive(Clone)]
struct Mount {
    prefix: String,
    scope: Scope,
}

impl Mount {
    /// The path left for the child table, or None if `path` is outside the prefix.
    fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

/// One scope's dispatch table.
#[derive(Clone, Default)]
pub(crate) struct RouteTable {
    methods: HashMap<Method, MethodRoutes>,
    mounts: Vec<Mount>,
    not_found: Option<Handler>,
}

enum Lookup {
    Route {
        handler: Handler,
        pattern: String,
        params: PathParams,
    },
    Delegate {
        scope: Scope,
        prefix: String,
        rest: String,
    },
    NotFound(Option<Handler>),
}

impl RouteTable {
    pub(crate) fn insert_route(
        &mut self,
        method: &Method,
        pattern: &str,
        handler: Handler,
    ) -> Result<bool, RouterError> {
        if !pattern.starts_with('/') {
            return Err(RouterError::MissingLeadingSlash(pattern.to_string()));
        }
        self.methods
            .entry(method.clone())
            .or_default()
            .insert(pattern, handler)
    }

    pub(crate) fn mount(&mut self, prefix: &str, scope: Scope) -> Result<(), RouterError> {
        if self.mounts.iter().any(|m| m.prefix == prefix) {
            return Err(RouterError::PrefixConflict(prefix.to_string()));
        }
        self.mounts.push(Mount {
            prefix: prefix.to_string(),
            scope,
        });
        // Longest prefix first
        self.mounts.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(())
    }

    pub(crate) fn set_not_found(&mut self, handler: Handler) {
        self.not_found = Some(handler);
    }

    fn match_route(&self, method: &Method, path: &str) -> Option<(&Slot, PathParams)> {
        let found = self.methods.get(method).and_then(|r| r.at(path));
        if found.is_none() && *method == Method::HEAD {
            return self.methods.get(&Method::GET).and_then(|r| r.at(path));
        }
        found
    }

    fn match_mount<'a>(&self, path: &'a str) -> Option<(&Mount, &'a str)> {
        self.mounts
            .iter()
            .find_map(|m| m.strip(path).map(|rest| (m, rest)))
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let route = self.match_route(method, path);
        let mount = self.match_mount(path);

        match (route, mount) {
            (Some((slot, _)), Some((mount, rest))) if mount.prefix.len() > slot.literal_len => {
                Lookup::Delegate {
                    scope: mount.scope.clone(),
                    prefix: mount.prefix.clone(),
                    rest: rest.to_string(),
                }
            }
            (Some((slot, params)), _) => Lookup::Route {
                handler: slot.handler.clone(),
                pattern: slot.pattern.clone(),
                params,
            },
            (None, Some((mount, rest))) => Lookup::Delegate {
                scope: mount.scope.clone(),
                prefix: mount.prefix.clone(),
                rest: rest.to_string(),
            },
            (None, None) => Lookup::NotFound(self.not_found.clone()),
        }
    }

    fn collect_routes(&self, prefix: &str, out: &mut Vec<String>) {
        for (method, routes) in &self.methods {
            for slot in &routes.slots {
                out.push(format!("{} {}{}", method, prefix, slot.pattern));
            }
        }
        for mount in &self.mounts {
            let nested = format!("{}{}", prefix, mount.prefix);
            mount.scope.snapshot().collect_routes(&nested, out);
        }
    }
}

/// Shared handle to a dispatch table.
///
/// Every router value for the same scope (the original and its
/// `add_middleware` branches) holds a clone of the same handle.
#[derive(Clone, Default)]
pub(crate) struct Scope {
    table: Arc<ArcSwap<RouteTable>>,
    writer: Arc<Mutex<()>>,
}

impl Scope {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Apply `f` to a copy of the table and publish it if `f` succeeds.
    pub(crate) fn update<T>(
        &self,
        f: impl FnOnce(&mut RouteTable) -> Result<T, RouterError>,
    ) -> Result<T, RouterError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RouteTable::clone(&self.table.load());
        let out = f(&mut next)?;
        self.table.store(Arc::new(next));
        Ok(out)
    }

    /// Like [`Scope::update`] for changes that cannot fail.
    pub(crate) fn update_with(&self, f: impl FnOnce(&mut RouteTable)) {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RouteTable::clone(&self.table.load());
        f(&mut next);
        self.table.store(Arc::new(next));
    }

    pub(crate) fn routes(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.snapshot().collect_routes("", &mut out);
        out.sort();
        out
    }

    /// Find the handler for `req`, rewriting its URI on every mount crossed
    /// and attaching the matched [`PathParams`].
    pub(crate) fn resolve(&self, req: &mut Request) -> Handler {
        let method = req.method().clone();
        let mut path = req.uri().path().to_string();
        let mut table = self.snapshot();

        loop {
            match table.lookup(&method, &path) {
                Lookup::Route {
                    handler,
                    pattern,
                    params,
                } => {
                    tracing::trace!(method = %method, path = %path, pattern = %pattern, "Route matched");
                    req.extensions_mut().insert(params);
                    return handler;
                }
                Lookup::Delegate {
                    scope,
                    prefix,
                    rest,
                } => {
                    tracing::trace!(prefix = %prefix, path = %rest, "Delegating to sub-router");
                    rewrite_path(req, &rest);
                    path = rest;
                    table = scope.snapshot();
                }
                Lookup::NotFound(handler) => {
                    tracing::debug!(method = %method, path = %path, "No route matched");
                    return handler.unwrap_or_else(|| default_not_found().clone());
                }
            }
        }
    }
}

/// Replace the request path, keeping the query and recording the original URI once.
fn rewrite_path(req: &mut Request, path: &str) {
    if req.extensions().get::<OriginalUri>().is_none() {
        let original = req.uri().clone();
        req.extensions_mut().insert(OriginalUri(original));
    }

    let path_and_query = match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = req.uri().clone().into_parts();
    let rewritten = PathAndQuery::try_from(path_and_query)
        .map_err(axum::http::Error::from)
        .and_then(|pq| {
            parts.path_and_query = Some(pq);
            Uri::from_parts(parts).map_err(axum::http::Error::from)
        });

    match rewritten {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => tracing::warn!(path = %path, error = %e, "Failed to rewrite request path"),
    }
}

fn default_not_found() -> &'static Handler {
    static DEFAULT: OnceLock<Handler> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        Handler::from_fn(|_req| async { (StatusCode::NOT_FOUND, "404 page not found") })
    })
}
