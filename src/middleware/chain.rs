//! Ordered middleware sequences.
//!
//! # Responsibilities
//! - Hold middleware in registration order
//! - Append without disturbing other holders of the same chain
//! - Fold a terminal handler through the chain
//!
//! # Design Decisions
//! - Persistent cons list: `push` allocates one node and shares the rest
//! - The newest node is the head, so composition walks head-first and
//!   wraps the innermost layer first

use std::fmt;
use std::sync::Arc;

use super::Middleware;
use crate::handler::Handler;

struct Node {
    middleware: Arc<dyn Middleware>,
    prev: Option<Arc<Node>>,
}

/// An immutable, structurally shared sequence of middleware.
#[derive(Clone, Default)]
pub struct Chain {
    head: Option<Arc<Node>>,
    len: usize,
}

impl Chain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new chain with `middleware` appended.
    ///
    /// The receiver is left untouched; both chains share every node before
    /// the append point.
    pub fn push<M: Middleware>(&self, middleware: M) -> Self {
        self.push_arc(Arc::new(middleware))
    }

    pub(crate) fn push_arc(&self, middleware: Arc<dyn Middleware>) -> Self {
        Self {
            head: Some(Arc::new(Node {
                middleware,
                prev: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wrap `handler` so the first-registered middleware is outermost.
    pub fn compose(&self, handler: Handler) -> Handler {
        let mut composed = handler;
        let mut cursor = self.head.as_deref();
        while let Some(node) = cursor {
            composed = node.middleware.wrap(composed);
            cursor = node.prev.as_deref();
        }
        composed
    }

    /// True if both chains are the same list (not merely equal contents).
    pub fn ptr_eq(&self, other: &Chain) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.len).finish()
    }
}
