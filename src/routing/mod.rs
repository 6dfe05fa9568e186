//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup):
//!     router.get(pattern, h)
//!     → router.rs (compose h with the router's chain)
//!     → table.rs (insert into the scope's method tree)
//!
//! Incoming Request (method, path)
//!     → table.rs (route lookup, mount delegation with prefix stripping)
//!     → Return: composed handler, scope not-found, or default 404
//!     → invoke
//! ```
//!
//! # Design Decisions
//! - Handlers are composed once, at registration
//! - Lookups read an immutable snapshot (no locks on the hot path)
//! - Deterministic: same input always resolves to the same handler
//! - Sub-routers are separate tables reached through a prefix mount

pub mod router;
pub mod table;

pub use router::{Router, SUPPORTED_METHODS};
pub use table::PathParams;
