//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     (method, "/track/{id}", handler)
//!     → router.rs (RouterBuilder::handle, RouterBuilder::validate)
//!     → trie.rs (split into segments, create/reuse nodes)
//!     → RouterBuilder::build() freezes an immutable Router
//!
//! Incoming Request (method, path)
//!     → trie.rs (walk segments, literal first, variable fallback)
//!     → validator.rs (accept/reject + retype each captured variable)
//!     → Return: Matched(handler, params), MethodNotAllowed or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Literal segments always win over a variable segment at the same depth
//! - One variable child per node; conflicting names for one method are rejected
//! - Validation failure is reported exactly like an unknown path
//! - Deterministic: same input always matches same route

pub mod params;
pub mod router;
pub mod trie;
pub mod validator;

pub use params::{Params, PathValue};
pub use router::{Dispatch, Router, RouterBuilder};
pub use trie::RouteError;
pub use validator::Validator;
