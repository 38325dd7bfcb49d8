//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Collect (method, pattern, handler) registrations and named validators
//! - Freeze them into an immutable [`Router`]
//! - Resolve a request to a handler and its typed path variables
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Validation runs root to leaf; the first rejection ends dispatch
//! - A rejected variable is reported as `NotFound`, never as its own outcome
//! - `MethodNotAllowed` is distinct from `NotFound` unless collapsed by the builder

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::routing::trie::{RouteError, RouteNode};
use crate::routing::{Params, PathValue, Validator};

/// Outcome of dispatching one request.
#[derive(Debug, PartialEq)]
pub enum Dispatch<'r, H> {
    /// A handler is bound for the method and every variable passed validation.
    Matched {
        handler: &'r H,
        /// Pattern the handler was registered under, e.g. `/track/{id}`.
        pattern: &'r str,
        params: Params,
    },
    /// The path exists but has no handler for the method.
    MethodNotAllowed { allowed: Vec<Method> },
    /// Unknown path, or a path variable was rejected by its validator.
    NotFound,
}

/// Builder used during startup to register routes and validators.
pub struct RouterBuilder<H> {
    root: RouteNode<H>,
    validators: HashMap<String, Validator>,
    routes: Vec<(Method, String)>,
    allow_overwrite: bool,
    collapse_method_not_allowed: bool,
}

impl<H> RouterBuilder<H> {
    pub fn new() -> Self {
        Self {
            root: RouteNode::new(),
            validators: HashMap::new(),
            routes: Vec::new(),
            allow_overwrite: false,
            collapse_method_not_allowed: false,
        }
    }

    /// Let a later registration replace an earlier one for the same method and path.
    pub fn allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    /// Report a path without a handler for the method as `NotFound`.
    pub fn collapse_method_not_allowed(mut self, collapse: bool) -> Self {
        self.collapse_method_not_allowed = collapse;
        self
    }

    /// Register `handler` for `method` requests matching `pattern`.
    pub fn handle(
        &mut self,
        method: Method,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        self.root
            .insert(&method, pattern, handler, self.allow_overwrite)?;

        match self
            .routes
            .iter()
            .position(|(m, p)| *m == method && same_shape(p, pattern))
        {
            Some(i) => self.routes[i] = (method, pattern.to_string()),
            None => self.routes.push((method, pattern.to_string())),
        }
        Ok(self)
    }

    /// Register a validator for every variable named `name`.
    pub fn validate<F>(&mut self, name: impl Into<String>, validator: F) -> &mut Self
    where
        F: Fn(&str) -> Option<PathValue> + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
        self
    }

    pub fn build(self) -> Router<H> {
        Router {
            root: self.root,
            validators: self.validators,
            routes: self.routes,
            collapse_method_not_allowed: self.collapse_method_not_allowed,
        }
    }
}

impl<H> Default for RouterBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two patterns address the same node when their segments match,
/// treating any two variables as equal.
fn same_shape(a: &str, b: &str) -> bool {
    use crate::routing::trie::split_path;

    let is_var = |s: &str| s.starts_with('{');
    let (mut a, mut b) = (split_path(a), split_path(b));
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if (is_var(x) && is_var(y)) || x == y => continue,
            _ => return false,
        }
    }
}

/// Immutable method + path dispatcher.
pub struct Router<H> {
    root: RouteNode<H>,
    validators: HashMap<String, Validator>,
    routes: Vec<(Method, String)>,
    collapse_method_not_allowed: bool,
}

impl<H> Router<H> {
    pub fn builder() -> RouterBuilder<H> {
        RouterBuilder::new()
    }

    /// Resolve `method` and `path` to a handler.
    pub fn dispatch(&self, method: &Method, path: &str) -> Dispatch<'_, H> {
        let Some(resolved) = self.root.resolve(path) else {
            return Dispatch::NotFound;
        };
        let node = resolved.node;

        let endpoint = match node.endpoint(method) {
            Some(endpoint) => endpoint,
            None => return self.method_not_bound(node, &resolved.captures),
        };

        match self.bind(method, &resolved.captures) {
            Some(params) => Dispatch::Matched {
                handler: &endpoint.handler,
                pattern: &endpoint.pattern,
                params,
            },
            None => Dispatch::NotFound,
        }
    }

    /// Validate every capture under the names `method` bound along the path.
    /// `None` when a name is missing or a validator rejects its value.
    fn bind(&self, method: &Method, captures: &[(&RouteNode<H>, &str)]) -> Option<Params> {
        let mut params = Params::new();
        for &(var_node, raw) in captures {
            let name = var_node.variable_name(method)?;
            let value = match self.validators.get(name) {
                Some(validator) => match validator(raw) {
                    Some(value) => value,
                    None => {
                        tracing::trace!(variable = name, value = raw, "Path variable rejected");
                        return None;
                    }
                },
                None => PathValue::from(raw),
            };
            params.insert(name, value);
        }
        Some(params)
    }

    /// Only methods whose own variables validate are offered, so a rejected
    /// value looks the same as an unknown path.
    fn method_not_bound(&self, node: &RouteNode<H>, captures: &[(&RouteNode<H>, &str)]) -> Dispatch<'_, H> {
        if self.collapse_method_not_allowed {
            return Dispatch::NotFound;
        }
        let mut allowed: Vec<Method> = node
            .methods()
            .filter(|m| self.bind(m, captures).is_some())
            .cloned()
            .collect();
        if allowed.is_empty() {
            return Dispatch::NotFound;
        }
        allowed.sort_by(|a, b| method_order(a).cmp(&method_order(b)));
        Dispatch::MethodNotAllowed { allowed }
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> &[(Method, String)] {
        &self.routes
    }
}

fn method_order(method: &Method) -> (u8, &str) {
    let rank = match *method {
        Method::GET => 0,
        Method::HEAD => 1,
        Method::POST => 2,
        Method::PUT => 3,
        Method::DELETE => 4,
        Method::PATCH => 5,
        Method::OPTIONS => 6,
        Method::TRACE => 7,
        _ => 8,
    };
    (rank, method.as_str())
}

/// Format methods as an HTTP `Allow` header value.
pub fn allow_header(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::validator;

    fn ticker_router() -> Router<&'static str> {
        let mut builder = Router::builder();
        builder
            .handle(Method::GET, "/ticker/latest", "h1")
            .unwrap()
            .handle(Method::GET, "/ticker/{timestamp}", "h2")
            .unwrap();
        builder.validate("timestamp", validator::integer);
        builder.build()
    }

    #[test]
    fn test_ticker_scenario() {
        let router = ticker_router();

        assert_eq!(
            router.dispatch(&Method::GET, "/ticker/latest"),
            Dispatch::Matched {
                handler: &"h1",
                pattern: "/ticker/latest",
                params: Params::new(),
            }
        );

        match router.dispatch(&Method::GET, "/ticker/12345") {
            Dispatch::Matched { handler, params, .. } => {
                assert_eq!(*handler, "h2");
                assert_eq!(params.get("timestamp"), Some(&PathValue::Int(12345)));
            }
            other => panic!("expected match, got {:?}", other),
        }

        assert_eq!(router.dispatch(&Method::GET, "/ticker/abc"), Dispatch::NotFound);
        assert_eq!(
            router.dispatch(&Method::POST, "/ticker/latest"),
            Dispatch::MethodNotAllowed {
                allowed: vec![Method::GET]
            }
        );
    }

    #[test]
    fn test_collapsed_method_not_allowed() {
        let mut builder = Router::builder().collapse_method_not_allowed(true);
        builder.handle(Method::GET, "/ticker/latest", "h1").unwrap();
        let router = builder.build();

        assert_eq!(router.dispatch(&Method::POST, "/ticker/latest"), Dispatch::NotFound);
    }

    #[test]
    fn test_unvalidated_variable_is_raw_string() {
        let mut builder = Router::builder();
        builder.handle(Method::GET, "/a/{name}", "h").unwrap();
        let router = builder.build();

        match router.dispatch(&Method::GET, "/a/hello%20world") {
            Dispatch::Matched { params, .. } => {
                assert_eq!(params.str("name"), Some("hello%20world"));
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_validator_rejection_is_not_found() {
        let mut builder = Router::builder();
        builder
            .handle(Method::GET, "/track/{id}", "track")
            .unwrap();
        builder.validate("id", |raw: &str| {
            (raw.len() == 24).then(|| PathValue::from(raw))
        });
        let router = builder.build();

        assert_eq!(router.dispatch(&Method::GET, "/track/short"), Dispatch::NotFound);
        assert!(matches!(
            router.dispatch(&Method::GET, "/track/aaaaaaaaaaaaaaaaaaaaaaaa"),
            Dispatch::Matched { .. }
        ));
    }

    #[test]
    fn test_intermediate_node_is_not_found() {
        let mut builder = Router::builder();
        builder
            .handle(Method::GET, "/paragliding/api/track", "tracks")
            .unwrap();
        let router = builder.build();

        // `/paragliding` exists in the trie but binds no methods at all
        assert_eq!(router.dispatch(&Method::GET, "/paragliding"), Dispatch::NotFound);
        assert_eq!(router.dispatch(&Method::GET, "/"), Dispatch::NotFound);
    }

    #[test]
    fn test_method_scoped_variable_names() {
        let mut builder = Router::builder();
        builder
            .handle(Method::GET, "/hook/{id}", "get")
            .unwrap()
            .handle(Method::DELETE, "/hook/{hook_id}", "delete")
            .unwrap();
        let router = builder.build();

        match router.dispatch(&Method::DELETE, "/hook/abc") {
            Dispatch::Matched { handler, params, .. } => {
                assert_eq!(*handler, "delete");
                assert_eq!(params.str("hook_id"), Some("abc"));
                assert_eq!(params.get("id"), None);
            }
            other => panic!("expected match, got {:?}", other),
        }

        // No name bound for POST on the variable node
        assert_eq!(
            router.dispatch(&Method::POST, "/hook/abc"),
            Dispatch::MethodNotAllowed {
                allowed: vec![Method::GET, Method::DELETE]
            }
        );
    }

    #[test]
    fn test_rejected_variable_is_not_found_for_every_method() {
        let mut builder = Router::builder();
        builder
            .handle(Method::GET, "/track/{id}", "track")
            .unwrap()
            .handle(Method::DELETE, "/track/{track}", "remove")
            .unwrap();
        builder.validate("id", |raw: &str| {
            (raw.len() == 24).then(|| PathValue::from(raw))
        });
        let router = builder.build();

        assert_eq!(router.dispatch(&Method::POST, "/track/short"), Dispatch::MethodNotAllowed {
            allowed: vec![Method::DELETE]
        });
        assert_eq!(
            router.dispatch(&Method::POST, "/track/aaaaaaaaaaaaaaaaaaaaaaaa"),
            Dispatch::MethodNotAllowed {
                allowed: vec![Method::GET, Method::DELETE]
            }
        );

        let mut builder = Router::builder();
        builder.handle(Method::GET, "/track/{id}", "track").unwrap();
        builder.validate("id", |raw: &str| {
            (raw.len() == 24).then(|| PathValue::from(raw))
        });
        let router = builder.build();
        assert_eq!(router.dispatch(&Method::POST, "/track/short"), Dispatch::NotFound);
    }

    #[test]
    fn test_routes_listing_and_overwrite() {
        let mut builder = Router::builder().allow_overwrite(true);
        builder
            .handle(Method::GET, "/track", "list")
            .unwrap()
            .handle(Method::POST, "/track", "create")
            .unwrap()
            .handle(Method::GET, "/track/", "list2")
            .unwrap();
        let router = builder.build();

        assert_eq!(
            router.routes(),
            &[
                (Method::GET, "/track/".to_string()),
                (Method::POST, "/track".to_string()),
            ]
        );
        assert!(matches!(
            router.dispatch(&Method::GET, "/track"),
            Dispatch::Matched { handler: &"list2", .. }
        ));
    }

    #[test]
    fn test_allow_header() {
        assert_eq!(allow_header(&[Method::GET, Method::DELETE]), "GET, DELETE");
        assert_eq!(allow_header(&[]), "");
    }
}
