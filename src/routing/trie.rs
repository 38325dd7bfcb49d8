//! Route trie keyed by path segment.
//!
//! # Responsibilities
//! - Decompose patterns into literal and `{variable}` segments
//! - Store method bindings on the node a pattern terminates at
//! - Walk a request path, preferring literal children over the variable child
//!
//! # Design Decisions
//! - Empty segments are skipped, so `/a//b/` and `a/b` are the same path
//! - At most one variable child per node; the variable name is recorded per method
//! - No backtracking: once a literal child matches, the variable child is not tried
//! - Insertion validates before mutating, so a rejected pattern leaves no nodes behind

use std::collections::HashMap;

use axum::http::Method;
use thiserror::Error;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The same method and path shape was registered twice.
    #[error("route {method} {pattern} is already registered")]
    Duplicate { method: Method, pattern: String },

    /// A different variable name is already bound at this position for the method.
    #[error("variable {{{name}}} in {method} {pattern} conflicts with {{{existing}}} at the same position")]
    VariableConflict {
        method: Method,
        pattern: String,
        existing: String,
        name: String,
    },

    /// Empty `{}`, unbalanced braces, or braces inside a literal.
    #[error("invalid segment {segment:?} in {pattern}")]
    InvalidSegment { pattern: String, segment: String },

    /// The same variable name appears twice in one pattern.
    #[error("variable {{{name}}} appears more than once in {pattern}")]
    RepeatedVariable { pattern: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Variable(&'a str),
}

/// Split a path or pattern into its non-empty segments.
pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment<'_>>, RouteError> {
    let mut segments = Vec::new();
    let mut names: Vec<&str> = Vec::new();

    for raw in split_path(pattern) {
        let segment = match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) if !name.is_empty() && !name.contains(['{', '}']) => Segment::Variable(name),
            None if !raw.contains(['{', '}']) => Segment::Literal(raw),
            _ => {
                return Err(RouteError::InvalidSegment {
                    pattern: pattern.to_string(),
                    segment: raw.to_string(),
                })
            }
        };

        if let Segment::Variable(name) = segment {
            if names.contains(&name) {
                return Err(RouteError::RepeatedVariable {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
            names.push(name);
        }
        segments.push(segment);
    }

    Ok(segments)
}

/// A handler bound to a method, together with the pattern it was registered under.
#[derive(Debug)]
pub struct Endpoint<H> {
    pub pattern: String,
    pub handler: H,
}

/// Result of walking the trie: the terminal node plus every variable node
/// passed on the way, paired with the raw segment that matched it.
pub(crate) struct Resolved<'n, 'p, H> {
    pub node: &'n RouteNode<H>,
    pub captures: Vec<(&'n RouteNode<H>, &'p str)>,
}

/// One node of the route trie.
#[derive(Debug)]
pub struct RouteNode<H> {
    children: HashMap<String, RouteNode<H>>,
    variable_child: Option<Box<RouteNode<H>>>,
    /// Name of the variable on this node's incoming edge, per method.
    variable_names: HashMap<Method, String>,
    endpoints: HashMap<Method, Endpoint<H>>,
}

impl<H> RouteNode<H> {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            variable_child: None,
            variable_names: HashMap::new(),
            endpoints: HashMap::new(),
        }
    }

    /// Bind `handler` to `method` at the node `pattern` leads to.
    ///
    /// With `overwrite` set, an existing binding or variable name is replaced
    /// silently instead of failing.
    pub fn insert(
        &mut self,
        method: &Method,
        pattern: &str,
        handler: H,
        overwrite: bool,
    ) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        if !overwrite {
            self.check_insert(method, pattern, &segments)?;
        }

        let mut node = self;
        for segment in &segments {
            node = match *segment {
                Segment::Literal(text) => node
                    .children
                    .entry(text.to_string())
                    .or_insert_with(RouteNode::new),
                Segment::Variable(name) => {
                    let child = node
                        .variable_child
                        .get_or_insert_with(|| Box::new(RouteNode::new()))
                        .as_mut();
                    child.variable_names.insert(method.clone(), name.to_string());
                    child
                }
            };
        }

        node.endpoints.insert(
            method.clone(),
            Endpoint {
                pattern: pattern.to_string(),
                handler,
            },
        );
        Ok(())
    }

    /// Read-only walk along the existing part of the pattern looking for conflicts.
    fn check_insert(
        &self,
        method: &Method,
        pattern: &str,
        segments: &[Segment<'_>],
    ) -> Result<(), RouteError> {
        let mut node = self;
        for segment in segments {
            let next = match *segment {
                Segment::Literal(text) => node.children.get(text),
                Segment::Variable(name) => {
                    let child = node.variable_child.as_deref();
                    if let Some(existing) = child.and_then(|c| c.variable_names.get(method)) {
                        if existing != name {
                            return Err(RouteError::VariableConflict {
                                method: method.clone(),
                                pattern: pattern.to_string(),
                                existing: existing.clone(),
                                name: name.to_string(),
                            });
                        }
                    }
                    child
                }
            };

            match next {
                Some(child) => node = child,
                // The rest of the pattern creates new nodes, nothing can clash
                None => return Ok(()),
            }
        }

        if node.endpoints.contains_key(method) {
            return Err(RouteError::Duplicate {
                method: method.clone(),
                pattern: pattern.to_string(),
            });
        }
        Ok(())
    }

    /// Walk `path`, returning `None` when some segment has no matching child.
    pub(crate) fn resolve<'n, 'p>(&'n self, path: &'p str) -> Option<Resolved<'n, 'p, H>> {
        let mut node = self;
        let mut captures = Vec::new();

        for segment in split_path(path) {
            node = match node.children.get(segment) {
                Some(child) => child,
                None => {
                    let child = node.variable_child.as_deref()?;
                    captures.push((child, segment));
                    child
                }
            };
        }

        Some(Resolved { node, captures })
    }

    /// Variable name bound on this node's incoming edge for `method`.
    pub fn variable_name(&self, method: &Method) -> Option<&str> {
        self.variable_names.get(method).map(String::as_str)
    }

    pub fn endpoint(&self, method: &Method) -> Option<&Endpoint<H>> {
        self.endpoints.get(method)
    }

    /// Methods with a handler on this node.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.endpoints.keys()
    }
}

impl<H> Default for RouteNode<H> {
    fn default() -> Self {
        Self::new()
    }
}
