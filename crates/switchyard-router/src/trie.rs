//! Trie-based route storage for efficient lookups

use crate::matcher::{NoMatch, RouteMatch};
use crate::pattern::{split_path, Segment};
use crate::route::Route;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use switchyard_core::{Params, RegistrationError};

/// Node in the route trie
#[derive(Debug, Default)]
struct TrieNode {
    /// Static children (exact match)
    children: HashMap<String, TrieNode>,

    /// Parameter child (e.g., :id)
    param_child: Option<Box<NamedChild>>,

    /// Catch-all child (e.g., *filepath)
    catch_all_child: Option<Box<NamedChild>>,

    /// Routes ending at this node, in registration order
    routes: Vec<(Method, Arc<Route>)>,
}

/// A parameter or catch-all child with the name it binds
#[derive(Debug)]
struct NamedChild {
    name: String,
    node: TrieNode,
}

impl NamedChild {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            node: TrieNode::default(),
        }
    }
}

impl TrieNode {
    fn route_for(&self, method: &Method) -> Option<&Arc<Route>> {
        self.routes
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, route)| route)
    }

    /// Route for `method` if this node is terminal. A terminal without it
    /// adds its methods to `allowed`, skipping ones already listed.
    fn terminal(&self, method: &Method, allowed: &mut Vec<Method>) -> Option<&Arc<Route>> {
        if let Some(route) = self.route_for(method) {
            return Some(route);
        }
        for (m, _) in &self.routes {
            if !allowed.contains(m) {
                allowed.push(m.clone());
            }
        }
        None
    }
}

/// Trie for storing and matching routes.
///
/// All methods share one tree; terminal nodes map each method to its route.
#[derive(Debug, Default)]
pub struct RouteTrie {
    root: TrieNode,
    count: usize,
}

impl RouteTrie {
    /// Create a new route trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route into the trie.
    ///
    /// Conflicts are checked before any node is created, so a failed
    /// insert leaves the trie untouched.
    pub fn insert(&mut self, route: Route) -> Result<(), RegistrationError> {
        self.check(&route)?;

        let mut current = &mut self.root;
        for segment in route.pattern().segments() {
            current = match segment {
                Segment::Literal(text) => current.children.entry(text.clone()).or_default(),
                Segment::Param(name) => {
                    &mut current
                        .param_child
                        .get_or_insert_with(|| Box::new(NamedChild::new(name)))
                        .node
                }
                Segment::CatchAll(name) => {
                    &mut current
                        .catch_all_child
                        .get_or_insert_with(|| Box::new(NamedChild::new(name)))
                        .node
                }
            };
        }

        current.routes.push((route.method().clone(), Arc::new(route)));
        self.count += 1;

        Ok(())
    }

    /// Read-only walk reporting the conflict `insert` would hit
    fn check(&self, route: &Route) -> Result<(), RegistrationError> {
        let mut current = &self.root;

        for segment in route.pattern().segments() {
            let next = match segment {
                Segment::Literal(text) => current.children.get(text),
                Segment::Param(name) => {
                    Self::check_name(current.param_child.as_deref(), name, route)?
                }
                Segment::CatchAll(name) => {
                    Self::check_name(current.catch_all_child.as_deref(), name, route)?
                }
            };

            match next {
                Some(node) => current = node,
                // The rest of the path is new, nothing left to conflict with
                None => return Ok(()),
            }
        }

        if current.route_for(route.method()).is_some() {
            return Err(RegistrationError::DuplicateRoute {
                method: route.method().clone(),
                pattern: route.path().to_string(),
            });
        }

        Ok(())
    }

    fn check_name<'t>(
        child: Option<&'t NamedChild>,
        name: &str,
        route: &Route,
    ) -> Result<Option<&'t TrieNode>, RegistrationError> {
        match child {
            Some(child) if child.name != name => Err(RegistrationError::ConflictingParamName {
                pattern: route.path().to_string(),
                existing: child.name.clone(),
                new: name.to_string(),
            }),
            Some(child) => Ok(Some(&child.node)),
            None => Ok(None),
        }
    }

    /// Match a request path against routes in the trie.
    ///
    /// Literal children are tried first, then the parameter child, then
    /// the catch-all child. The first terminal in that order with a route
    /// for `method` wins. If none has one, the allowed methods are the
    /// union over every terminal the path reaches, in first-seen order.
    pub fn match_path(&self, method: &Method, path: &str) -> Result<RouteMatch, NoMatch> {
        let segments: Vec<&str> = split_path(path).collect();

        let mut params = Params::new();
        let mut allowed = Vec::new();

        match Self::search(&self.root, &segments, method, &mut params, &mut allowed) {
            Some(route) => Ok(RouteMatch {
                route: Arc::clone(route),
                params,
            }),
            None if allowed.is_empty() => Err(NoMatch::NotFound),
            None => Err(NoMatch::MethodNotAllowed { allowed }),
        }
    }

    fn search<'t>(
        node: &'t TrieNode,
        segments: &[&str],
        method: &Method,
        params: &mut Params,
        allowed: &mut Vec<Method>,
    ) -> Option<&'t Arc<Route>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return node.terminal(method, allowed);
        };

        // Try static match first (highest priority)
        if let Some(child) = node.children.get(*segment) {
            if let Some(route) = Self::search(child, remaining, method, params, allowed) {
                return Some(route);
            }
        }

        // Try parameter match
        if let Some(param) = &node.param_child {
            let mark = params.len();
            params.push(param.name.as_str(), *segment);
            if let Some(route) = Self::search(&param.node, remaining, method, params, allowed) {
                return Some(route);
            }
            params.truncate(mark);
        }

        // Try catch-all match (lowest priority), consumes the rest of the path
        if let Some(catch_all) = &node.catch_all_child {
            if let Some(route) = catch_all.node.terminal(method, allowed) {
                params.push(catch_all.name.as_str(), segments.join("/"));
                return Some(route);
            }
        }

        None
    }

    /// Get number of routes in the trie
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if trie is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get all routes from the trie
    pub fn get_all_routes(&self) -> Vec<Arc<Route>> {
        let mut routes = Vec::new();
        Self::collect_routes(&self.root, &mut routes);
        routes
    }

    fn collect_routes(node: &TrieNode, routes: &mut Vec<Arc<Route>>) {
        routes.extend(node.routes.iter().map(|(_, route)| Arc::clone(route)));

        let mut literals: Vec<_> = node.children.iter().collect();
        literals.sort_by(|a, b| a.0.cmp(b.0));
        for (_, child) in literals {
            Self::collect_routes(child, routes);
        }

        if let Some(child) = &node.param_child {
            Self::collect_routes(&child.node, routes);
        }

        if let Some(child) = &node.catch_all_child {
            Self::collect_routes(&child.node, routes);
        }
    }
}
