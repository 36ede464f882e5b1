//! # Route Table
//!
//! Per-method storage of compiled routes:
//!
//! - **Static index**: literal path → route. Re-registering a literal under
//!   the same method replaces the earlier route.
//! - **Dynamic list**: routes in registration order. Duplicates are kept and
//!   tried in order, so the first registered match wins.
//!
//! # Lifecycle
//!
//! A table is **open** until [`RouteTable::seal`] is called, and **sealed**
//! (read-only) afterwards. Sealing is one-way; registering on a sealed table
//! fails with [`ConfigurationError::Sealed`] and leaves it unchanged.

use crate::{
    error::{ConfigurationError, RegisterError},
    params::Params,
    pattern::{self, normalize_path},
    route::{Action, Route, RouteMatch},
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Tag of the built-in positional strategy.
pub const DEFAULT_STRATEGY: &str = "uri";

/// Normalize an HTTP method to its lowercase key.
pub fn normalize_method(method: &str) -> String {
    method.to_ascii_lowercase()
}

struct MethodRoutes<R> {
    statics: HashMap<String, Route<R>>,
    dynamics: Vec<Route<R>>,
}

impl<R> Default for MethodRoutes<R> {
    fn default() -> Self {
        Self {
            statics: HashMap::new(),
            dynamics: Vec::new(),
        }
    }
}

impl<R> MethodRoutes<R> {
    fn find(&self, path: &str) -> Option<RouteMatch<'_, R>> {
        if let Some(route) = self.statics.get(path) {
            return Some(RouteMatch {
                route,
                params: Params::new(),
            });
        }
        self.dynamics.iter().find_map(|route| {
            route
                .pattern()
                .captures(path)
                .map(|params| RouteMatch { route, params })
        })
    }

    fn matches(&self, path: &str) -> bool {
        self.statics.contains_key(path) || self.dynamics.iter().any(|r| r.pattern().is_match(path))
    }

    fn len(&self) -> usize {
        self.statics.len() + self.dynamics.len()
    }
}

/// Compiled routes keyed by method.
pub struct RouteTable<R> {
    methods: BTreeMap<String, MethodRoutes<R>>,
    sealed: bool,
}

impl<R> Default for RouteTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RouteTable<R> {
    /// Create an empty, open table.
    pub fn new() -> Self {
        Self {
            methods: BTreeMap::new(),
            sealed: false,
        }
    }

    /// Compile `pattern` and register it under `method`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::Sealed`] if the table is sealed.
    /// - [`CompileError`](crate::CompileError) if the pattern is malformed.
    ///
    /// The table is unchanged on error.
    pub fn set(
        &mut self,
        method: &str,
        pattern: &str,
        action: Action<R>,
        strategy: &str,
    ) -> Result<(), RegisterError> {
        let method = normalize_method(method);
        if self.sealed {
            return Err(ConfigurationError::Sealed {
                method,
                pattern: pattern.to_string(),
            }
            .into());
        }

        let compiled = pattern::compile(pattern)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            method = %method,
            pattern = %pattern,
            is_static = compiled.is_static(),
            strategy = %strategy,
            "registering route"
        );

        let routes = self.methods.entry(method.clone()).or_default();
        let literal = compiled.literal_path().map(str::to_string);
        let route = Route::new(method, compiled, action, strategy.to_string());
        match literal {
            Some(literal) => {
                routes.statics.insert(literal, route);
            }
            None => routes.dynamics.push(route),
        }
        Ok(())
    }

    /// Seal the table. Calling this more than once has no further effect.
    pub fn seal(&mut self) {
        #[cfg(feature = "tracing")]
        if !self.sealed {
            tracing::debug!(routes = self.len(), "sealing route table");
        }
        self.sealed = true;
    }

    /// Returns true once the table has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Resolve `path` under a single method.
    ///
    /// The static index is consulted first; otherwise dynamic routes are tried
    /// in registration order.
    pub fn find(&self, method: &str, path: &str) -> Option<RouteMatch<'_, R>> {
        let method = normalize_method(method);
        let path = normalize_path(path);
        self.find_normalized(&method, &path)
    }

    pub(crate) fn find_normalized(&self, method: &str, path: &str) -> Option<RouteMatch<'_, R>> {
        self.methods.get(method).and_then(|routes| routes.find(path))
    }

    /// Every method whose routes match `path`, sorted.
    pub fn allowed_methods(&self, path: &str) -> BTreeSet<String> {
        let path = normalize_path(path);
        self.methods
            .iter()
            .filter(|(_, routes)| routes.matches(&path))
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Methods with at least one registered route, sorted.
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Routes registered under `method`: static routes first, then dynamic
    /// routes in registration order.
    pub fn routes(&self, method: &str) -> impl Iterator<Item = &Route<R>> {
        let routes = self.methods.get(&normalize_method(method));
        let statics = routes.into_iter().flat_map(|r| r.statics.values());
        let dynamics = routes.into_iter().flat_map(|r| r.dynamics.iter());
        statics.chain(dynamics)
    }

    /// Total number of routes across all methods.
    pub fn len(&self) -> usize {
        self.methods.values().map(MethodRoutes::len).sum()
    }

    /// Returns true if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R> std::fmt::Debug for RouteTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("routes", &self.len())
            .field("sealed", &self.sealed)
            .finish()
    }
}
