//! # Dispatcher
//!
//! Resolves a request's method and path against a sealed [`RouteTable`] and
//! invokes the matched route through its strategy.
//!
//! Resolution order:
//!
//! 1. The requested method's static index.
//! 2. The requested method's dynamic routes, in registration order.
//! 3. Every other method; a hit there means [`MethodNotAllowedError`].
//! 4. Otherwise [`NotFoundError`].
//!
//! Resolution has no side effects; the strategy only runs once a route has
//! been fully resolved.

use crate::{
    error::{DispatchError, MethodNotAllowedError, NotFoundError},
    pattern::normalize_path,
    route::RouteMatch,
    strategy::{Invocation, Strategies},
    table::{RouteTable, normalize_method},
    target::Targets,
};
use std::fmt;

/// Serves requests from a sealed route table.
pub struct Dispatcher<R> {
    table: RouteTable<R>,
    strategies: Strategies<R>,
    targets: Targets<R>,
}

impl<R> Dispatcher<R> {
    /// Take ownership of `table` and seal it.
    pub fn new(mut table: RouteTable<R>, strategies: Strategies<R>, targets: Targets<R>) -> Self {
        table.seal();
        Self {
            table,
            strategies,
            targets,
        }
    }

    /// A dispatcher with only the built-in strategy and no named targets.
    pub fn from_table(table: RouteTable<R>) -> Self {
        Self::new(table, Strategies::new(), Targets::new())
    }

    /// Resolve `method` + `path` to a route and its bound parameters.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::MethodNotAllowed`] if the path matches only under
    ///   other methods.
    /// - [`DispatchError::NotFound`] if it matches nothing.
    pub fn resolve(&self, method: &str, path: &str) -> Result<RouteMatch<'_, R>, DispatchError> {
        let method = normalize_method(method);
        let normalized = normalize_path(path);

        if let Some(found) = self.table.find_normalized(&method, &normalized) {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                method = %method,
                path = %path,
                pattern = %found.route.raw_pattern(),
                params = found.params.len(),
                "route matched"
            );
            return Ok(found);
        }

        let allowed_methods = self.table.allowed_methods(&normalized);
        if allowed_methods.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::trace!(method = %method, path = %path, "no route matched");

            Err(NotFoundError {
                requested_path: path.to_string(),
                requested_method: method,
            }
            .into())
        } else {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                method = %method,
                path = %path,
                allowed = ?allowed_methods,
                "method not allowed"
            );

            Err(MethodNotAllowedError {
                requested_path: path.to_string(),
                requested_method: method,
                allowed_methods,
            }
            .into())
        }
    }

    /// Resolve and invoke the matched route through its strategy.
    pub fn dispatch(&self, method: &str, path: &str) -> Result<R, DispatchError> {
        let RouteMatch { route, params } = self.resolve(method, path)?;
        let strategy = self.strategies.get(route.strategy_tag())?;

        #[cfg(feature = "tracing")]
        tracing::trace!(strategy = %route.strategy_tag(), "invoking route");

        strategy.invoke(Invocation::new(route.action(), params, &self.targets))
    }

    /// The sealed route table.
    pub fn table(&self) -> &RouteTable<R> {
        &self.table
    }

    /// The strategy registry.
    pub fn strategies(&self) -> &Strategies<R> {
        &self.strategies
    }

    /// The target registry.
    pub fn targets(&self) -> &Targets<R> {
        &self.targets
    }
}

impl<R> fmt::Debug for Dispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .field("strategies", &self.strategies)
            .field("targets", &self.targets)
            .finish()
    }
}
