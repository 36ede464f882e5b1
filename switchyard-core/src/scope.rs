//! Build scope for grouped registration.
//!
//! A [`Scope`] is an immutable prefix + namespace pair. Entering a group
//! derives a nested scope; the [`ScopeGuard`] returned by
//! [`Collector::scoped`] puts the previous scope back when dropped, on every
//! exit path including unwinding.

use crate::collector::Collector;
use std::ops::{Deref, DerefMut};

/// The prefix and namespace applied to routes registered inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    prefix: String,
    namespace: String,
}

impl Scope {
    /// The root scope: no prefix, no namespace.
    pub fn root() -> Self {
        Self::default()
    }

    /// The active path prefix, without a trailing `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The active namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Derive the scope of a nested group.
    pub fn nest(&self, group: &Group) -> Self {
        let prefix = match &group.prefix {
            Some(prefix) => join_prefix(&self.prefix, prefix),
            None => self.prefix.clone(),
        };
        let namespace = match group.namespace.as_deref() {
            Some("") | None => self.namespace.clone(),
            Some(ns) if self.namespace.is_empty() => ns.to_string(),
            Some(ns) => format!("{}::{ns}", self.namespace),
        };
        Self { prefix, namespace }
    }

    /// Replace the prefix.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = join_prefix("", prefix);
        self
    }

    /// Replace the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Prepend the prefix to a pattern.
    ///
    /// A root pattern (`""` or `"/"`) maps to the prefix itself, so
    /// `group("/admin")` + `"/"` registers `/admin`.
    pub fn apply(&self, pattern: &str) -> String {
        if self.prefix.is_empty() {
            return pattern.to_string();
        }
        match pattern {
            "" | "/" => self.prefix.clone(),
            p if p.starts_with('/') || p.starts_with('[') => format!("{}{p}", self.prefix),
            p => format!("{}/{p}", self.prefix),
        }
    }
}

fn join_prefix(base: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else if prefix.starts_with('/') {
        format!("{base}{prefix}")
    } else {
        format!("{base}/{prefix}")
    }
}

/// Attributes of a route group.
///
/// ```
/// use switchyard_core::Group;
///
/// let admin = Group::new().prefix("/admin").namespace("Admin");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    prefix: Option<String>,
    namespace: Option<String>,
}

impl Group {
    /// A group with no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Path prefix prepended to every pattern in the group.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Namespace applied to named targets in the group.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Restores the enclosing scope of a [`Collector`] when dropped.
///
/// Dereferences to the collector, so routes can be registered through it.
pub struct ScopeGuard<'a, R> {
    collector: &'a mut Collector<R>,
    saved: Option<Scope>,
}

impl<'a, R> ScopeGuard<'a, R> {
    pub(crate) fn enter(collector: &'a mut Collector<R>, group: &Group) -> Self {
        let nested = collector.scope().nest(group);
        let saved = collector.replace_scope(nested);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            prefix = %collector.scope().prefix(),
            namespace = %collector.scope().namespace(),
            "entering route group"
        );

        Self {
            collector,
            saved: Some(saved),
        }
    }
}

impl<R> Deref for ScopeGuard<'_, R> {
    type Target = Collector<R>;

    fn deref(&self) -> &Self::Target {
        self.collector
    }
}

impl<R> DerefMut for ScopeGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.collector
    }
}

impl<R> Drop for ScopeGuard<'_, R> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.collector.replace_scope(saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nest_joins_prefix_and_namespace() {
        let outer = Scope::root().nest(&Group::new().prefix("/admin/").namespace("Admin"));
        assert_eq!(outer.prefix(), "/admin");
        assert_eq!(outer.namespace(), "Admin");

        let inner = outer.nest(&Group::new().prefix("users").namespace("Users"));
        assert_eq!(inner.prefix(), "/admin/users");
        assert_eq!(inner.namespace(), "Admin::Users");

        let plain = inner.nest(&Group::new());
        assert_eq!(plain, inner);
    }

    #[test]
    fn test_apply_prefix() {
        let scope = Scope::root().with_prefix("/admin");
        assert_eq!(scope.apply("/"), "/admin");
        assert_eq!(scope.apply(""), "/admin");
        assert_eq!(scope.apply("/user/{id}"), "/admin/user/{id}");
        assert_eq!(scope.apply("user"), "/admin/user");
        assert_eq!(scope.apply("[/{page}]"), "/admin[/{page}]");

        assert_eq!(Scope::root().apply("user"), "user");
    }
}
