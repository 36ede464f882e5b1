//! Routes and actions.

use crate::{
    error::ConfigurationError,
    handler::{FnHandler, Handler},
    params::Params,
    pattern::CompiledPattern,
    target::TargetRef,
};
use std::{fmt, sync::Arc};

/// What a route invokes once matched.
pub enum Action<R> {
    /// A directly invocable handler.
    Handler(Arc<dyn Handler<R>>),
    /// An operation on a target, named or bound.
    Member {
        /// The target.
        target: TargetRef<R>,
        /// The operation name.
        member: String,
    },
}

impl<R> Action<R> {
    /// Wrap a handler.
    pub fn handler<H: Handler<R> + 'static>(handler: H) -> Self {
        Action::Handler(Arc::new(handler))
    }

    /// An operation on a target.
    pub fn member(target: impl Into<TargetRef<R>>, member: impl Into<String>) -> Self {
        Action::Member {
            target: target.into(),
            member: member.into(),
        }
    }

    /// Parse a `"Target#member"` descriptor.
    pub fn parse(descriptor: &str) -> Result<Self, ConfigurationError> {
        match descriptor.split_once('#') {
            Some((target, member))
                if !target.is_empty() && !member.is_empty() && !member.contains('#') =>
            {
                Ok(Action::member(target, member))
            }
            _ => Err(ConfigurationError::InvalidDescriptor {
                descriptor: descriptor.to_string(),
            }),
        }
    }

    /// Apply a namespace to named targets.
    pub fn in_namespace(self, namespace: &str) -> Self {
        match self {
            Action::Member { target, member } => Action::Member {
                target: target.in_namespace(namespace),
                member,
            },
            handler => handler,
        }
    }
}

impl<R> Clone for Action<R> {
    fn clone(&self) -> Self {
        match self {
            Action::Handler(handler) => Action::Handler(Arc::clone(handler)),
            Action::Member { target, member } => Action::Member {
                target: target.clone(),
                member: member.clone(),
            },
        }
    }
}

impl<R> fmt::Debug for Action<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Handler(handler) => f
                .debug_tuple("Handler")
                .field(handler.signature())
                .finish(),
            Action::Member { target, member } => f
                .debug_struct("Member")
                .field("target", target)
                .field("member", member)
                .finish(),
        }
    }
}

/// Conversion into an [`Action`], used by the registration API.
///
/// Accepts an [`Action`], a handler, a `"Target#member"` descriptor, or a
/// `(target, member)` pair.
pub trait IntoAction<R> {
    /// Perform the conversion.
    fn into_action(self) -> Result<Action<R>, ConfigurationError>;
}

impl<R> IntoAction<R> for Action<R> {
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Ok(self)
    }
}

impl<R> IntoAction<R> for &str {
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Action::parse(self)
    }
}

impl<R> IntoAction<R> for String {
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Action::parse(&self)
    }
}

impl<R, F> IntoAction<R> for FnHandler<F>
where
    FnHandler<F>: Handler<R>,
    F: 'static,
{
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Ok(Action::handler(self))
    }
}

impl<R> IntoAction<R> for Arc<dyn Handler<R>> {
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Ok(Action::Handler(self))
    }
}

impl<R, M: Into<String>> IntoAction<R> for (TargetRef<R>, M) {
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Ok(Action::member(self.0, self.1))
    }
}

impl<R> IntoAction<R> for (&str, &str) {
    fn into_action(self) -> Result<Action<R>, ConfigurationError> {
        Ok(Action::member(self.0, self.1))
    }
}

/// One registered method + pattern + action + strategy.
pub struct Route<R> {
    method: String,
    pattern: CompiledPattern,
    action: Action<R>,
    strategy: String,
}

impl<R> Route<R> {
    pub(crate) fn new(
        method: String,
        pattern: CompiledPattern,
        action: Action<R>,
        strategy: String,
    ) -> Self {
        Self {
            method,
            pattern,
            action,
            strategy,
        }
    }

    /// The lowercase method this route is registered under.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The pattern text as registered.
    pub fn raw_pattern(&self) -> &str {
        self.pattern.raw()
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Returns true if the route is served from the static index.
    pub fn is_static(&self) -> bool {
        self.pattern.is_static()
    }

    /// The literal path of a static route.
    pub fn literal_path(&self) -> Option<&str> {
        self.pattern.literal_path()
    }

    /// Declared parameter names, in declaration order.
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }

    /// The action to invoke.
    pub fn action(&self) -> &Action<R> {
        &self.action
    }

    /// The strategy tag used for invocation.
    pub fn strategy_tag(&self) -> &str {
        &self.strategy
    }
}

impl<R> fmt::Debug for Route<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw())
            .field("action", &self.action)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// A resolved route with its bound parameters.
pub struct RouteMatch<'a, R> {
    /// The matched route.
    pub route: &'a Route<R>,
    /// Captured parameters.
    pub params: Params,
}

impl<R> fmt::Debug for RouteMatch<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("route", self.route)
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor() {
        let action: Action<()> = Action::parse("User#show").unwrap();
        match action {
            Action::Member { target, member } => {
                assert_eq!(target.name(), "User");
                assert_eq!(member, "show");
            }
            Action::Handler(_) => panic!("expected a member action"),
        }
    }

    #[test]
    fn test_parse_invalid_descriptors() {
        for descriptor in ["User", "#show", "User#", "A#b#c"] {
            assert!(
                matches!(
                    Action::<()>::parse(descriptor),
                    Err(ConfigurationError::InvalidDescriptor { .. })
                ),
                "{descriptor} should be rejected"
            );
        }
    }

    #[test]
    fn test_namespace_applies_to_descriptor() {
        let action: Action<()> = "User#show".into_action().unwrap().in_namespace("Admin");
        match action {
            Action::Member { target, .. } => assert_eq!(target.name(), "Admin::User"),
            Action::Handler(_) => panic!("expected a member action"),
        }
    }
}
