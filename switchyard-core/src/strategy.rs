//! # Invocation Strategies
//!
//! A [`Strategy`] turns a matched action plus its bound parameters into an
//! executed call. Routes name their strategy by tag; the [`Strategies`]
//! registry maps tags to implementations and always contains the built-in
//! [`UriStrategy`] under [`DEFAULT_STRATEGY`].
//!
//! The steps every strategy shares are public so alternates can reuse them:
//!
//! 1. [`Invocation::resolve`] finds the concrete callee and its signature.
//! 2. [`arrange`] orders the parameters by that signature and fills defaults.
//! 3. [`Resolved::call`] invokes it.

use crate::{
    error::{ArgumentError, BoxError, ConfigurationError, DispatchError},
    handler::{Args, Handler, ParamDefault, Signature},
    params::Params,
    route::Action,
    table::DEFAULT_STRATEGY,
    target::{Controller, TargetRef, Targets},
};
use std::{collections::HashMap, fmt, sync::Arc};

/// The pluggable invocation contract.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an invocation strategy for `{R}`",
    label = "missing `Strategy<{R}>` implementation"
)]
pub trait Strategy<R>: Send + Sync {
    /// Execute the matched action.
    fn invoke(&self, invocation: Invocation<'_, R>) -> Result<R, DispatchError>;
}

/// Everything a strategy needs to execute one matched route.
pub struct Invocation<'a, R> {
    action: &'a Action<R>,
    params: Params,
    targets: &'a Targets<R>,
}

impl<'a, R> Invocation<'a, R> {
    /// Bundle an action with its bound parameters.
    pub fn new(action: &'a Action<R>, params: Params, targets: &'a Targets<R>) -> Self {
        Self {
            action,
            params,
            targets,
        }
    }

    /// The matched action.
    pub fn action(&self) -> &'a Action<R> {
        self.action
    }

    /// The bound parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Resolve the action to a concrete callee.
    ///
    /// Named targets are instantiated fresh from the target registry.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownTarget`] or
    /// [`ConfigurationError::UnknownMember`].
    pub fn resolve(&self) -> Result<Resolved<'a, R>, ConfigurationError> {
        let (callee, signature) = match self.action {
            Action::Handler(handler) => {
                let handler: &'a dyn Handler<R> = handler.as_ref();
                (Callee::Handler(handler), handler.signature().clone())
            }
            Action::Member { target, member } => match target {
                TargetRef::Instance(instance) => {
                    let instance: &'a dyn Controller<R> = instance.as_ref();
                    let signature = member_signature(instance, member)?;
                    (Callee::Shared(instance, member.as_str()), signature)
                }
                TargetRef::Named(name) => {
                    let instance = self.targets.instantiate(name)?;
                    let signature = member_signature(instance.as_ref(), member)?;
                    (Callee::Owned(instance, member.as_str()), signature)
                }
            },
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(callee = ?callee, params = signature.len(), "resolved callee");

        Ok(Resolved { callee, signature })
    }
}

fn member_signature<R>(
    controller: &dyn Controller<R>,
    member: &str,
) -> Result<Signature, ConfigurationError> {
    controller
        .operation(member)
        .map(|op| op.signature().clone())
        .ok_or_else(|| ConfigurationError::UnknownMember {
            target: controller.name().to_string(),
            member: member.to_string(),
        })
}

enum Callee<'a, R> {
    Handler(&'a dyn Handler<R>),
    Shared(&'a dyn Controller<R>, &'a str),
    Owned(Box<dyn Controller<R>>, &'a str),
}

impl<R> fmt::Debug for Callee<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callee::Handler(_) => f.write_str("handler"),
            Callee::Shared(c, member) => write!(f, "{}#{member}", c.name()),
            Callee::Owned(c, member) => write!(f, "{}#{member}", c.name()),
        }
    }
}

/// A resolved callee together with its declared signature.
pub struct Resolved<'a, R> {
    callee: Callee<'a, R>,
    signature: Signature,
}

impl<R> Resolved<'_, R> {
    /// The declared parameters, in call order.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Invoke the callee.
    pub fn call(&self, args: Args) -> Result<R, BoxError> {
        match &self.callee {
            Callee::Handler(handler) => handler.call(args),
            Callee::Shared(controller, member) => controller.call(member, args),
            Callee::Owned(controller, member) => controller.call(member, args),
        }
    }
}

impl<R> fmt::Debug for Resolved<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("callee", &self.callee)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Order `params` by `signature`, filling declared defaults.
///
/// # Errors
///
/// [`ConfigurationError::MissingDefault`] when a required parameter was not
/// captured.
pub fn arrange(signature: &Signature, params: &Params) -> Result<Args, ConfigurationError> {
    let mut args = Args::new();
    for spec in signature.params() {
        let value = match (params.get(spec.name()), spec.default()) {
            (Some(value), _) => Some(value.to_string()),
            (None, ParamDefault::Value(value)) => Some(value.clone()),
            (None, ParamDefault::Absent) => None,
            (None, ParamDefault::Required) => {
                return Err(ConfigurationError::MissingDefault {
                    param: spec.name().to_string(),
                });
            }
        };
        args.push(spec.name(), value);
    }
    Ok(args)
}

/// Convert an operation failure into a [`DispatchError`].
///
/// Argument conversion failures raised inside the operation keep their
/// [`ArgumentError`] type; anything else becomes [`DispatchError::Handler`].
pub fn handler_error(err: BoxError) -> DispatchError {
    match err.downcast::<ArgumentError>() {
        Ok(arg) => DispatchError::Argument(*arg),
        Err(err) => DispatchError::Handler(err),
    }
}

/// The built-in positional strategy, registered as `"uri"`.
///
/// Resolves the action, arranges the captured parameters into the callee's
/// declared order, and invokes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UriStrategy;

impl<R> Strategy<R> for UriStrategy {
    fn invoke(&self, invocation: Invocation<'_, R>) -> Result<R, DispatchError> {
        let resolved = invocation.resolve()?;
        let args = arrange(resolved.signature(), invocation.params())?;
        resolved.call(args).map_err(handler_error)
    }
}

/// Registry of named strategies.
pub struct Strategies<R> {
    strategies: HashMap<String, Arc<dyn Strategy<R>>>,
}

impl<R> Default for Strategies<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Strategies<R> {
    /// A registry containing the built-in strategy.
    pub fn new() -> Self {
        let mut strategies: HashMap<String, Arc<dyn Strategy<R>>> = HashMap::new();
        strategies.insert(DEFAULT_STRATEGY.to_string(), Arc::new(UriStrategy));
        Self { strategies }
    }

    /// Register a strategy under `tag`, replacing any previous one.
    pub fn register<S: Strategy<R> + 'static>(&mut self, tag: impl Into<String>, strategy: S) {
        self.strategies.insert(tag.into(), Arc::new(strategy));
    }

    /// Check whether a tag is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.strategies.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.strategies.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Look up a strategy.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownStrategy`] listing the registered tags.
    pub fn get(&self, tag: &str) -> Result<&dyn Strategy<R>, ConfigurationError> {
        self.strategies
            .get(tag)
            .map(|s| s.as_ref())
            .ok_or_else(|| ConfigurationError::UnknownStrategy {
                tag: tag.to_string(),
                available: self.tags(),
            })
    }
}

impl<R> fmt::Debug for Strategies<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategies")
            .field("tags", &self.tags())
            .finish()
    }
}
