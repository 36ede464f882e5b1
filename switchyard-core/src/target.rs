//! # Targets
//!
//! A target (controller) exposes named operations, each with a declared
//! [`Signature`]. Routes reach a target in two ways:
//!
//! - **By name**: `"User#show"` or `(TargetRef::Named, "show")`. A fresh
//!   instance is built from the [`Targets`] registry on every invocation.
//! - **By instance**: `(TargetRef::Instance, "show")`. The shared instance is
//!   used directly.
//!
//! Operation metadata is declared explicitly, either written by hand or
//! generated by `#[switchyard::controller]`; nothing is discovered at runtime.

use crate::{
    error::{BoxError, ConfigurationError},
    handler::{Args, Signature},
};
use std::{collections::HashMap, fmt, sync::Arc};

/// A named operation of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: String,
    signature: Signature,
}

impl Operation {
    /// Create an operation.
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }

    /// The operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameters.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// A target whose operations can be routed to.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a route target producing `{R}`",
    label = "missing `Controller<{R}>` implementation",
    note = "Annotate the impl block with `#[switchyard::controller]` or implement `Controller` by hand."
)]
pub trait Controller<R>: Send + Sync {
    /// The target's name, used by collectors to derive paths.
    fn name(&self) -> &str;

    /// Every operation the target exposes.
    fn operations(&self) -> &[Operation];

    /// Invoke `member` with positional arguments.
    fn call(&self, member: &str, args: Args) -> Result<R, BoxError>;

    /// Look up one operation.
    fn operation(&self, member: &str) -> Option<&Operation> {
        self.operations().iter().find(|op| op.name() == member)
    }
}

/// How an action refers to its target.
pub enum TargetRef<R> {
    /// A target built from the [`Targets`] registry on each call.
    Named(String),
    /// A shared instance.
    Instance(Arc<dyn Controller<R>>),
}

impl<R> TargetRef<R> {
    /// Refer to a registered target by name.
    pub fn named(name: impl Into<String>) -> Self {
        TargetRef::Named(name.into())
    }

    /// Wrap a target instance.
    pub fn instance<C: Controller<R> + 'static>(controller: C) -> Self {
        TargetRef::Instance(Arc::new(controller))
    }

    /// The name of the target.
    pub fn name(&self) -> &str {
        match self {
            TargetRef::Named(name) => name,
            TargetRef::Instance(instance) => instance.name(),
        }
    }

    /// Prefix a named reference with a namespace; instances are unchanged.
    pub fn in_namespace(self, namespace: &str) -> Self {
        match self {
            TargetRef::Named(name) if !namespace.is_empty() => {
                TargetRef::Named(format!("{namespace}::{name}"))
            }
            other => other,
        }
    }
}

impl<R> Clone for TargetRef<R> {
    fn clone(&self) -> Self {
        match self {
            TargetRef::Named(name) => TargetRef::Named(name.clone()),
            TargetRef::Instance(instance) => TargetRef::Instance(Arc::clone(instance)),
        }
    }
}

impl<R> fmt::Debug for TargetRef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            TargetRef::Instance(instance) => f.debug_tuple("Instance").field(&instance.name()).finish(),
        }
    }
}

impl<R> From<&str> for TargetRef<R> {
    fn from(name: &str) -> Self {
        TargetRef::Named(name.to_string())
    }
}

impl<R> From<String> for TargetRef<R> {
    fn from(name: String) -> Self {
        TargetRef::Named(name)
    }
}

impl<R> From<Arc<dyn Controller<R>>> for TargetRef<R> {
    fn from(instance: Arc<dyn Controller<R>>) -> Self {
        TargetRef::Instance(instance)
    }
}

/// Builds a fresh target instance.
pub type TargetFactory<R> = Arc<dyn Fn() -> Box<dyn Controller<R>> + Send + Sync>;

/// Registry of named target factories.
pub struct Targets<R> {
    factories: HashMap<String, TargetFactory<R>>,
}

impl<R> Default for Targets<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Targets<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F, C>(&mut self, name: impl Into<String>, factory: F)
    where
        R: 'static,
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller<R> + 'static,
    {
        self.factories.insert(
            name.into(),
            Arc::new(move || Box::new(factory()) as Box<dyn Controller<R>>),
        );
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build a fresh instance of the named target.
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Controller<R>>, ConfigurationError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConfigurationError::UnknownTarget {
                name: name.to_string(),
                available: self.names(),
            })
    }
}

impl<R> fmt::Debug for Targets<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Targets")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeter {
        operations: Vec<Operation>,
    }

    impl Greeter {
        fn new() -> Self {
            Self {
                operations: vec![Operation::new("hello", Signature::of(["name"]))],
            }
        }
    }

    impl Controller<String> for Greeter {
        fn name(&self) -> &str {
            "Greeter"
        }

        fn operations(&self) -> &[Operation] {
            &self.operations
        }

        fn call(&self, member: &str, args: Args) -> Result<String, BoxError> {
            match member {
                "hello" => Ok(format!("hello {}", args.required::<String>(0)?)),
                _ => Err("no such member".into()),
            }
        }
    }

    #[test]
    fn test_instantiate_known_target() {
        let mut targets = Targets::<String>::new();
        targets.register("Greeter", Greeter::new);

        let greeter = targets.instantiate("Greeter").unwrap();
        assert_eq!(greeter.name(), "Greeter");
        assert!(greeter.operation("hello").is_some());
        assert!(greeter.operation("bye").is_none());
    }

    #[test]
    fn test_unknown_target_lists_available() {
        let mut targets = Targets::<String>::new();
        targets.register("Greeter", Greeter::new);

        match targets.instantiate("Missing") {
            Err(ConfigurationError::UnknownTarget { name, available }) => {
                assert_eq!(name, "Missing");
                assert_eq!(available, vec!["Greeter".to_string()]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_namespace_only_applies_to_named() {
        let named: TargetRef<String> = TargetRef::named("User");
        assert_eq!(named.in_namespace("Admin").name(), "Admin::User");

        let instance: TargetRef<String> = TargetRef::instance(Greeter::new());
        assert_eq!(instance.in_namespace("Admin").name(), "Greeter");

        let unscoped: TargetRef<String> = TargetRef::named("User");
        assert_eq!(unscoped.in_namespace("").name(), "User");
    }
}
