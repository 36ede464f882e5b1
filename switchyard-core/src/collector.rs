//! # Route Registration
//!
//! [`Collector`] is the build-phase surface: it registers routes under the
//! active [`Scope`], holds the strategy, target and extension registries, and
//! hands everything to a [`Dispatcher`] once building is done.
//!
//! ```
//! use switchyard_core::{Collector, Group, Signature, handler};
//!
//! let mut routes = Collector::<String>::new();
//! routes.get("/", handler(Signature::empty(), |_| Ok("home".to_string())))?;
//! routes.group(Group::new().prefix("/user"), |r| {
//!     r.get("/{id:\\d+}", handler(Signature::of(["id"]), |args| {
//!         Ok(format!("user {}", args.required::<u32>(0)?))
//!     }))?;
//!     Ok(())
//! })?;
//!
//! let dispatcher = routes.into_dispatcher();
//! assert_eq!(dispatcher.dispatch("GET", "/user/18")?, "user 18");
//! # Ok::<(), switchyard_core::RouterError>(())
//! ```

use crate::{
    dispatcher::Dispatcher,
    error::{ConfigurationError, RegisterError},
    extension::{Extension, ExtensionOptions},
    route::IntoAction,
    scope::{Group, Scope, ScopeGuard},
    strategy::{Strategies, Strategy},
    table::{DEFAULT_STRATEGY, RouteTable, normalize_method},
    target::{Controller, Operation, TargetRef, Targets},
};
use std::{collections::HashMap, fmt, sync::Arc};

/// Verbs used by [`Collector::any`], [`Collector::except`] and
/// method-derived collectors unless replaced with [`Collector::with_methods`].
pub const DEFAULT_METHODS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

/// Name and operations of a target, as seen by extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    /// The target's name.
    pub name: String,
    /// Every operation the target exposes.
    pub operations: Vec<Operation>,
}

impl TargetInfo {
    fn of<R>(controller: &dyn Controller<R>) -> Self {
        Self {
            name: controller.name().to_string(),
            operations: controller.operations().to_vec(),
        }
    }
}

/// The route registration API.
pub struct Collector<R> {
    table: RouteTable<R>,
    scope: Scope,
    methods: Vec<String>,
    strategies: Strategies<R>,
    targets: Targets<R>,
    extensions: HashMap<String, Arc<dyn Extension<R>>>,
}

impl<R> Default for Collector<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Collector<R> {
    /// An empty collector with the built-in strategy and no extensions.
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            scope: Scope::root(),
            methods: DEFAULT_METHODS.iter().map(|m| m.to_string()).collect(),
            strategies: Strategies::new(),
            targets: Targets::new(),
            extensions: HashMap::new(),
        }
    }

    /// Replace the supported verb list.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| normalize_method(m.as_ref()))
            .collect();
        self
    }

    /// The supported verbs, lowercase.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    // ---- Registration ------------------------------------------------------

    /// Register `action` for `method` + `pattern` with the built-in strategy.
    ///
    /// The active prefix is prepended to `pattern` and the active namespace is
    /// applied to named targets.
    pub fn set(
        &mut self,
        method: &str,
        pattern: &str,
        action: impl IntoAction<R>,
    ) -> Result<&mut Self, RegisterError> {
        self.set_with_strategy(method, pattern, action, DEFAULT_STRATEGY)
    }

    /// Register a route invoked through the strategy named `strategy`.
    ///
    /// The tag is resolved at dispatch time.
    pub fn set_with_strategy(
        &mut self,
        method: &str,
        pattern: &str,
        action: impl IntoAction<R>,
        strategy: &str,
    ) -> Result<&mut Self, RegisterError> {
        let action = action.into_action()?.in_namespace(self.scope.namespace());
        let pattern = self.scope.apply(pattern);
        self.table.set(method, &pattern, action, strategy)?;
        Ok(self)
    }

    /// Alias of [`set`](Self::set).
    pub fn map(
        &mut self,
        method: &str,
        pattern: &str,
        action: impl IntoAction<R>,
    ) -> Result<&mut Self, RegisterError> {
        self.set(method, pattern, action)
    }

    /// Register a GET route.
    pub fn get(&mut self, pattern: &str, action: impl IntoAction<R>) -> Result<&mut Self, RegisterError> {
        self.set("get", pattern, action)
    }

    /// Register a POST route.
    pub fn post(&mut self, pattern: &str, action: impl IntoAction<R>) -> Result<&mut Self, RegisterError> {
        self.set("post", pattern, action)
    }

    /// Register a PUT route.
    pub fn put(&mut self, pattern: &str, action: impl IntoAction<R>) -> Result<&mut Self, RegisterError> {
        self.set("put", pattern, action)
    }

    /// Register a PATCH route.
    pub fn patch(&mut self, pattern: &str, action: impl IntoAction<R>) -> Result<&mut Self, RegisterError> {
        self.set("patch", pattern, action)
    }

    /// Register a DELETE route.
    pub fn delete(&mut self, pattern: &str, action: impl IntoAction<R>) -> Result<&mut Self, RegisterError> {
        self.set("delete", pattern, action)
    }

    /// Register the same action under several methods.
    pub fn match_methods<I, S>(
        &mut self,
        methods: I,
        pattern: &str,
        action: impl IntoAction<R>,
    ) -> Result<&mut Self, RegisterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let action = action.into_action()?;
        for method in methods {
            self.set(method.as_ref(), pattern, action.clone())?;
        }
        Ok(self)
    }

    /// Register under every supported method.
    pub fn any(&mut self, pattern: &str, action: impl IntoAction<R>) -> Result<&mut Self, RegisterError> {
        let methods = self.methods.clone();
        self.match_methods(methods, pattern, action)
    }

    /// Register under every supported method except `excluded`.
    pub fn except<I, S>(
        &mut self,
        excluded: I,
        pattern: &str,
        action: impl IntoAction<R>,
    ) -> Result<&mut Self, RegisterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded: Vec<String> = excluded
            .into_iter()
            .map(|m| normalize_method(m.as_ref()))
            .collect();
        let methods: Vec<String> = self
            .methods
            .iter()
            .filter(|m| !excluded.contains(m))
            .cloned()
            .collect();
        self.match_methods(methods, pattern, action)
    }

    // ---- Scope -------------------------------------------------------------

    /// Run `body` with `group`'s prefix and namespace applied.
    ///
    /// The enclosing scope is restored when `body` returns, fails, or panics.
    pub fn group<F>(&mut self, group: Group, body: F) -> Result<&mut Self, RegisterError>
    where
        F: FnOnce(&mut Collector<R>) -> Result<(), RegisterError>,
    {
        {
            let mut guard = self.scoped(&group);
            body(&mut *guard)?;
        }
        Ok(self)
    }

    /// Enter `group` until the returned guard is dropped.
    pub fn scoped(&mut self, group: &Group) -> ScopeGuard<'_, R> {
        ScopeGuard::enter(self, group)
    }

    /// The active scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub(crate) fn replace_scope(&mut self, scope: Scope) -> Scope {
        std::mem::replace(&mut self.scope, scope)
    }

    /// Replace the active prefix.
    pub fn set_prefix(&mut self, prefix: &str) -> &mut Self {
        self.scope = self.scope.clone().with_prefix(prefix);
        self
    }

    /// Replace the active namespace.
    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.scope = self.scope.clone().with_namespace(namespace);
        self
    }

    // ---- Registries --------------------------------------------------------

    /// Register an extension under `name`, replacing any previous one.
    pub fn extension<E: Extension<R> + 'static>(&mut self, name: impl Into<String>, extension: E) -> &mut Self {
        self.extensions.insert(name.into(), Arc::new(extension));
        self
    }

    /// Registered extension names, sorted.
    pub fn extension_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Register a named target factory.
    pub fn target<F, C>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        R: 'static,
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller<R> + 'static,
    {
        self.targets.register(name, factory);
        self
    }

    /// Register a strategy under `tag`.
    pub fn strategy<S: Strategy<R> + 'static>(&mut self, tag: impl Into<String>, strategy: S) -> &mut Self {
        self.strategies.register(tag, strategy);
        self
    }

    /// The target registry.
    pub fn targets(&self) -> &Targets<R> {
        &self.targets
    }

    /// The strategy registry.
    pub fn strategies(&self) -> &Strategies<R> {
        &self.strategies
    }

    // ---- Extensions --------------------------------------------------------

    /// Run the extension registered under `name` for `target`.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownExtension`] if nothing is registered under
    /// `name`, or whatever the extension reports.
    pub fn apply(
        &mut self,
        name: &str,
        target: impl Into<TargetRef<R>>,
        options: &ExtensionOptions,
    ) -> Result<&mut Self, RegisterError> {
        let extension = self.extensions.get(name).cloned().ok_or_else(|| {
            ConfigurationError::UnknownExtension {
                name: name.to_string(),
                available: self.extension_names(),
            }
        })?;
        let target = target.into();

        #[cfg(feature = "tracing")]
        tracing::debug!(extension = %name, target_name = %target.name(), "applying extension");

        extension.extend(self, &target, options)?;
        Ok(self)
    }

    /// Shorthand for `apply("controller", target, ..)`.
    pub fn controller(&mut self, target: impl Into<TargetRef<R>>) -> Result<&mut Self, RegisterError> {
        self.apply("controller", target, &ExtensionOptions::new())
    }

    /// Shorthand for `apply("resource", target, options)`.
    pub fn resource(
        &mut self,
        target: impl Into<TargetRef<R>>,
        options: ExtensionOptions,
    ) -> Result<&mut Self, RegisterError> {
        self.apply("resource", target, &options)
    }

    /// Name and operations of `target`.
    ///
    /// Named targets are looked up under the active namespace.
    pub fn describe(&self, target: &TargetRef<R>) -> Result<TargetInfo, ConfigurationError> {
        match target {
            TargetRef::Instance(instance) => Ok(TargetInfo::of(instance.as_ref())),
            TargetRef::Named(_) => {
                let qualified = target.clone().in_namespace(self.scope.namespace());
                let instance = self.targets.instantiate(qualified.name())?;
                Ok(TargetInfo::of(instance.as_ref()))
            }
        }
    }

    // ---- Lifecycle ---------------------------------------------------------

    /// Seal the route table.
    pub fn seal(&mut self) -> &mut Self {
        self.table.seal();
        self
    }

    /// Returns true once the table has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.table.is_sealed()
    }

    /// The route table built so far.
    pub fn table(&self) -> &RouteTable<R> {
        &self.table
    }

    /// Seal the table and hand everything to a [`Dispatcher`].
    pub fn into_dispatcher(self) -> Dispatcher<R> {
        Dispatcher::new(self.table, self.strategies, self.targets)
    }
}

impl<R> fmt::Debug for Collector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("table", &self.table)
            .field("scope", &self.scope)
            .field("methods", &self.methods)
            .field("strategies", &self.strategies)
            .field("targets", &self.targets)
            .field("extensions", &self.extension_names())
            .finish()
    }
}
