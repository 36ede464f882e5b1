//! # switchyard - URI Routing Engine
//!
//! `switchyard` maps an HTTP method and a request path to an action. Routes
//! are registered in a build phase, then sealed into a read-only
//! [`Dispatcher`] that can be shared across threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use switchyard::{Group, Signature, handler};
//!
//! let mut routes = switchyard::collector::<String>();
//! routes.get("/", handler(Signature::empty(), |_| Ok("home".to_string())))?;
//! routes.group(Group::new().prefix("/user"), |r| {
//!     r.get(
//!         "/{id:\\d+}[/{name}]",
//!         handler(Signature::of(["id", "name?"]), |args| {
//!             Ok(format!("{} {}", args.get(0).unwrap_or("?"), args.get(1).unwrap_or("-")))
//!         }),
//!     )?;
//!     Ok(())
//! })?;
//!
//! let dispatcher = routes.into_dispatcher();
//! assert_eq!(dispatcher.dispatch("GET", "/user/18/alex")?, "18 alex");
//! assert!(dispatcher.dispatch("POST", "/user/18").unwrap_err().is_method_not_allowed());
//! # Ok::<(), switchyard::RouterError>(())
//! ```
//!
//! ## Targets
//!
//! Types annotated with `#[controller]` describe their operations, so the
//! `"controller"` extension can derive routes from method names:
//!
//! ```rust,ignore
//! struct UserController;
//!
//! #[switchyard::controller]
//! impl UserController {
//!     pub fn get_show(&self, id: u32) -> String {
//!         format!("user {id}")
//!     }
//! }
//!
//! let mut routes = switchyard::collector::<String>();
//! routes.controller(TargetRef::instance(UserController))?; // GET /show/{id:[0-9]+}
//! ```
//!
//! ## Features
//!
//! - `macros` (default): re-exports `#[controller]`
//! - `tracing`: emits `tracing` events on registration and dispatch

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use switchyard_core::{
    // Handlers
    Action,
    Args,
    // Error types
    ArgumentError,
    BoxError,
    // Registration
    Collector,
    CompileError,
    // Patterns
    CompiledPattern,
    ConfigurationError,
    // Targets
    Controller,
    DEFAULT_CONSTRAINT,
    DEFAULT_METHODS,
    DEFAULT_STRATEGY,
    DispatchError,
    // Dispatch
    Dispatcher,
    Extension,
    ExtensionOptions,
    FnHandler,
    Group,
    Handler,
    IntoAction,
    Invocation,
    Matcher,
    MethodNotAllowedError,
    NotFoundError,
    Operation,
    ParamDefault,
    ParamSpec,
    Params,
    PatternKind,
    RegisterError,
    Resolved,
    Route,
    RouteMatch,
    RouteTable,
    RouterError,
    Scope,
    ScopeGuard,
    Signature,
    Strategies,
    // Strategies
    Strategy,
    TargetFactory,
    TargetInfo,
    TargetRef,
    Targets,
    UriStrategy,
    UsageError,
    arrange,
    compile,
    handler,
    handler_error,
    normalize,
    normalize_path,
    normalize_method,
};

pub use switchyard_std::strategies::DECODE_STRATEGY;

/// Extension name of the method-derived collector.
pub const CONTROLLER_EXTENSION: &str = "controller";

/// Extension name of the resource collector.
pub const RESOURCE_EXTENSION: &str = "resource";

/// Create a collector with the standard extensions and strategies loaded.
///
/// Registers [`ControllerCollector`](collectors::ControllerCollector) as
/// `"controller"`, [`ResourceCollector`](collectors::ResourceCollector) as
/// `"resource"` and [`DecodeStrategy`](strategies::DecodeStrategy) as
/// `"decode"`, next to the built-in `"uri"` strategy.
pub fn collector<R: 'static>() -> Collector<R> {
    let mut collector = Collector::new();
    collector
        .extension(CONTROLLER_EXTENSION, collectors::ControllerCollector)
        .extension(RESOURCE_EXTENSION, collectors::ResourceCollector)
        .strategy(DECODE_STRATEGY, strategies::DecodeStrategy);
    collector
}

/// Route-deriving extensions.
pub mod collectors {
    pub use switchyard_std::collectors::{ControllerCollector, RESOURCE_ACTIONS, ResourceCollector};

    pub use switchyard_std::collectors::controller::{derive_path, derive_suffix, split_verb};
    pub use switchyard_std::collectors::resource::resource_name;
}

/// Alternate invocation strategies.
pub mod strategies {
    pub use switchyard_std::strategies::{DECODE_STRATEGY, DecodeStrategy, MapStrategy, decode};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use switchyard_std::testing::*;
}

/// Prelude module - common imports for Switchyard.
///
/// # Usage
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Actions
        Action,
        Args,
        // Errors
        BoxError,
        // Registration
        Collector,
        // Targets
        Controller,
        DispatchError,
        // Dispatch
        Dispatcher,
        ExtensionOptions,
        Group,
        Handler,
        Operation,
        ParamSpec,
        RegisterError,
        RouterError,
        Signature,
        TargetRef,
        handler,
    };
}

#[cfg(feature = "macros")]
pub use switchyard_macros::controller;
