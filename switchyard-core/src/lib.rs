//! # switchyard-core
//!
//! Core of the Switchyard URI router.
//!
//! The crate covers both phases of a router's life:
//!
//! ## Build phase
//!
//! - **Pattern compiler** ([`compile`]): `/user/{id:\d+}[/{name}]` becomes
//!   either a literal or an anchored matcher with ordered parameter names.
//! - **Route table** ([`RouteTable`]): per-method static index plus an
//!   ordered dynamic list. Sealing makes it read-only.
//! - **Registration** ([`Collector`]): verb shortcuts, grouping under a
//!   prefix/namespace ([`Group`]), and named [`Extension`]s that derive
//!   routes from targets.
//!
//! ## Serve phase
//!
//! - **Dispatcher** ([`Dispatcher`]): resolves (method, path), telling "no
//!   route" ([`NotFoundError`]) apart from "wrong method"
//!   ([`MethodNotAllowedError`]).
//! - **Strategies** ([`Strategy`]): turn a matched action + captured
//!   parameters into a call. The built-in [`UriStrategy`] orders arguments by
//!   the callee's [`Signature`] and fills defaults.
//!
//! # Actions
//!
//! A route invokes one of:
//!
//! - a [`Handler`] (usually a closure wrapped with [`handler`]),
//! - a `"Target#member"` descriptor, resolved against the registered target
//!   factories at dispatch time,
//! - a `(TargetRef, member)` pair.
//!
//! # Error Types
//!
//! - [`RouterError`] - Top-level error type
//! - [`RegisterError`] - Registration errors ([`CompileError`], [`UsageError`],
//!   [`ConfigurationError`])
//! - [`DispatchError`] - Dispatch outcomes and invocation failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod collector;
mod dispatcher;
mod error;
mod extension;
mod handler;
mod params;
mod pattern;
mod route;
mod scope;
mod strategy;
mod table;
mod target;

// Re-exports
pub use collector::{Collector, DEFAULT_METHODS, TargetInfo};
pub use dispatcher::Dispatcher;
pub use error::{
    ArgumentError, BoxError, CompileError, ConfigurationError, DispatchError,
    MethodNotAllowedError, NotFoundError, RegisterError, RouterError, UsageError,
};
pub use extension::{Extension, ExtensionOptions};
pub use handler::{Args, FnHandler, Handler, ParamDefault, ParamSpec, Signature, handler};
pub use params::Params;
pub use pattern::{
    CompiledPattern, DEFAULT_CONSTRAINT, Matcher, PatternKind, compile, normalize, normalize_path,
};
pub use route::{Action, IntoAction, Route, RouteMatch};
pub use scope::{Group, Scope, ScopeGuard};
pub use strategy::{
    Invocation, Resolved, Strategies, Strategy, UriStrategy, arrange, handler_error,
};
pub use table::{DEFAULT_STRATEGY, RouteTable, normalize_method};
pub use target::{Controller, Operation, TargetFactory, TargetRef, Targets};
