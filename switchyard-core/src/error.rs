//! Error types for Switchyard.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RouterError`] - Top-level error type for all Switchyard operations
//! - [`RegisterError`] - Errors raised while building the route table
//! - [`DispatchError`] - Errors raised while resolving or invoking a route
//!
//! Registration errors are defects in the route definitions and are reported
//! before the table is sealed. [`NotFoundError`] and [`MethodNotAllowedError`]
//! are ordinary dispatch outcomes, not defects.

use std::collections::BTreeSet;
use thiserror::Error;

/// A boxed error type for handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Switchyard operations.
#[derive(Error, Debug)]
pub enum RouterError {
    /// A route could not be registered.
    #[error("registration error: {0}")]
    Register(#[from] RegisterError),

    /// A request could not be dispatched.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Errors that can occur while registering routes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The pattern is malformed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A collector was used incorrectly.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The collector or table is misconfigured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A malformed route pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A `]` without a matching `[`.
    #[error("unexpected `]` at byte {position} in pattern `{pattern}`")]
    UnexpectedClose {
        /// The offending pattern.
        pattern: String,
        /// Byte offset of the bracket.
        position: usize,
    },

    /// A `[` that is never closed.
    #[error("unclosed `[` at byte {position} in pattern `{pattern}`")]
    UnclosedGroup {
        /// The offending pattern.
        pattern: String,
        /// Byte offset of the bracket.
        position: usize,
    },

    /// An optional group with nothing inside.
    #[error("empty optional group at byte {position} in pattern `{pattern}`")]
    EmptyGroup {
        /// The offending pattern.
        pattern: String,
        /// Byte offset of the opening bracket.
        position: usize,
    },

    /// A placeholder with an invalid name, an empty constraint, or no closing brace.
    #[error("invalid placeholder `{placeholder}` in pattern `{pattern}`")]
    InvalidPlaceholder {
        /// The offending pattern.
        pattern: String,
        /// The placeholder text as written.
        placeholder: String,
    },

    /// A placeholder constraint that is not a valid regular expression.
    #[error("invalid constraint `{constraint}` for parameter `{name}` in pattern `{pattern}`: {reason}")]
    InvalidConstraint {
        /// The offending pattern.
        pattern: String,
        /// The parameter name.
        name: String,
        /// The constraint as written.
        constraint: String,
        /// The regex compiler's message.
        reason: String,
    },

    /// The same placeholder name appears twice.
    #[error("duplicate parameter `{name}` in pattern `{pattern}`")]
    DuplicateParam {
        /// The offending pattern.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// The assembled matcher failed to compile.
    #[error("pattern `{pattern}` does not compile: {reason}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// The regex compiler's message.
        reason: String,
    },
}

/// Incorrect use of a route collector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A required parameter follows an optional one, so no trailing optional
    /// group can express the operation.
    #[error("required parameter `{param}` of `{operation}` follows an optional parameter")]
    RequiredAfterOptional {
        /// The operation being collected.
        operation: String,
        /// The required parameter.
        param: String,
    },

    /// A resource filter names an action outside the fixed resource action set.
    #[error("unknown resource action `{action}`")]
    UnknownResourceAction {
        /// The unrecognised action.
        action: String,
    },
}

/// Misconfiguration detected at registration or dispatch time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// `set` was called after the table was sealed.
    #[error("cannot register `{method} {pattern}`: the route table is sealed")]
    Sealed {
        /// The rejected method.
        method: String,
        /// The rejected pattern.
        pattern: String,
    },

    /// A route names a strategy that is not registered.
    #[error("unknown strategy `{tag}` (registered: {})", .available.join(", "))]
    UnknownStrategy {
        /// The requested tag.
        tag: String,
        /// Tags that ARE registered.
        available: Vec<String>,
    },

    /// A named target has no registered factory.
    #[error("unknown target `{name}` (registered: {})", .available.join(", "))]
    UnknownTarget {
        /// The requested target name.
        name: String,
        /// Target names that ARE registered.
        available: Vec<String>,
    },

    /// A target does not declare the requested member.
    #[error("target `{target}` has no operation `{member}`")]
    UnknownMember {
        /// The target name.
        target: String,
        /// The requested member.
        member: String,
    },

    /// No extension is registered under the requested name.
    #[error("unknown extension `{name}` (registered: {})", .available.join(", "))]
    UnknownExtension {
        /// The requested extension name.
        name: String,
        /// Extension names that ARE registered.
        available: Vec<String>,
    },

    /// A `"Target#member"` descriptor could not be parsed.
    #[error("invalid action descriptor `{descriptor}`, expected `Target#member`")]
    InvalidDescriptor {
        /// The descriptor as written.
        descriptor: String,
    },

    /// A declared parameter was not captured and has no default.
    #[error("parameter `{param}` was not matched and declares no default")]
    MissingDefault {
        /// The parameter name.
        param: String,
    },
}

/// No route matches the requested path under any method.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no route matches {requested_method} {requested_path}")]
pub struct NotFoundError {
    /// The requested path, as given.
    pub requested_path: String,
    /// The requested method, normalized to lowercase.
    pub requested_method: String,
}

/// The requested path exists, but only under other methods.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "method {requested_method} is not allowed for {requested_path} (allowed: {})",
    .allowed_methods.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
)]
pub struct MethodNotAllowedError {
    /// The requested path, as given.
    pub requested_path: String,
    /// The requested method, normalized to lowercase.
    pub requested_method: String,
    /// Methods under which the path does match, sorted and deduplicated.
    pub allowed_methods: BTreeSet<String>,
}

impl MethodNotAllowedError {
    /// Whether the path would match under `method`.
    pub fn can(&self, method: &str) -> bool {
        self.allowed_methods.contains(&method.to_ascii_lowercase())
    }
}

/// A captured argument could not be converted for an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A required argument has no value.
    #[error("missing value for parameter `{param}`")]
    Missing {
        /// The parameter name.
        param: String,
    },

    /// An argument value failed to parse or transform.
    #[error("invalid value `{value}` for parameter `{param}`: {reason}")]
    Invalid {
        /// The parameter name.
        param: String,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors that can occur while dispatching a request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No route matches the path.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The path matches only under other methods.
    #[error(transparent)]
    MethodNotAllowed(#[from] MethodNotAllowedError),

    /// The matched route cannot be invoked as configured.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// An argument could not be prepared for the operation.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The invoked operation itself failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl DispatchError {
    /// Returns true for a [`NotFoundError`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchError::NotFound(_))
    }

    /// Returns true for a [`MethodNotAllowedError`].
    pub fn is_method_not_allowed(&self) -> bool {
        matches!(self, DispatchError::MethodNotAllowed(_))
    }
}
