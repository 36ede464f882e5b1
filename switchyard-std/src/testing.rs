//! Testing utilities for Switchyard.
//!
//! # Features
//!
//! - [`RecordingHandler`]: a handler that records the arguments it receives
//! - [`EchoController`]: a target with hand-declared operations that records
//!   every call and echoes it back
//! - [`render`]: the echo format shared by both, `name(a,b,-)` with `-` for
//!   an absent value

use std::sync::{Arc, Mutex};
use switchyard_core::{Args, BoxError, Controller, Handler, Operation, Signature};

/// Render a call as `name(arg,arg,-)`.
pub fn render(name: &str, args: &Args) -> String {
    let values: Vec<&str> = args.values().map(|v| v.unwrap_or("-")).collect();
    format!("{name}({})", values.join(","))
}

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records every argument list it is called with.
///
/// Clones share the same record, so one clone can be registered while the
/// other is inspected.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::new("user", Signature::of(["id"]));
/// routes.get("/user/{id}", recorder.clone())?;
///
/// dispatcher.dispatch("get", "/user/7")?;
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingHandler {
    tag: String,
    signature: Signature,
    calls: Arc<Mutex<Vec<Args>>>,
}

impl RecordingHandler {
    /// Create a recording handler that answers with [`render`]`(tag, args)`.
    pub fn new(tag: impl Into<String>, signature: Signature) -> Self {
        Self {
            tag: tag.into(),
            signature,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded argument lists.
    pub fn calls(&self) -> Vec<Args> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Clone for RecordingHandler {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            signature: self.signature.clone(),
            calls: self.calls.clone(),
        }
    }
}

impl Handler<String> for RecordingHandler {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: Args) -> Result<String, BoxError> {
        let out = render(&self.tag, &args);
        self.calls.lock().unwrap().push(args);
        Ok(out)
    }
}

// ============================================================================
// Echo Controller
// ============================================================================

/// A target whose operations are declared by hand and answer with
/// [`render`]`(member, args)`.
///
/// Clones share the call record, so a clone can serve as a factory for
/// named registration.
///
/// # Example
///
/// ```rust,ignore
/// let users = EchoController::new("UserController")
///     .operation("get_index", Signature::empty())
///     .operation("get_show", Signature::of(["id"]));
///
/// let factory = users.clone();
/// routes.target("UserController", move || factory.clone());
/// routes.controller("UserController")?;
/// ```
pub struct EchoController {
    name: String,
    operations: Vec<Operation>,
    calls: Arc<Mutex<Vec<(String, Args)>>>,
}

impl EchoController {
    /// A target named `name` with no operations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Declare an operation.
    pub fn operation(mut self, name: impl Into<String>, signature: Signature) -> Self {
        self.operations.push(Operation::new(name, signature));
        self
    }

    /// Get a clone of the recorded `(member, args)` calls.
    pub fn calls(&self) -> Vec<(String, Args)> {
        self.calls.lock().unwrap().clone()
    }

    /// Names of the members called so far, in order.
    pub fn members(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(member, _)| member.clone())
            .collect()
    }
}

impl Clone for EchoController {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            operations: self.operations.clone(),
            calls: self.calls.clone(),
        }
    }
}

impl Controller<String> for EchoController {
    fn name(&self) -> &str {
        &self.name
    }

    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn call(&self, member: &str, args: Args) -> Result<String, BoxError> {
        if self.operation(member).is_none() {
            return Err(format!("`{}` has no operation `{member}`", self.name).into());
        }
        let out = render(member, &args);
        self.calls.lock().unwrap().push((member.to_string(), args));
        Ok(out)
    }
}
