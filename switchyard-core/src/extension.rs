//! Named collector capabilities.
//!
//! An [`Extension`] turns a target into a set of route registrations. The
//! [`Collector`] keeps them in a name → extension map and looks them up with
//! [`Collector::apply`].

use crate::{collector::Collector, error::RegisterError, target::TargetRef};

/// A collector capability, such as deriving routes from a target's
/// operations.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a collector extension for `{R}`",
    label = "missing `Extension<{R}>` implementation"
)]
pub trait Extension<R>: Send + Sync {
    /// Register routes for `target` on `collector`.
    fn extend(
        &self,
        collector: &mut Collector<R>,
        target: &TargetRef<R>,
        options: &ExtensionOptions,
    ) -> Result<(), RegisterError>;
}

/// Options passed to an [`Extension`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionOptions {
    name: Option<String>,
    only: Option<Vec<String>>,
    except: Vec<String>,
}

impl ExtensionOptions {
    /// No options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit name instead of one derived from the target.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register only these actions.
    pub fn only<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Skip these actions.
    pub fn except<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except = actions.into_iter().map(Into::into).collect();
        self
    }

    /// The explicit name, if set.
    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `only` filter, if set.
    pub fn only_actions(&self) -> Option<&[String]> {
        self.only.as_deref()
    }

    /// The `except` filter.
    pub fn except_actions(&self) -> &[String] {
        &self.except
    }

    /// Whether `action` survives both filters.
    pub fn includes(&self, action: &str) -> bool {
        let included = self
            .only
            .as_ref()
            .is_none_or(|only| only.iter().any(|a| a == action));
        included && !self.except.iter().any(|a| a == action)
    }
}
