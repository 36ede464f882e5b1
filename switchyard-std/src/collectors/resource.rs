//! Resource-style routes.
//!
//! Registers the conventional create/read/update/delete routes for a
//! resource, each pointing at the action of the same name on the target.

use switchyard_core::{
    Action, Collector, Extension, ExtensionOptions, RegisterError, TargetRef, UsageError,
};

/// Resource actions with their verb and path template. `{name}` is
/// substituted with the resource name.
pub const RESOURCE_ACTIONS: [(&str, &str, &str); 7] = [
    ("index", "get", "/{name}/"),
    ("make", "get", "/{name}/make"),
    ("create", "post", "/{name}"),
    ("show", "get", "/{name}/{id}"),
    ("edit", "get", "/{name}/{id}/edit"),
    ("update", "put", "/{name}/{id}"),
    ("delete", "delete", "/{name}/{id}"),
];

/// The `"resource"` extension.
///
/// Options: `name` overrides the resource name, `only` and `except` filter
/// the registered actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceCollector;

impl<R> Extension<R> for ResourceCollector {
    fn extend(
        &self,
        collector: &mut Collector<R>,
        target: &TargetRef<R>,
        options: &ExtensionOptions,
    ) -> Result<(), RegisterError> {
        validate(options)?;
        let name = match options.explicit_name() {
            Some(name) => name.to_string(),
            None => resource_name(target.name()),
        };

        for (action, verb, template) in RESOURCE_ACTIONS {
            if !options.includes(action) {
                continue;
            }
            let pattern = template.replacen("{name}", &name, 1);

            #[cfg(feature = "tracing")]
            tracing::debug!(resource = %name, action = %action, verb = %verb, pattern = %pattern, "collected resource action");

            collector.set(verb, &pattern, Action::member(target.clone(), action))?;
        }
        Ok(())
    }
}

/// Derive a resource name from a target name.
///
/// The last `::` segment is taken, a trailing `Controller` is removed, and
/// the result is lowercased: `Admin::UserController` → `user`.
pub fn resource_name(target: &str) -> String {
    let base = target.rsplit("::").next().unwrap_or(target);
    let base = base.strip_suffix("Controller").unwrap_or(base);
    base.to_lowercase()
}

fn validate(options: &ExtensionOptions) -> Result<(), UsageError> {
    let only = options.only_actions().unwrap_or_default();
    let unknown = only
        .iter()
        .chain(options.except_actions())
        .find(|a| !RESOURCE_ACTIONS.iter().any(|(name, _, _)| *name == a.as_str()));
    match unknown {
        Some(action) => Err(UsageError::UnknownResourceAction {
            action: action.clone(),
        }),
        None => Ok(()),
    }
}
