//! Routes derived from a target's operation names.
//!
//! Every operation whose name starts with a supported verb becomes a route:
//!
//! | operation              | route                        |
//! |------------------------|------------------------------|
//! | `get_index`            | `GET /index`                 |
//! | `get_some_test`        | `GET /some/test`             |
//! | `getSomeTest`          | `GET /some/test`             |
//! | `post_user(id, name?)` | `POST /user/{id}[/{name}]`   |
//! | `get(id)`              | `GET /{id}`                  |
//!
//! The verb must be followed by `_`, an uppercase letter, or nothing, so
//! `getaway` is not collected.

use switchyard_core::{
    Action, Collector, Extension, ExtensionOptions, Operation, RegisterError, TargetRef,
    UsageError, compile,
};

/// The `"controller"` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerCollector;

impl<R> Extension<R> for ControllerCollector {
    fn extend(
        &self,
        collector: &mut Collector<R>,
        target: &TargetRef<R>,
        options: &ExtensionOptions,
    ) -> Result<(), RegisterError> {
        let info = collector.describe(target)?;
        let verbs = collector.methods().to_vec();

        // Every route is derived and compiled before any is registered.
        let mut derived = Vec::new();
        for operation in &info.operations {
            if !options.includes(operation.name()) {
                continue;
            }
            let Some((verb, rest)) = split_verb(operation.name(), &verbs) else {
                continue;
            };
            let pattern = derive_pattern(&derive_path(rest), &derive_suffix(operation)?);
            compile(&collector.scope().apply(&pattern))?;
            derived.push((verb.to_string(), pattern, operation.name()));
        }

        for (verb, pattern, member) in derived {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target_name = %info.name,
                operation = %member,
                verb = %verb,
                pattern = %pattern,
                "collected operation"
            );

            collector.set(&verb, &pattern, Action::member(target.clone(), member))?;
        }
        Ok(())
    }
}

/// Split an operation name into its verb and the remainder.
pub fn split_verb<'a>(name: &'a str, verbs: &'a [String]) -> Option<(&'a str, &'a str)> {
    verbs
        .iter()
        .filter_map(|verb| {
            let rest = name.strip_prefix(verb.as_str())?;
            let boundary = rest.is_empty() || rest.starts_with('_') || rest.starts_with(char::is_uppercase);
            boundary.then_some((verb.as_str(), rest))
        })
        .max_by_key(|(verb, _)| verb.len())
}

/// Convert the remainder of an operation name to a path.
///
/// Words are split at `_` and at lower-to-upper case changes, lowercased,
/// and joined with `/`.
pub fn derive_path(rest: &str) -> String {
    let mut path = String::with_capacity(rest.len() + 1);
    let mut prev_lower = false;
    for c in rest.chars() {
        if c == '_' {
            if !path.is_empty() && !path.ends_with('/') {
                path.push('/');
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() {
            if prev_lower || path.is_empty() {
                path.push('/');
            }
            path.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            if path.is_empty() {
                path.push('/');
            }
            path.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    path.trim_end_matches('/').to_string()
}

/// Build the placeholder suffix for an operation's parameters.
///
/// Each parameter contributes `/{name}` or `/{name:constraint}`; a trailing
/// run of optional parameters is wrapped in nested optional groups.
///
/// # Errors
///
/// [`UsageError::RequiredAfterOptional`] if a required parameter follows an
/// optional one.
pub fn derive_suffix(operation: &Operation) -> Result<String, UsageError> {
    let mut suffix = String::new();
    let mut open = 0usize;
    for param in operation.signature().params() {
        if param.is_optional() {
            suffix.push('[');
            open += 1;
        } else if open > 0 {
            return Err(UsageError::RequiredAfterOptional {
                operation: operation.name().to_string(),
                param: param.name().to_string(),
            });
        }
        suffix.push_str("/{");
        suffix.push_str(param.name());
        if let Some(constraint) = param.constraint_regex() {
            suffix.push(':');
            suffix.push_str(constraint);
        }
        suffix.push('}');
    }
    suffix.extend(std::iter::repeat_n(']', open));
    Ok(suffix)
}

fn derive_pattern(path: &str, suffix: &str) -> String {
    match (path.is_empty(), suffix.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) if suffix.starts_with('/') => suffix.to_string(),
        _ => format!("{}{suffix}", if path.is_empty() { "/" } else { path }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{ParamSpec, Signature};

    fn verbs() -> Vec<String> {
        ["get", "post", "put", "patch", "delete"]
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_split_verb_requires_boundary() {
        let verbs = verbs();
        assert_eq!(split_verb("get_index", &verbs), Some(("get", "_index")));
        assert_eq!(split_verb("postUser", &verbs), Some(("post", "User")));
        assert_eq!(split_verb("delete", &verbs), Some(("delete", "")));
        assert_eq!(split_verb("getaway", &verbs), None);
        assert_eq!(split_verb("helper", &verbs), None);
    }

    #[test]
    fn test_derive_path() {
        assert_eq!(derive_path("_some_test"), "/some/test");
        assert_eq!(derive_path("SomeTest"), "/some/test");
        assert_eq!(derive_path("_index"), "/index");
        assert_eq!(derive_path("_user_profile2"), "/user/profile2");
        assert_eq!(derive_path(""), "");
    }

    #[test]
    fn test_derive_suffix_optional_tail() {
        let op = Operation::new(
            "get_user",
            Signature::new(vec![
                ParamSpec::required("id").constraint("\\d+"),
                ParamSpec::with_default("name", ""),
                ParamSpec::optional("extra"),
            ]),
        );
        assert_eq!(
            derive_suffix(&op).unwrap(),
            "/{id:\\d+}[/{name}[/{extra}]]"
        );
    }

    #[test]
    fn test_required_after_optional() {
        let op = Operation::new("get_user", Signature::of(["id?", "name"]));
        assert_eq!(
            derive_suffix(&op).unwrap_err(),
            UsageError::RequiredAfterOptional {
                operation: "get_user".to_string(),
                param: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_derive_pattern() {
        assert_eq!(derive_pattern("", ""), "/");
        assert_eq!(derive_pattern("", "/{id}"), "/{id}");
        assert_eq!(derive_pattern("", "[/{id}]"), "/[/{id}]");
        assert_eq!(derive_pattern("/user", "[/{id}]"), "/user[/{id}]");
    }
}
