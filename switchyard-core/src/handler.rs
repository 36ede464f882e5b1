//! # Handlers and Signatures
//!
//! An invocable operation declares its parameters through a [`Signature`].
//! Strategies use the signature to turn the captured [`Params`] into
//! positional [`Args`]: declaration order, defaults filled in.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `handler(Signature::of(["id", "name=guest"]), |args| ...)`
//! 2. **Struct implementation**: `impl Handler<MyOutput> for MyHandler`
//! 3. **Target member**: see [`Controller`](crate::Controller)
//!
//! [`Params`]: crate::Params

use crate::error::{ArgumentError, BoxError};
use std::{fmt, str::FromStr};

/// How a declared parameter behaves when the path did not capture it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamDefault {
    /// The parameter must be captured.
    Required,
    /// The parameter falls back to this value.
    Value(String),
    /// The parameter is optional and receives no value.
    Absent,
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    name: String,
    default: ParamDefault,
    constraint: Option<String>,
}

impl ParamSpec {
    /// A parameter that must be captured.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Required,
            constraint: None,
        }
    }

    /// An optional parameter without a default value.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Absent,
            constraint: None,
        }
    }

    /// An optional parameter with a default value.
    pub fn with_default(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: ParamDefault::Value(value.into()),
            constraint: None,
        }
    }

    /// Attach a constraint regex, used when a collector derives a pattern.
    pub fn constraint(mut self, regex: impl Into<String>) -> Self {
        self.constraint = Some(regex.into());
        self
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fallback behaviour.
    pub fn default(&self) -> &ParamDefault {
        &self.default
    }

    /// Whether the parameter may be left uncaptured.
    pub fn is_optional(&self) -> bool {
        !matches!(self.default, ParamDefault::Required)
    }

    /// The declared constraint regex, if any.
    pub fn constraint_regex(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

/// The ordered parameter list of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ParamSpec>,
}

impl Signature {
    /// Create a signature from parameter specs.
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    /// A signature with no parameters.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shorthand notation: `"id"` is required, `"name?"` is optional, and
    /// `"lang=en"` is optional with a default.
    ///
    /// ```
    /// use switchyard_core::{ParamDefault, Signature};
    ///
    /// let sig = Signature::of(["id", "name?", "lang=en"]);
    /// assert_eq!(sig.params()[2].default(), &ParamDefault::Value("en".into()));
    /// ```
    pub fn of<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        params
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                if let Some((name, value)) = p.split_once('=') {
                    ParamSpec::with_default(name, value)
                } else if let Some(name) = p.strip_suffix('?') {
                    ParamSpec::optional(name)
                } else {
                    ParamSpec::required(p)
                }
            })
            .collect()
    }

    /// The declared parameters, in order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the operation takes no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Position of a parameter by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

impl FromIterator<ParamSpec> for Signature {
    fn from_iter<I: IntoIterator<Item = ParamSpec>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// Positional arguments prepared by a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    entries: Vec<(String, Option<String>)>,
}

impl Args {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument for the named parameter.
    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.entries.push((name.into(), value));
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw value at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(|(_, v)| v.as_deref())
    }

    /// The parameter name at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(n, _)| n.as_str())
    }

    /// Iterate over the raw values in order.
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.entries.iter().map(|(_, v)| v.as_deref())
    }

    /// Parse the value at `index`, failing if it is missing.
    pub fn required<T>(&self, index: usize) -> Result<T, ArgumentError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let name = self.name(index).unwrap_or_default();
        match self.get(index) {
            Some(value) => parse(name, value),
            None => Err(ArgumentError::Missing {
                param: name.to_string(),
            }),
        }
    }

    /// Parse the value at `index` if present.
    pub fn optional<T>(&self, index: usize) -> Result<Option<T>, ArgumentError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(index) {
            Some(value) => parse(self.name(index).unwrap_or_default(), value).map(Some),
            None => Ok(None),
        }
    }

    /// Transform every present value, keeping order and absence.
    pub fn try_map<F>(self, mut f: F) -> Result<Self, ArgumentError>
    where
        F: FnMut(&str, String) -> Result<String, ArgumentError>,
    {
        let entries = self
            .entries
            .into_iter()
            .map(|(name, value)| {
                let value = value.map(|v| f(&name, v)).transpose()?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, ArgumentError>>()?;
        Ok(Self { entries })
    }

    /// Consume into the raw values.
    pub fn into_values(self) -> Vec<Option<String>> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T, ArgumentError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ArgumentError::Invalid {
        param: name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// A directly invocable route action.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a route handler producing `{R}`",
    label = "missing `Handler<{R}>` implementation",
    note = "Wrap a closure with `switchyard::handler(signature, f)`."
)]
pub trait Handler<R>: Send + Sync {
    /// The declared parameters, in call order.
    fn signature(&self) -> &Signature;

    /// Invoke with positional arguments.
    fn call(&self, args: Args) -> Result<R, BoxError>;
}

/// A [`Handler`] backed by a closure.
pub struct FnHandler<F> {
    signature: Signature,
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<R, F> Handler<R> for FnHandler<F>
where
    R: 'static,
    F: Fn(Args) -> Result<R, BoxError> + Send + Sync + 'static,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, args: Args) -> Result<R, BoxError> {
        (self.f)(args)
    }
}

/// Wrap a closure as a [`Handler`] with the given signature.
pub fn handler<R, F>(signature: Signature, f: F) -> FnHandler<F>
where
    F: Fn(Args) -> Result<R, BoxError> + Send + Sync + 'static,
{
    FnHandler { signature, f }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_shorthand() {
        let sig = Signature::of(["id", "name?", "lang=en"]);
        assert_eq!(sig.len(), 3);
        assert_eq!(sig.params()[0].default(), &ParamDefault::Required);
        assert_eq!(sig.params()[1].name(), "name");
        assert_eq!(sig.params()[1].default(), &ParamDefault::Absent);
        assert!(sig.params()[2].is_optional());
        assert_eq!(sig.position("lang"), Some(2));
    }

    #[test]
    fn test_args_parsing() {
        let mut args = Args::new();
        args.push("id", Some("18".to_string()));
        args.push("name", None);

        assert_eq!(args.required::<u32>(0).unwrap(), 18);
        assert_eq!(args.optional::<String>(1).unwrap(), None);
        assert_eq!(
            args.required::<String>(1).unwrap_err(),
            ArgumentError::Missing {
                param: "name".to_string()
            }
        );
    }

    #[test]
    fn test_args_invalid_value_names_param() {
        let mut args = Args::new();
        args.push("id", Some("abc".to_string()));

        match args.required::<u32>(0) {
            Err(ArgumentError::Invalid { param, value, .. }) => {
                assert_eq!(param, "id");
                assert_eq!(value, "abc");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_fn_handler() {
        let h = handler(Signature::of(["a", "b"]), |args: Args| {
            Ok(args.required::<i32>(0)? + args.required::<i32>(1)?)
        });

        let mut args = Args::new();
        args.push("a", Some("2".to_string()));
        args.push("b", Some("3".to_string()));
        assert_eq!(h.call(args).unwrap(), 5);
        assert_eq!(h.signature().len(), 2);
    }
}
