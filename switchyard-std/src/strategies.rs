//! Alternate invocation strategies.
//!
//! Both reuse the built-in resolution and argument ordering and only add a
//! transformation of the arranged arguments.

use switchyard_core::{
    ArgumentError, DispatchError, Invocation, Strategy, arrange, handler_error,
};

/// Tag under which the facade registers [`DecodeStrategy`].
pub const DECODE_STRATEGY: &str = "decode";

/// Percent-decodes every argument before invocation.
///
/// A path captured as `/search/hello%20world` reaches the callee as
/// `hello world`. Invalid UTF-8 after decoding is an
/// [`ArgumentError::Invalid`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeStrategy;

impl<R> Strategy<R> for DecodeStrategy {
    fn invoke(&self, invocation: Invocation<'_, R>) -> Result<R, DispatchError> {
        let resolved = invocation.resolve()?;
        let args = arrange(resolved.signature(), invocation.params())?.try_map(decode)?;
        resolved.call(args).map_err(handler_error)
    }
}

/// Percent-decode one argument value.
pub fn decode(param: &str, value: String) -> Result<String, ArgumentError> {
    urlencoding::decode(&value)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ArgumentError::Invalid {
            param: param.to_string(),
            value: value.clone(),
            reason: e.to_string(),
        })
}

/// Applies a closure to every present argument before invocation.
///
/// ```
/// use switchyard_core::ArgumentError;
/// use switchyard_std::strategies::MapStrategy;
///
/// let upper = MapStrategy::new(|_param: &str, value: String| {
///     Ok::<_, ArgumentError>(value.to_uppercase())
/// });
/// ```
pub struct MapStrategy<F> {
    map: F,
}

impl<F> MapStrategy<F> {
    /// Wrap the argument transformation.
    pub fn new(map: F) -> Self {
        Self { map }
    }
}

impl<F> std::fmt::Debug for MapStrategy<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapStrategy").finish_non_exhaustive()
    }
}

impl<R, F> Strategy<R> for MapStrategy<F>
where
    F: Fn(&str, String) -> Result<String, ArgumentError> + Send + Sync + 'static,
{
    fn invoke(&self, invocation: Invocation<'_, R>) -> Result<R, DispatchError> {
        let resolved = invocation.resolve()?;
        let args = arrange(resolved.signature(), invocation.params())?.try_map(&self.map)?;
        resolved.call(args).map_err(handler_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_core::{Action, Params, Signature, Targets, handler};

    fn joined() -> Action<String> {
        Action::handler(handler(Signature::of(["a", "b?"]), |args| {
            Ok(args
                .values()
                .map(|v| v.unwrap_or("-"))
                .collect::<Vec<_>>()
                .join("|"))
        }))
    }

    #[test]
    fn test_decode_strategy() {
        let action = joined();
        let params: Params = [("a", "hello%20world")].into_iter().collect();
        let out = DecodeStrategy
            .invoke(Invocation::new(&action, params, &Targets::new()))
            .unwrap();
        assert_eq!(out, "hello world|-");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode("a", "%FF".to_string()).unwrap_err();
        assert!(matches!(err, ArgumentError::Invalid { ref param, .. } if param == "a"));
    }

    #[test]
    fn test_map_strategy() {
        let action = joined();
        let params: Params = [("a", "x"), ("b", "y")].into_iter().collect();
        let strategy = MapStrategy::new(|name: &str, value: String| {
            Ok::<_, ArgumentError>(format!("{name}={value}"))
        });
        let out = strategy
            .invoke(Invocation::new(&action, params, &Targets::new()))
            .unwrap();
        assert_eq!(out, "a=x|b=y");
    }
}
