//! Procedural macros for Switchyard.
//!
//! - `#[controller]` - Generates `Controller` metadata and dispatch glue for
//!   an inherent `impl` block

use proc_macro::TokenStream;

mod controller;

/// Turn an inherent `impl` block into a route target.
///
/// Every `pub fn` taking `&self` becomes an operation. Its parameters are
/// declared in order and parsed with `FromStr` at call time:
///
/// - `Option<T>` parameters are optional and receive `None` when absent.
/// - `#[param(default = "...")]` makes a parameter optional with a default.
/// - `#[param(regex = "...")]` sets the constraint used by derived patterns.
/// - Without a regex, integer parameters are constrained to ASCII digits
///   (`[0-9]+`, `-?[0-9]+` when signed) and `String` parameters to a word
///   (`\w+`).
///
/// A `Result<T, E>` return value reports `E` as the operation's error;
/// any other return value is the output itself.
///
/// # Attribute arguments
///
/// - `name = "..."`: target name (defaults to the type name)
/// - `output = Type`: output type (defaults to the first operation's)
///
/// ```rust,ignore
/// struct UserController;
///
/// #[switchyard::controller]
/// impl UserController {
///     pub fn get_show(&self, id: u32, #[param(default = "html")] format: String) -> String {
///         format!("user {id} as {format}")
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    controller::controller_impl(attr, item)
}
