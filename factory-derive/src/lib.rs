//! Derive and attribute macros for the factory property testing library
//!
//! Both macros turn Rust declarations into the declaration model the runner
//! reads: doc comments carry the `@param`, `@var` and `@iterations`
//! annotations, and Rust types supply the declared types.

use proc_macro::TokenStream;

mod derive;
mod suite;

/// Derive macro describing a struct as a constructible class
///
/// Private fields are constructor parameters, in declaration order, refined by
/// `@param` lines in the struct's doc comment. Public fields are properties
/// assigned after construction, each refined by an `@var` line in its own doc
/// comment.
///
/// ```rust
/// use factory::Factory;
///
/// /// @param string $name [name]
/// #[derive(Debug, Factory)]
/// struct User {
///     name: String,
///     /// @var string [email]
///     pub email: String,
///     /// @var ?string [url]
///     pub homepage: Option<String>,
/// }
/// ```
///
/// Only non-generic structs with named fields are supported.
#[proc_macro_derive(Factory)]
pub fn derive_factory(input: TokenStream) -> TokenStream {
    derive::derive_factory_impl(input)
}

/// Attribute macro turning an inherent `impl` block into a test suite
///
/// Every method whose name starts with `test` and takes `&self` becomes a test
/// method. Its parameters are generated from their types and the method's doc
/// comment; its return type may be `()`, `bool` or `Result<(), E>` where
/// `E: Into<TestError>`.
///
/// ```rust
/// use factory::factory_suite;
///
/// struct MathTests;
///
/// #[factory_suite]
/// impl MathTests {
///     /// @iterations 50
///     fn test_addition_commutes(&self, a: i64, b: i64) -> bool {
///         a.wrapping_add(b) == b.wrapping_add(a)
///     }
///
///     /// @param int[3] $xs
///     fn test_three(&self, xs: Vec<i64>) {
///         assert_eq!(xs.len(), 3);
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn factory_suite(args: TokenStream, input: TokenStream) -> TokenStream {
    suite::factory_suite_impl(args, input)
}
