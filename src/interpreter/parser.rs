/// Core parser state and expression parsing.
///
/// Holds the token cursor shared by all parsing routines, and parses the
/// primary expression forms: variables, string and numeric literals, bare
/// words and operator calls.
pub mod core;

/// Variable reference parsing.
///
/// Parses namespaces, names and attribute chains after a `$`.
pub mod variable;

/// Operator chain parsing.
///
/// Parses `|name(arg, ...)` chains and their parameter lists.
pub mod operator;

/// Tag body parsing.
///
/// Parses a tag name followed by `name=value` parameters.
pub mod tag;

pub use self::core::Parser;
