//! # templar
//!
//! templar is a delimiter-based template engine written in Rust.
//! Templates mix text with `{$variable}` expressions, operator chains such as
//! `{$name|upcase}` and function tags such as `{include uri="page.tpl"}`.
//! Templates are parsed once into immutable trees that can be cached and
//! rendered any number of times.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::interpreter::{evaluator::core::Engine, value::core::Value};

/// Defines the structure of parsed templates.
///
/// This module declares the node tree produced by the parser and the
/// expression types inside it. The tree is built once and rendered by the
/// evaluator.
///
/// # Responsibilities
/// - Defines nodes for text, inline expressions and function tags.
/// - Defines expressions: operands, variable references, attribute chains
///   and operator chains.
/// - Carries source line numbers for diagnostics.
pub mod ast;
/// Engine configuration.
///
/// Reads delimiters, literal tags, the template directory and autoload
/// descriptors from TOML.
pub mod config;
/// Provides the error types of parsing, rendering, loading and
/// configuration.
///
/// # Responsibilities
/// - Defines one error enum per phase, each with source lines where they
///   apply.
/// - Wraps the recoverable ones in a single type for the diagnostics sink.
pub mod error;
/// Ties the parse passes, evaluation and handlers together.
///
/// # Responsibilities
/// - Coordinates scanning, normalization, tree building and rendering.
/// - Provides the engine, its registries and its loaders.
/// - Routes every recoverable problem to the diagnostics sink.
pub mod interpreter;
/// General utilities for numeral parsing.
pub mod util;

/// Renders template text with the given variables in the global namespace.
///
/// Uses an engine with the standard handlers. Problems are logged through
/// `tracing` and otherwise ignored.
///
/// # Examples
/// ```
/// use templar::{interpreter::value::core::Value, render};
///
/// let output = render("Hello {$name|upcase}!", [("name", Value::from("world"))]);
/// assert_eq!(output, "Hello WORLD!");
///
/// // Undefined variables render as nothing.
/// assert_eq!(render("[{$missing}]", []), "[]");
/// ```
pub fn render<'a>(source: &str, bindings: impl IntoIterator<Item = (&'a str, Value)>) -> String {
    let mut engine = Engine::with_standard_handlers();
    for (name, value) in bindings {
        engine.set_variable("", name, value);
    }

    let tree = engine.parse(source);
    engine.render(&tree)
}
