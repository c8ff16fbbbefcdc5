/// The engine and its public entry points.
///
/// Contains [`core::Engine`], which owns the registry, the variable store,
/// the resource loaders and the diagnostics sink, and ties the parse passes
/// and rendering together.
pub mod core;

/// Tree rendering.
///
/// Walks a tree in source order, appending text, expression values and
/// function output. Handles includes and objects that render through a
/// template.
pub mod render;

/// Expression evaluation.
///
/// Evaluates literals, bare words and variable references, including
/// namespace resolution and attribute chains.
pub mod variable;

/// Operator chain evaluation.
pub mod operator;

/// Built-in handlers.
///
/// Function tags and operators that every engine created with
/// [`core::Engine::with_standard_handlers`] provides.
pub mod function;
