/// The lexer module tokenizes tag and variable bodies.
///
/// The scanner cuts template text into elements; the lexer then turns the
/// text between one pair of delimiters into tokens for the expression
/// parser.
///
/// # Responsibilities
/// - Recognises sigils, punctuation, words, digit runs and string literals.
/// - Keeps whitespace as a token, since it separates tag parameters.
/// - Turns unrecognised characters into junk lexemes instead of failing.
pub mod lexer;
/// The first parse pass: splitting source into elements.
///
/// # Responsibilities
/// - Finds delimiters, comments and escaped right delimiters.
/// - Classifies each block as text, comment, inline expression, single tag,
///   opening tag or end tag.
/// - Tracks line numbers for diagnostics.
pub mod scanner;
/// The second parse pass: layout whitespace and literal blocks.
pub mod normalizer;
/// The third parse pass: building the node tree.
///
/// # Responsibilities
/// - Parses tag parameters and inline expressions.
/// - Nests the children of tags that own them, using an explicit stack.
/// - Reports mismatched, orphan and unclosed tags and keeps going.
pub mod builder;
/// The expression parser.
///
/// Recursive descent over lexer tokens: variables with namespaces and
/// attribute chains, string and numeric literals, bare words and operator
/// chains.
pub mod parser;
/// The warning and error sink.
pub mod diagnostics;
/// The value module defines the runtime data types of rendering.
///
/// # Responsibilities
/// - Defines the `Value` enum and its display form.
/// - Defines the trait host objects implement to expose attributes.
/// - Resolves attribute chains step by step.
pub mod value;
/// Variable storage by namespace and name.
pub mod store;
/// Function and operator registration, including lazy loading.
pub mod registry;
/// Template loaders and the tree cache.
pub mod resource;
/// The evaluator renders trees.
///
/// The evaluator walks a parsed tree, evaluates expressions against the
/// variable store, runs operator chains and calls function handlers.
///
/// # Responsibilities
/// - Owns the engine and its public entry points.
/// - Evaluates variables, attribute chains and operators.
/// - Reports problems without aborting the render.
pub mod evaluator;
