/// Parsing problems.
///
/// Defines every recoverable problem the three parse passes and the
/// expression parser can run into: unterminated tags, malformed parameters,
/// mismatched end tags and trailing junk after expressions. None of them stop
/// parsing; they are recorded and the parser carries on with a best-effort
/// result.
pub mod parse_error;
/// Rendering problems.
///
/// Contains the problems raised while evaluating expressions and invoking
/// handlers: undefined variables, failed attribute lookups and unknown
/// functions or operators. Evaluation continues with an empty value.
pub mod runtime_error;
/// Resource loading failures.
pub mod resource_error;
/// Configuration loading failures.
pub mod config_error;

pub use config_error::ConfigError;
pub use parse_error::ParseError;
pub use resource_error::ResourceError;
pub use runtime_error::RuntimeError;

/// Any problem the engine records in its diagnostics sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A problem found while parsing template text.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A problem found while rendering a tree.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// A template could not be loaded.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
