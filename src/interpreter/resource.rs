/// Template sources.
///
/// # Responsibilities
/// - Defines the [`loader::ResourceLoader`] interface and the in-memory and
///   file system loaders.
/// - Dispatches `scheme:name` URIs to the loader registered for the scheme,
///   falling back to the default loader.
pub mod loader;

/// The parsed tree cache.
///
/// Keeps built trees keyed by URI and delimiters so repeated loads and
/// includes skip all three parse passes.
pub mod cache;
