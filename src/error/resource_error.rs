/// Represents all failures of resource loaders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// No loader is registered for the URI's scheme and there is no default.
    #[error("No resource for '{scheme}' and no default resource, aborting.")]
    NoLoader {
        /// The scheme taken from the URI, possibly empty.
        scheme: String,
    },
    /// The loader does not know the template.
    #[error("No template could be loaded for '{name}' using resource '{scheme}'.")]
    NotFound {
        /// The scheme taken from the URI, possibly empty.
        scheme: String,
        /// The template name without scheme.
        name:   String,
    },
    /// The name is absolute or climbs out of the loader's directory.
    #[error("Template name '{name}' points outside the template directory.")]
    OutsideRoot {
        /// The template name without scheme.
        name: String,
    },
    /// The loader found the template but could not read it.
    #[error("Failed to read template '{name}': {message}.")]
    Unreadable {
        /// The template name without scheme.
        name:    String,
        /// The underlying failure.
        message: String,
    },
}
