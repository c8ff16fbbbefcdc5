use serde::Deserialize;

use crate::error::RuntimeError;

/// How an autoload descriptor creates its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loader {
    /// A loader registered under a plain name.
    Function(String),
    /// A loader registered under a class name, optionally constructed with a
    /// parameter. `script` names the module that provides it and is kept for
    /// diagnostics only.
    Class {
        /// The providing module.
        script:    Option<String>,
        /// The loader name.
        class:     String,
        /// Passed to the factory.
        parameter: Option<String>,
    },
}

impl Loader {
    /// The name the factory is registered under.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Function(name) => name,
            Self::Class { class, .. } => class,
        }
    }

    /// The parameter handed to the factory.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Function(_) => None,
            Self::Class { parameter, .. } => parameter.as_deref(),
        }
    }
}

/// A handler that is created the first time one of its names is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoloadDescriptor {
    /// Creates the handler.
    pub loader:     Loader,
    /// The function or operator names the handler serves.
    pub names:      Vec<String>,
    /// Tag names whose child ownership is only known once the handler is
    /// loaded.
    pub child_tags: Vec<String>,
}

/// An autoload descriptor as written in a configuration file.
///
/// ```toml
/// [[autoload.functions]]
/// class = "sections"
/// names = ["section", "section-else"]
/// child_tags = ["section"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoloadDefinition {
    /// A loader registered under a plain name.
    pub function:        Option<String>,
    /// The module providing `class`.
    pub script:          Option<String>,
    /// A loader registered under a class name.
    pub class:           Option<String>,
    /// Passed to the `class` loader.
    pub class_parameter: Option<String>,
    /// The names the handler serves.
    #[serde(default)]
    pub names:           Vec<String>,
    /// Tags whose child ownership the handler decides.
    #[serde(default)]
    pub child_tags:      Vec<String>,
}

impl AutoloadDefinition {
    /// Validates the definition.
    ///
    /// # Parameters
    /// - `kind`: `"function"` or `"operator"`, for the error message.
    ///
    /// # Errors
    /// [`RuntimeError::InvalidAutoloadDefinition`] if neither `function` nor
    /// `class` is given, or if `names` is empty.
    ///
    /// # Example
    /// ```
    /// use templar::interpreter::registry::{AutoloadDefinition, Loader};
    ///
    /// let definition = AutoloadDefinition { function: Some("text".into()),
    ///                                       names: vec!["upcase".into()],
    ///                                       ..AutoloadDefinition::default() };
    /// let descriptor = definition.into_descriptor("operator").unwrap();
    ///
    /// assert_eq!(descriptor.loader, Loader::Function("text".into()));
    /// assert!(AutoloadDefinition::default().into_descriptor("operator").is_err());
    /// ```
    pub fn into_descriptor(self, kind: &'static str) -> Result<AutoloadDescriptor, RuntimeError> {
        let loader = match (self.function, self.class) {
            (Some(function), _) => Loader::Function(function),
            (None, Some(class)) => Loader::Class { script: self.script,
                                                   class,
                                                   parameter: self.class_parameter },
            (None, None) => return Err(RuntimeError::InvalidAutoloadDefinition { kind }),
        };

        if self.names.is_empty() {
            return Err(RuntimeError::InvalidAutoloadDefinition { kind });
        }

        Ok(AutoloadDescriptor { loader,
                                names: self.names,
                                child_tags: self.child_tags })
    }
}
