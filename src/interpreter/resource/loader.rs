use std::{
    collections::HashMap,
    fs, io,
    path::{Component, Path, PathBuf},
    rc::Rc,
    time::SystemTime,
};

use crate::error::ResourceError;

/// Template text fetched by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// The template source.
    pub text:     String,
    /// When the source last changed, if the loader knows.
    pub modified: Option<SystemTime>,
}

/// Fetches template text by name.
pub trait ResourceLoader {
    /// Returns the template called `name`.
    ///
    /// # Errors
    /// [`ResourceError::NotFound`] if there is no such template, or
    /// [`ResourceError::Unreadable`] if it exists but cannot be read.
    fn fetch(&self, name: &str) -> Result<Resource, ResourceError>;
}

/// Serves templates from memory.
///
/// # Example
/// ```
/// use templar::interpreter::resource::loader::{MemoryLoader, ResourceLoader};
///
/// let loader = MemoryLoader::new().with("page.tpl", "Hello {$name}");
///
/// assert_eq!(loader.fetch("page.tpl").unwrap().text, "Hello {$name}");
/// assert!(loader.fetch("missing.tpl").is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    templates: HashMap<String, String>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template and returns the loader.
    #[must_use]
    pub fn with(mut self, name: &str, text: &str) -> Self {
        self.insert(name, text);
        self
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, name: &str, text: &str) {
        self.templates.insert(name.to_string(), text.to_string());
    }
}

impl ResourceLoader for MemoryLoader {
    fn fetch(&self, name: &str) -> Result<Resource, ResourceError> {
        self.templates
            .get(name)
            .map(|text| Resource { text:     text.clone(),
                                   modified: None, })
            .ok_or_else(|| ResourceError::NotFound { scheme: String::new(),
                                                     name:   name.to_string(), })
    }
}

/// Serves templates from a directory.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    /// Creates a loader that resolves names relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceLoader for FileLoader {
    /// Reads `root/name`. Names must stay below `root`: absolute paths and
    /// `..` components are refused.
    fn fetch(&self, name: &str) -> Result<Resource, ResourceError> {
        let relative = Path::new(name);
        if !relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(ResourceError::OutsideRoot { name: name.to_string() });
        }

        let path = self.root.join(relative);
        let text = fs::read_to_string(&path).map_err(|e| match e.kind() {
                                                  io::ErrorKind::NotFound => {
                                                      ResourceError::NotFound { scheme: "file".to_string(),
                                                                                name:   name.to_string(), }
                                                  },
                                                  _ => ResourceError::Unreadable { name:    name.to_string(),
                                                                                   message: e.to_string(), },
                                              })?;
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();

        Ok(Resource { text, modified })
    }
}

/// The loaders of an engine, by scheme.
#[derive(Default, Clone)]
pub struct Resources {
    loaders: HashMap<String, Rc<dyn ResourceLoader>>,
    default: Option<String>,
}

impl Resources {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` for `scheme`. The first loader registered becomes
    /// the default.
    pub fn register(&mut self, scheme: &str, loader: Rc<dyn ResourceLoader>) {
        if self.default.is_none() {
            self.default = Some(scheme.to_string());
        }
        self.loaders.insert(scheme.to_string(), loader);
    }

    /// Removes the loader for `scheme`.
    pub fn unregister(&mut self, scheme: &str) {
        self.loaders.remove(scheme);
        if self.default.as_deref() == Some(scheme) {
            self.default = None;
        }
    }

    /// Makes `scheme` the loader for URIs without a known scheme.
    pub fn set_default(&mut self, scheme: &str) {
        self.default = Some(scheme.to_string());
    }

    /// Fetches `uri`.
    ///
    /// `scheme:name` uses the loader registered for `scheme`; a URI without
    /// a colon, or with a scheme nobody registered, uses the default loader
    /// with the part after the colon.
    ///
    /// # Errors
    /// [`ResourceError::NoLoader`] if no loader applies, or the loader's
    /// error.
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    ///
    /// use templar::interpreter::resource::loader::{MemoryLoader, Resources};
    ///
    /// let mut resources = Resources::new();
    /// resources.register("mem", Rc::new(MemoryLoader::new().with("a.tpl", "A")));
    ///
    /// assert_eq!(resources.fetch("mem:a.tpl").unwrap().text, "A");
    /// assert_eq!(resources.fetch("a.tpl").unwrap().text, "A");
    /// ```
    pub fn fetch(&self, uri: &str) -> Result<Resource, ResourceError> {
        let (scheme, name) = uri.split_once(':').unwrap_or(("", uri));

        let loader = self.loaders
                         .get(scheme)
                         .or_else(|| self.default.as_ref().and_then(|d| self.loaders.get(d)))
                         .ok_or_else(|| ResourceError::NoLoader { scheme: scheme.to_string() })?;

        tracing::debug!(scheme, name, "fetching template");
        loader.fetch(name).map_err(|error| match error {
                              ResourceError::NotFound { name, .. } => {
                                  ResourceError::NotFound { scheme: scheme.to_string(),
                                                            name }
                              },
                              other => other,
                          })
    }
}
