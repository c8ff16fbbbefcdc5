use std::{rc::Rc, sync::Arc};

use crate::{
    ast::Tree,
    config::EngineConfig,
    error::{ConfigError, ResourceError, RuntimeError},
    interpreter::{
        builder::build,
        diagnostics::{Diagnostic, Diagnostics},
        evaluator::{function::core::register_standard_handlers, render::RenderContext},
        normalizer::normalize,
        registry::{AutoloadDefinition, FunctionHandler, Handler, OperatorHandler, Registry},
        resource::{
            cache::{CacheKey, TreeCache},
            loader::{FileLoader, ResourceLoader, Resources},
        },
        scanner::scan,
        store::VariableStore,
        value::core::Value,
    },
};

/// The default left delimiter.
pub const LEFT_DELIMITER: &str = "{";
/// The default right delimiter.
pub const RIGHT_DELIMITER: &str = "}";
/// How deep includes may nest before they are refused.
pub const MAX_INCLUDE_DEPTH: usize = 32;

/// A template engine.
///
/// An engine owns its handlers, variables and loaders. It is not `Sync`;
/// use one engine per thread and share parsed trees between them through a
/// common [`TreeCache`].
///
/// # Example
/// ```
/// use templar::interpreter::evaluator::core::Engine;
///
/// let mut engine = Engine::with_standard_handlers();
/// engine.set_variable("", "name", "world");
///
/// let tree = engine.parse("Hello {$name|upcase}!");
/// assert_eq!(engine.render(&tree), "Hello WORLD!");
/// ```
pub struct Engine {
    pub(crate) left:        String,
    pub(crate) right:       String,
    pub(crate) registry:    Registry,
    pub(crate) store:       VariableStore,
    pub(crate) resources:   Resources,
    pub(crate) cache:       Arc<TreeCache>,
    pub(crate) diagnostics: Diagnostics,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default delimiters and no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self { left:        LEFT_DELIMITER.to_string(),
               right:       RIGHT_DELIMITER.to_string(),
               registry:    Registry::new(),
               store:       VariableStore::new(),
               resources:   Resources::new(),
               cache:       Arc::new(TreeCache::new()),
               diagnostics: Diagnostics::new(), }
    }

    /// Creates an engine with the built-in functions and operators.
    #[must_use]
    pub fn with_standard_handlers() -> Self {
        let mut engine = Self::new();
        register_standard_handlers(&mut engine.registry);
        engine
    }

    /// Creates an engine with the built-in handlers and applies `config`.
    ///
    /// Invalid autoload definitions are recorded as errors and skipped.
    ///
    /// # Errors
    /// [`ConfigError::EmptyDelimiter`] if a delimiter is empty.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut engine = Self::with_standard_handlers();
        engine.set_delimiters(&config.left_delimiter, &config.right_delimiter)?;

        for literal in &config.literals {
            engine.register_literal(literal);
        }
        if let Some(root) = &config.template_root {
            engine.register_resource("file", Rc::new(FileLoader::new(root)));
        }
        for definition in &config.autoload.functions {
            engine.register_autoload_functions(definition.clone());
        }
        for definition in &config.autoload.operators {
            engine.register_autoload_operators(definition.clone());
        }

        Ok(engine)
    }

    /// Makes the engine use `cache` for parsed trees, e.g. one shared with
    /// other engines.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<TreeCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the tree cache.
    #[must_use]
    pub fn cache(&self) -> &Arc<TreeCache> {
        &self.cache
    }

    /// Sets the delimiters used by [`parse`](Self::parse) and
    /// [`load`](Self::load).
    ///
    /// # Errors
    /// [`ConfigError::EmptyDelimiter`] if either delimiter is empty. The
    /// current delimiters are kept.
    pub fn set_delimiters(&mut self, left: &str, right: &str) -> Result<(), ConfigError> {
        if left.is_empty() || right.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        left.clone_into(&mut self.left);
        right.clone_into(&mut self.right);
        Ok(())
    }

    /// The left delimiter.
    #[must_use]
    pub fn left_delimiter(&self) -> &str {
        &self.left
    }

    /// The right delimiter.
    #[must_use]
    pub fn right_delimiter(&self) -> &str {
        &self.right
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the registry for direct registration.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// See [`Registry::register_function`].
    pub fn register_function(&mut self, name: &str, handler: Rc<dyn FunctionHandler>) {
        self.registry.register_function(name, handler);
    }

    /// See [`Registry::register_functions`].
    pub fn register_functions(&mut self, handler: Rc<dyn FunctionHandler>) {
        self.registry.register_functions(handler);
    }

    /// See [`Registry::register_operator`].
    pub fn register_operator(&mut self, name: &str, handler: Rc<dyn OperatorHandler>) {
        self.registry.register_operator(name, handler);
    }

    /// See [`Registry::register_operators`].
    pub fn register_operators(&mut self, handler: Rc<dyn OperatorHandler>) {
        self.registry.register_operators(handler);
    }

    /// Removes a function tag; records a warning if it was not registered.
    pub fn unregister_function(&mut self, name: &str) {
        if let Err(error) = self.registry.unregister_function(name) {
            self.diagnostics.warning("unregister_function", error);
        }
    }

    /// Removes an operator; records a warning if it was not registered.
    pub fn unregister_operator(&mut self, name: &str) {
        if let Err(error) = self.registry.unregister_operator(name) {
            self.diagnostics.warning("unregister_operator", error);
        }
    }

    /// Registers lazily loaded function tags; records an error if the
    /// definition is invalid.
    pub fn register_autoload_functions(&mut self, definition: AutoloadDefinition) {
        if let Err(error) = self.registry.register_autoload_functions(definition) {
            self.diagnostics.error("register_functions", error);
        }
    }

    /// Registers lazily loaded operators; records an error if the definition
    /// is invalid.
    pub fn register_autoload_operators(&mut self, definition: AutoloadDefinition) {
        if let Err(error) = self.registry.register_autoload_operators(definition) {
            self.diagnostics.error("register_operators", error);
        }
    }

    /// See [`Registry::register_loader`].
    pub fn register_loader(&mut self,
                           name: &str,
                           factory: impl Fn(Option<&str>) -> Option<Handler> + 'static) {
        self.registry.register_loader(name, factory);
    }

    /// See [`Registry::register_literal`].
    pub fn register_literal(&mut self, name: &str) {
        self.registry.register_literal(name);
    }

    /// See [`Registry::unregister_literal`].
    pub fn unregister_literal(&mut self, name: &str) {
        self.registry.unregister_literal(name);
    }

    /// Registers a template loader for `scheme`. The first one registered is
    /// the default.
    pub fn register_resource(&mut self, scheme: &str, loader: Rc<dyn ResourceLoader>) {
        self.resources.register(scheme, loader);
    }

    /// Removes the template loader for `scheme`.
    pub fn unregister_resource(&mut self, scheme: &str) {
        self.resources.unregister(scheme);
    }

    /// Makes `scheme` the loader for URIs without a known scheme.
    pub fn set_default_resource(&mut self, scheme: &str) {
        self.resources.set_default(scheme);
    }

    /// Returns the variable store.
    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Returns the variable store for modification.
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    /// Binds a variable. See [`VariableStore::set`].
    pub fn set_variable(&mut self, namespace: &str, name: &str, value: impl Into<Value>) {
        self.store.set(namespace, name, value);
    }

    /// Removes a variable; records a warning if it was not set.
    pub fn unset_variable(&mut self, namespace: &str, name: &str) {
        if let Err(error) = self.store.unset(namespace, name) {
            self.diagnostics.warning("unset_variable", error);
        }
    }

    /// Returns `true` if the variable is set.
    #[must_use]
    pub fn has_variable(&self, namespace: &str, name: &str) -> bool {
        self.store.has(namespace, name)
    }

    /// Returns the value of a variable.
    #[must_use]
    pub fn variable(&self, namespace: &str, name: &str) -> Option<&Value> {
        self.store.get(namespace, name)
    }

    /// Returns everything recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Removes and returns everything recorded so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    /// Parses template text with the current delimiters.
    pub fn parse(&mut self, text: &str) -> Tree {
        self.parse_named(text, "")
    }

    /// Parses template text, recording `source` as its origin.
    ///
    /// Runs the three passes: scanning, whitespace normalization and tree
    /// building. Problems are recorded; parsing never fails.
    pub fn parse_named(&mut self, text: &str, source: &str) -> Tree {
        let (left, right) = (self.left.clone(), self.right.clone());

        let elements = scan(text, &left, &right, &mut self.diagnostics);
        let registry = &self.registry;
        let elements = normalize(&elements,
                                 &left,
                                 &right,
                                 |name| registry.is_literal(name),
                                 &mut self.diagnostics);
        let root = build(&elements, &mut self.registry, "", &mut self.diagnostics);

        tracing::debug!(source, nodes = root.children().len(), "parsed template");
        Tree::new(root, source, &left, &right)
    }

    /// Returns the parsed tree for `uri`, from the cache or freshly fetched
    /// and parsed.
    ///
    /// # Errors
    /// The loader's [`ResourceError`] if the template cannot be fetched.
    pub fn load(&mut self, uri: &str) -> Result<Arc<Tree>, ResourceError> {
        let cache = Arc::clone(&self.cache);
        let key = CacheKey::new(uri, &self.left, &self.right);

        cache.get_or_insert_with(key, || {
                 let resource = self.resources.fetch(uri)?;
                 let mut tree = self.parse_named(&resource.text, uri);
                 tree.modified = resource.modified;
                 Ok(tree)
             })
    }

    /// Renders a parsed tree with the current variables.
    ///
    /// Problems are appended to [`diagnostics`](Self::diagnostics), which
    /// keeps everything until [`take_diagnostics`](Self::take_diagnostics)
    /// drains it. A long-lived engine should drain it after each render.
    pub fn render(&mut self, tree: &Tree) -> String {
        RenderContext::new(self, String::new(), 0).render_nodes(tree.nodes())
    }

    /// Loads and renders the template at `uri`.
    ///
    /// # Errors
    /// The loader's [`ResourceError`] if the template cannot be fetched. The
    /// failure is recorded as a warning as well.
    pub fn fetch(&mut self, uri: &str) -> Result<String, ResourceError> {
        match self.load(uri) {
            Ok(tree) => Ok(self.render(&tree)),
            Err(error) => {
                self.diagnostics.warning("", error.clone());
                Err(error)
            },
        }
    }

    /// Records a runtime problem on behalf of `name`.
    pub(crate) fn report(&mut self, name: &str, error: RuntimeError) {
        match error {
            RuntimeError::UndefinedVariable { .. }
            | RuntimeError::UnregisteredFunction { .. }
            | RuntimeError::UnregisteredOperator { .. }
            | RuntimeError::ArgumentCountMismatch { .. } => self.diagnostics.warning(name, error),
            _ => self.diagnostics.error(name, error),
        }
    }
}
