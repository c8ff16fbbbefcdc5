use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::{
    error::RuntimeError,
    interpreter::registry::{
        descriptor::{AutoloadDefinition, AutoloadDescriptor},
        handler::{Factory, FunctionHandler, Handler, OperatorHandler},
    },
};

/// A registry slot: a live handler, or a descriptor that creates one.
enum Entry<H: ?Sized> {
    Resolved(Rc<H>),
    Pending(Rc<AutoloadDescriptor>),
}

/// A static child ownership flag.
enum ChildTag {
    Known(bool),
    /// Decided by a handler that is not loaded yet.
    Pending(Rc<AutoloadDescriptor>),
}

/// Maps names to function and operator handlers.
///
/// Handlers are reference counted and the registry is not `Sync`; every
/// engine owns its own registry.
pub struct Registry {
    functions:  HashMap<String, Entry<dyn FunctionHandler>>,
    operators:  HashMap<String, Entry<dyn OperatorHandler>>,
    child_tags: HashMap<String, ChildTag>,
    loaders:    HashMap<String, Factory>,
    literals:   HashSet<String>,
}

impl Default for Registry {
    fn default() -> Self {
        Self { functions:  HashMap::new(),
               operators:  HashMap::new(),
               child_tags: HashMap::new(),
               loaders:    HashMap::new(),
               literals:   HashSet::from(["literal".to_string()]), }
    }
}

impl Registry {
    /// Creates a registry with no handlers and the `literal` tag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds one tag name to `handler` and records the handler's static
    /// child flags.
    pub fn register_function(&mut self, name: &str, handler: Rc<dyn FunctionHandler>) {
        self.record_child_tags(handler.as_ref());
        self.functions.insert(name.to_string(), Entry::Resolved(handler));
    }

    /// Binds every name from [`FunctionHandler::function_names`] to
    /// `handler` and records its static child flags.
    pub fn register_functions(&mut self, handler: Rc<dyn FunctionHandler>) {
        for name in handler.function_names() {
            self.functions.insert(name, Entry::Resolved(Rc::clone(&handler)));
        }
        self.record_child_tags(handler.as_ref());
    }

    fn record_child_tags(&mut self, handler: &dyn FunctionHandler) {
        for (tag, flag) in handler.child_tags() {
            self.child_tags.insert(tag, ChildTag::Known(flag));
        }
    }

    /// Removes a function tag.
    ///
    /// # Errors
    /// [`RuntimeError::UnregisterUnknown`] if nothing was registered under
    /// `name`.
    pub fn unregister_function(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.functions
            .remove(name)
            .map(drop)
            .ok_or_else(|| RuntimeError::UnregisterUnknown { name: name.to_string() })
    }

    /// Binds one operator name to `handler`.
    pub fn register_operator(&mut self, name: &str, handler: Rc<dyn OperatorHandler>) {
        self.operators.insert(name.to_string(), Entry::Resolved(handler));
    }

    /// Binds every name from [`OperatorHandler::operator_names`] to
    /// `handler`.
    pub fn register_operators(&mut self, handler: Rc<dyn OperatorHandler>) {
        for name in handler.operator_names() {
            self.operators.insert(name, Entry::Resolved(Rc::clone(&handler)));
        }
    }

    /// Removes an operator.
    ///
    /// # Errors
    /// [`RuntimeError::UnregisterUnknown`] if nothing was registered under
    /// `name`.
    pub fn unregister_operator(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.operators
            .remove(name)
            .map(drop)
            .ok_or_else(|| RuntimeError::UnregisterUnknown { name: name.to_string() })
    }

    /// Registers function tags that are loaded on first use.
    ///
    /// # Errors
    /// [`RuntimeError::InvalidAutoloadDefinition`] if the definition has no
    /// loader or no names. Nothing is registered in that case.
    pub fn register_autoload_functions(&mut self,
                                       definition: AutoloadDefinition)
                                       -> Result<(), RuntimeError> {
        let descriptor = Rc::new(definition.into_descriptor("function")?);

        for name in &descriptor.names {
            self.functions.insert(name.clone(), Entry::Pending(Rc::clone(&descriptor)));
        }
        for tag in &descriptor.child_tags {
            self.child_tags.insert(tag.clone(), ChildTag::Pending(Rc::clone(&descriptor)));
        }

        Ok(())
    }

    /// Registers operators that are loaded on first use.
    ///
    /// # Errors
    /// [`RuntimeError::InvalidAutoloadDefinition`] if the definition has no
    /// loader or no names. Nothing is registered in that case.
    pub fn register_autoload_operators(&mut self,
                                       definition: AutoloadDefinition)
                                       -> Result<(), RuntimeError> {
        let descriptor = Rc::new(definition.into_descriptor("operator")?);

        for name in &descriptor.names {
            self.operators.insert(name.clone(), Entry::Pending(Rc::clone(&descriptor)));
        }

        Ok(())
    }

    /// Binds a loader name, or class name, to a factory.
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    ///
    /// use templar::interpreter::{
    ///     evaluator::function::core::BuiltinOperators,
    ///     registry::{AutoloadDefinition, Handler, Registry},
    /// };
    ///
    /// let mut registry = Registry::new();
    /// registry.register_loader("text", |_| Some(Handler::Operator(Rc::new(BuiltinOperators))));
    /// registry.register_autoload_operators(AutoloadDefinition { function: Some("text".into()),
    ///                                                           names: vec!["upcase".into()],
    ///                                                           ..AutoloadDefinition::default() })
    ///         .unwrap();
    ///
    /// assert!(registry.operator("upcase").is_ok());
    /// assert!(registry.operator("reverse").is_ok());
    /// ```
    pub fn register_loader(&mut self,
                           name: &str,
                           factory: impl Fn(Option<&str>) -> Option<Handler> + 'static) {
        self.loaders.insert(name.to_string(), Rc::new(factory));
    }

    /// Looks up a function handler, loading it if needed.
    ///
    /// # Errors
    /// - [`RuntimeError::UnregisteredFunction`] if nothing is registered under
    ///   `name`.
    /// - [`RuntimeError::AutoloadFailed`] if the descriptor's loader is
    ///   missing or produced no function handler. The descriptor's names are
    ///   unregistered.
    pub fn function(&mut self, name: &str) -> Result<Rc<dyn FunctionHandler>, RuntimeError> {
        match self.functions.get(name) {
            Some(Entry::Resolved(handler)) => Ok(Rc::clone(handler)),
            Some(Entry::Pending(descriptor)) => {
                let descriptor = Rc::clone(descriptor);
                self.load_functions(name, &descriptor)
            },
            None => Err(RuntimeError::UnregisteredFunction { name: name.to_string() }),
        }
    }

    /// Looks up an operator handler, loading it if needed.
    ///
    /// # Errors
    /// - [`RuntimeError::UnregisteredOperator`] if nothing is registered under
    ///   `name`.
    /// - [`RuntimeError::AutoloadFailed`] if the descriptor's loader is
    ///   missing or produced no operator handler. The descriptor's names are
    ///   unregistered.
    pub fn operator(&mut self, name: &str) -> Result<Rc<dyn OperatorHandler>, RuntimeError> {
        match self.operators.get(name) {
            Some(Entry::Resolved(handler)) => Ok(Rc::clone(handler)),
            Some(Entry::Pending(descriptor)) => {
                let descriptor = Rc::clone(descriptor);
                self.load_operators(name, &descriptor)
            },
            None => Err(RuntimeError::UnregisteredOperator { name: name.to_string() }),
        }
    }

    /// Returns `true` if a function handler or descriptor is registered
    /// under `name`.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Returns `true` if an operator handler or descriptor is registered
    /// under `name`.
    #[must_use]
    pub fn has_operator(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Decides whether the tag `name` owns the nodes up to its end tag.
    ///
    /// A static child flag wins over the handler's
    /// [`FunctionHandler::has_children`]. Tags nobody registered own
    /// children.
    ///
    /// # Errors
    /// [`RuntimeError::AutoloadFailed`] if a descriptor had to be loaded and
    /// could not be. The tag is unknown afterwards.
    pub fn has_children(&mut self, name: &str) -> Result<bool, RuntimeError> {
        if let Some(ChildTag::Pending(descriptor)) = self.child_tags.get(name) {
            let descriptor = Rc::clone(descriptor);
            self.load_functions(name, &descriptor)?;
        }

        if let Some(ChildTag::Known(flag)) = self.child_tags.get(name) {
            return Ok(*flag);
        }

        if self.functions.contains_key(name) {
            return Ok(self.function(name)?.has_children(name));
        }

        Ok(true)
    }

    fn load_functions(&mut self,
                      name: &str,
                      descriptor: &Rc<AutoloadDescriptor>)
                      -> Result<Rc<dyn FunctionHandler>, RuntimeError> {
        let Some(Handler::Function(handler)) = self.load(descriptor) else {
            discard(&mut self.functions, descriptor);
            self.child_tags
                .retain(|_, tag| !matches!(tag, ChildTag::Pending(d) if Rc::ptr_eq(d, descriptor)));
            return Err(autoload_failed(name, descriptor));
        };

        tracing::debug!(name, loader = descriptor.loader.key(), "loaded function handler");
        self.register_functions(Rc::clone(&handler));
        resolve(&mut self.functions, descriptor, &handler);
        // Tags the handler declared no flag for fall back to its has_children.
        self.child_tags
            .retain(|_, tag| !matches!(tag, ChildTag::Pending(d) if Rc::ptr_eq(d, descriptor)));
        Ok(handler)
    }

    fn load_operators(&mut self,
                      name: &str,
                      descriptor: &Rc<AutoloadDescriptor>)
                      -> Result<Rc<dyn OperatorHandler>, RuntimeError> {
        let Some(Handler::Operator(handler)) = self.load(descriptor) else {
            discard(&mut self.operators, descriptor);
            return Err(autoload_failed(name, descriptor));
        };

        tracing::debug!(name, loader = descriptor.loader.key(), "loaded operator handler");
        self.register_operators(Rc::clone(&handler));
        resolve(&mut self.operators, descriptor, &handler);
        Ok(handler)
    }

    fn load(&self, descriptor: &AutoloadDescriptor) -> Option<Handler> {
        let factory = self.loaders.get(descriptor.loader.key())?;
        factory(descriptor.loader.parameter())
    }

    /// Marks `name` as a literal tag: its body is copied to the output
    /// unparsed.
    pub fn register_literal(&mut self, name: &str) {
        self.literals.insert(name.to_string());
    }

    /// Removes a literal tag name.
    pub fn unregister_literal(&mut self, name: &str) {
        self.literals.remove(name);
    }

    /// Returns `true` if `name` is a literal tag.
    #[must_use]
    pub fn is_literal(&self, name: &str) -> bool {
        self.literals.contains(name)
    }
}

/// Rewrites every slot still pointing at `descriptor` to `handler`.
fn resolve<H: ?Sized>(table: &mut HashMap<String, Entry<H>>,
                      descriptor: &Rc<AutoloadDescriptor>,
                      handler: &Rc<H>) {
    for entry in table.values_mut() {
        if matches!(entry, Entry::Pending(d) if Rc::ptr_eq(d, descriptor)) {
            *entry = Entry::Resolved(Rc::clone(handler));
        }
    }
}

/// Removes every slot still pointing at `descriptor`.
fn discard<H: ?Sized>(table: &mut HashMap<String, Entry<H>>, descriptor: &Rc<AutoloadDescriptor>) {
    table.retain(|_, entry| !matches!(entry, Entry::Pending(d) if Rc::ptr_eq(d, descriptor)));
}

fn autoload_failed(name: &str, descriptor: &AutoloadDescriptor) -> RuntimeError {
    RuntimeError::AutoloadFailed { name:   name.to_string(),
                                   loader: descriptor.loader.key().to_string(), }
}
