use std::collections::HashMap;

use crate::{
    error::RuntimeError,
    interpreter::value::{attribute::resolve, core::Value},
};

/// Holds the variables templates read, keyed by namespace and name.
///
/// Namespaces are flat strings; `outer:inner` is just another namespace and
/// has no relation to `outer`. The empty string is the global namespace.
#[derive(Debug, Default, Clone)]
pub struct VariableStore {
    namespaces: HashMap<String, HashMap<String, Value>>,
}

impl VariableStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` in `namespace`, replacing any previous value.
    ///
    /// # Example
    /// ```
    /// use templar::interpreter::{store::VariableStore, value::core::Value};
    ///
    /// let mut store = VariableStore::new();
    /// store.set("", "x", 1_i64);
    /// store.set("", "x", "one");
    ///
    /// assert_eq!(store.get("", "x"), Some(&Value::from("one")));
    /// ```
    pub fn set(&mut self, namespace: &str, name: &str, value: impl Into<Value>) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
    }

    /// Removes a binding.
    ///
    /// # Errors
    /// [`RuntimeError::UnsetUndefined`] if the variable was not set.
    pub fn unset(&mut self, namespace: &str, name: &str) -> Result<Value, RuntimeError> {
        self.namespaces
            .get_mut(namespace)
            .and_then(|vars| vars.remove(name))
            .ok_or_else(|| RuntimeError::UnsetUndefined { namespace: namespace.to_string(),
                                                          name:      name.to_string(), })
    }

    /// Returns `true` if the variable is set.
    #[must_use]
    pub fn has(&self, namespace: &str, name: &str) -> bool {
        self.get(namespace, name).is_some()
    }

    /// Returns `true` if the variable is set and every step of `path`
    /// resolves.
    #[must_use]
    pub fn has_path(&self, namespace: &str, name: &str, path: &[Value]) -> bool {
        self.get_path(namespace, name, path).is_ok()
    }

    /// Returns the value of a variable.
    #[must_use]
    pub fn get(&self, namespace: &str, name: &str) -> Option<&Value> {
        self.namespaces.get(namespace).and_then(|vars| vars.get(name))
    }

    /// Returns the value at the end of an attribute path.
    ///
    /// # Errors
    /// [`RuntimeError::UndefinedVariable`] if the variable is not set, or
    /// the error of the first attribute step that fails.
    ///
    /// # Example
    /// ```
    /// use templar::interpreter::{store::VariableStore, value::core::Value};
    ///
    /// let mut store = VariableStore::new();
    /// store.set("app", "list", vec![Value::from("a"), Value::from("b")]);
    ///
    /// assert_eq!(store.get_path("app", "list", &[Value::Integer(0)]), Ok(Value::from("a")));
    /// assert!(!store.has_path("app", "list", &[Value::Integer(5)]));
    /// ```
    pub fn get_path(&self, namespace: &str, name: &str, path: &[Value]) -> Result<Value, RuntimeError> {
        let root = self.get(namespace, name)
                       .cloned()
                       .ok_or_else(|| RuntimeError::UndefinedVariable { namespace:
                                                                            namespace.to_string(),
                                                                        name:      name.to_string(), })?;
        resolve(root, path)
    }
}
