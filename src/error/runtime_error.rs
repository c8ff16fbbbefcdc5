/// Represents all problems that can occur while rendering a tree.
///
/// None of these abort a render. The offending expression resolves to an
/// empty value, or the offending operator becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// A variable was not bound in the store.
    #[error("Undefined variable: '{name}'{}.", in_namespace(.namespace))]
    UndefinedVariable {
        /// The namespace that was searched.
        namespace: String,
        /// The variable name.
        name:      String,
    },
    /// A variable could not be unset because it was never set.
    #[error("Undefined variable: '{namespace}:{name}', cannot unset.")]
    UnsetUndefined {
        /// The namespace that was searched.
        namespace: String,
        /// The variable name.
        name:      String,
    },
    /// An attribute key resolved to something that is not text or a number.
    #[error("Cannot use type {type_name} for attribute lookup.")]
    InvalidAttributeKey {
        /// The type of the key value.
        type_name: &'static str,
    },
    /// An array or map had no entry for the key.
    #[error("No such attribute for array: {key}.")]
    NoSuchArrayAttribute {
        /// The key that was looked up.
        key: String,
    },
    /// An object reported that it does not have the attribute.
    #[error("No such attribute for object: {key}.")]
    NoSuchObjectAttribute {
        /// The key that was looked up.
        key: String,
    },
    /// An object does not expose attribute access at all.
    #[error("Cannot retrieve attribute of object({type_name}), no attribute functions available.")]
    NoAttributeCapability {
        /// The object's type name.
        type_name: String,
    },
    /// An attribute was requested from a scalar.
    #[error("Cannot retrieve attribute of a {type_name}.")]
    NotAContainer {
        /// The type of the value.
        type_name: &'static str,
    },
    /// A function tag has no handler.
    #[error("Function '{name}' is not registered.")]
    UnregisteredFunction {
        /// The function name.
        name: String,
    },
    /// An operator has no handler.
    #[error("Operator '{name}' is not registered.")]
    UnregisteredOperator {
        /// The operator name.
        name: String,
    },
    /// A function or operator could not be unregistered because it was never
    /// registered.
    #[error("'{name}' is not registered, cannot unregister.")]
    UnregisterUnknown {
        /// The function or operator name.
        name: String,
    },
    /// An autoload definition had neither a loader nor any names.
    #[error("Cannot register {kind} definition, missing data.")]
    InvalidAutoloadDefinition {
        /// `function` or `operator`.
        kind: &'static str,
    },
    /// An autoload descriptor could not produce a handler.
    #[error("Autoload of '{name}' through loader '{loader}' failed.")]
    AutoloadFailed {
        /// The name that triggered the load.
        name:   String,
        /// The loader the descriptor referred to.
        loader: String,
    },
    /// A handler received the wrong number of parameters.
    #[error("Operator '{name}' expects {expected} parameter(s), got {found}.")]
    ArgumentCountMismatch {
        /// The operator name.
        name:     String,
        /// A description of the accepted counts.
        expected: String,
        /// The number of parameters supplied.
        found:    usize,
    },
    /// A function was invoked without one of its required parameters.
    #[error("Missing parameter '{parameter}'.")]
    MissingParameter {
        /// The parameter name.
        parameter: String,
    },
    /// Includes nested deeper than the engine allows.
    #[error("Include of '{uri}' exceeds the maximum nesting depth of {depth}.")]
    IncludeDepthExceeded {
        /// The template that would have been included.
        uri:   String,
        /// The depth limit.
        depth: usize,
    },
}

fn in_namespace(namespace: &str) -> String {
    if namespace.is_empty() {
        String::new()
    } else {
        format!(" in namespace '{namespace}'")
    }
}
