use crate::{
    error::RuntimeError,
    interpreter::value::core::Value,
    util::num::key_to_index,
};

/// Resolves one attribute step.
///
/// The key must be text or a number. Arrays are indexed by the key parsed as
/// a position, maps by the key itself, and objects through
/// [`AttributeObject`](crate::interpreter::value::object::AttributeObject).
///
/// # Errors
/// - [`RuntimeError::InvalidAttributeKey`] if the key is not text or a
///   number.
/// - [`RuntimeError::NoSuchArrayAttribute`] if an array or map has no such
///   entry.
/// - [`RuntimeError::NoAttributeCapability`] if the object does not support
///   attributes.
/// - [`RuntimeError::NoSuchObjectAttribute`] if the object has no such
///   attribute.
/// - [`RuntimeError::NotAContainer`] for any other value.
///
/// # Example
/// ```
/// use templar::interpreter::value::{attribute::step, core::Value};
///
/// let list = Value::from(vec![Value::from("a"), Value::from("b")]);
///
/// assert_eq!(step(&list, &Value::Integer(1)), Ok(Value::from("b")));
/// assert!(step(&list, &Value::from("x")).is_err());
/// ```
pub fn step(value: &Value, key: &Value) -> Result<Value, RuntimeError> {
    let key = match key {
        Value::Text(_) | Value::Integer(_) | Value::Real(_) => key.to_string(),
        other => {
            return Err(RuntimeError::InvalidAttributeKey { type_name: other.type_name() });
        },
    };

    match value {
        Value::Array(items) => {
            key_to_index(&key).and_then(|i| items.get(i))
                              .cloned()
                              .ok_or(RuntimeError::NoSuchArrayAttribute { key })
        },
        Value::Map(entries) => {
            entries.get(&key)
                   .cloned()
                   .ok_or(RuntimeError::NoSuchArrayAttribute { key })
        },
        Value::Object(object) => {
            if !object.supports_attributes() {
                return Err(RuntimeError::NoAttributeCapability { type_name: object.type_name()
                                                                                  .to_string(), });
            }
            if !object.has_attribute(&key) {
                return Err(RuntimeError::NoSuchObjectAttribute { key });
            }
            Ok(object.get_attribute(&key))
        },
        other => Err(RuntimeError::NotAContainer { type_name: other.type_name() }),
    }
}

/// Resolves an attribute chain left to right. The first failing step ends
/// the walk.
///
/// # Errors
/// The error of the first failing [`step`].
pub fn resolve(root: Value, path: &[Value]) -> Result<Value, RuntimeError> {
    path.iter().try_fold(root, |value, key| step(&value, key))
}
