use crate::interpreter::value::core::Value;

/// Replaces null or empty text with the first parameter that is neither.
///
/// If every parameter is empty too, the last one is returned.
///
/// # Example
/// ```
/// use templar::interpreter::{evaluator::function::default::default, value::core::Value};
///
/// assert_eq!(default(Value::Null, &["none".into()]), Value::from("none"));
/// assert_eq!(default(Value::from("x"), &["none".into()]), Value::from("x"));
/// assert_eq!(default(Value::from(""), &[Value::Null, Value::Integer(3)]), Value::Integer(3));
/// ```
pub fn default(value: Value, parameters: &[Value]) -> Value {
    if !value.is_empty() {
        return value;
    }

    parameters.iter()
              .find(|p| !p.is_empty())
              .or_else(|| parameters.last())
              .cloned()
              .unwrap_or(value)
}
