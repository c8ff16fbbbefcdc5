use crate::interpreter::value::core::Value;

/// Counts the entries of an array or map, or the characters of text.
///
/// Null counts as zero and any other single value as one.
///
/// # Example
/// ```
/// use templar::interpreter::{evaluator::function::count::count, value::core::Value};
///
/// assert_eq!(count(Value::from("héllo"), &[]), Value::Integer(5));
/// assert_eq!(count(Value::Null, &[]), Value::Integer(0));
/// ```
pub fn count(value: Value, _: &[Value]) -> Value {
    let n = match &value {
        Value::Null => 0,
        Value::Array(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::Text(text) => text.chars().count(),
        _ => 1,
    };
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}
