use std::rc::Rc;

use crate::interpreter::value::core::Value;

/// Converts a value's text to upper case.
///
/// Non-text values are converted through their display form first; null
/// stays null.
///
/// # Example
/// ```
/// use templar::interpreter::{evaluator::function::text::upcase, value::core::Value};
///
/// assert_eq!(upcase(Value::from("abc"), &[]), Value::from("ABC"));
/// ```
pub fn upcase(value: Value, _: &[Value]) -> Value {
    map_text(value, |text| text.to_uppercase())
}

/// Converts a value's text to lower case.
pub fn downcase(value: Value, _: &[Value]) -> Value {
    map_text(value, |text| text.to_lowercase())
}

/// Reverses the characters of text or the items of an array.
///
/// # Example
/// ```
/// use templar::interpreter::{evaluator::function::text::reverse, value::core::Value};
///
/// assert_eq!(reverse(Value::from("abc"), &[]), Value::from("cba"));
/// assert_eq!(reverse(Value::from(vec![Value::Integer(1), Value::Integer(2)]), &[]),
///            Value::from(vec![Value::Integer(2), Value::Integer(1)]));
/// ```
pub fn reverse(value: Value, _: &[Value]) -> Value {
    match value {
        Value::Array(items) => Value::Array(Rc::new(items.iter().rev().cloned().collect())),
        other => map_text(other, |text| text.chars().rev().collect()),
    }
}

/// Returns the value unchanged.
pub const fn identity(value: Value, _: &[Value]) -> Value {
    value
}

fn map_text(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Text(text) => Value::Text(f(&text)),
        other => Value::Text(f(&other.to_string())),
    }
}
