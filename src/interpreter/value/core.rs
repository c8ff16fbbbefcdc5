use std::{fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    ast::{Literal, Number},
    interpreter::value::object::AttributeObject,
};

/// Represents a runtime value of the template engine.
///
/// Containers are reference counted, so cloning a value and walking into it
/// never copies the data.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value. Renders as nothing.
    #[default]
    Null,
    /// A boolean. Renders as `1` or nothing.
    Bool(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A double precision floating-point number.
    Real(f64),
    /// A string.
    Text(String),
    /// A list, indexed by position.
    Array(Rc<Vec<Self>>),
    /// An ordered map with string keys.
    Map(Rc<IndexMap<String, Self>>),
    /// A host object.
    Object(Rc<dyn AttributeObject>),
}

impl Value {
    /// Returns the name of the value's type, as used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` if the value is [`Null`](Self::Null).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for null and for empty text.
    ///
    /// # Example
    /// ```
    /// use templar::interpreter::value::core::Value;
    ///
    /// assert!(Value::Null.is_empty());
    /// assert!(Value::from("").is_empty());
    /// assert!(!Value::Integer(0).is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Returns the text of a [`Text`](Self::Text) value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Compares by content; objects compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Writes the value the way it appears in rendered output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Bool(false) => Ok(()),
            Self::Bool(true) => write!(f, "1"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(text) => f.write_str(text),
            Self::Array(_) => write!(f, "Array"),
            Self::Map(_) => write!(f, "Map"),
            Self::Object(object) => write!(f, "Object({})", object.type_name()),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(v))
    }
}

impl From<IndexMap<String, Self>> for Value {
    fn from(v: IndexMap<String, Self>) -> Self {
        Self::Map(Rc::new(v))
    }
}

impl<T> From<Rc<T>> for Value
    where T: AttributeObject + 'static
{
    fn from(v: Rc<T>) -> Self {
        Self::Object(v)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Self::Integer(i),
            Number::Real(r) => Self::Real(r.0),
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Text(text) => text.as_str().into(),
            Literal::Number(n) => (*n).into(),
            Literal::Null => Self::Null,
        }
    }
}
