use std::fmt;

use crate::interpreter::value::core::Value;

/// Tells the renderer to show an object through a template.
///
/// When a variable expression evaluates to an object with template data,
/// the object is bound as `variable_name` and the template at `uri` is
/// rendered in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateData {
    /// The template to render.
    pub uri:           String,
    /// The name the object is bound to while the template renders.
    pub variable_name: String,
}

/// A host object that templates can read from.
///
/// Every method except [`type_name`](Self::type_name) has a default, so an
/// object only implements what it supports. An object that keeps the
/// default [`supports_attributes`](Self::supports_attributes) rejects every
/// attribute lookup.
///
/// # Example
/// ```
/// use templar::interpreter::value::{core::Value, object::AttributeObject};
///
/// #[derive(Debug)]
/// struct Person;
///
/// impl AttributeObject for Person {
///     fn type_name(&self) -> &str {
///         "Person"
///     }
///
///     fn supports_attributes(&self) -> bool {
///         true
///     }
///
///     fn has_attribute(&self, key: &str) -> bool {
///         key == "name"
///     }
///
///     fn get_attribute(&self, _key: &str) -> Value {
///         "Doe".into()
///     }
/// }
///
/// assert_eq!(Person.get_attribute("name"), Value::from("Doe"));
/// ```
pub trait AttributeObject: fmt::Debug {
    /// The name shown in diagnostics and in `Object(<name>)` output.
    fn type_name(&self) -> &str;

    /// Returns `true` if the object implements attribute access.
    fn supports_attributes(&self) -> bool {
        false
    }

    /// Returns `true` if `key` names an attribute of the object.
    fn has_attribute(&self, _key: &str) -> bool {
        false
    }

    /// Returns the attribute `key`. Only called after
    /// [`has_attribute`](Self::has_attribute) returned `true`.
    fn get_attribute(&self, _key: &str) -> Value {
        Value::Null
    }

    /// Returns the template the object renders itself through, if any.
    fn template_data(&self) -> Option<TemplateData> {
        None
    }
}
