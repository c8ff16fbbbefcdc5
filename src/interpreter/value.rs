/// Core runtime value type.
///
/// Defines [`core::Value`], its display form as it appears in rendered
/// output, and conversions from Rust types and source literals.
pub mod core;

/// Host objects exposed to templates.
///
/// Defines the [`object::AttributeObject`] trait through which embedders
/// give templates read access to their own types, and the template data
/// that lets an object render itself through a template.
pub mod object;

/// Attribute chain resolution.
///
/// Walks `.key` and `[index]` steps into arrays, maps and objects. Each step
/// is a pure function from a value and a key to a new value.
pub mod attribute;
