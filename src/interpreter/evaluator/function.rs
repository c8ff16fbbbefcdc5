/// Case and order operators.
///
/// `upcase`, `downcase`, `reverse` and `identity`.
pub mod text;
/// The `count` operator.
///
/// Counts the entries of arrays and maps and the characters of text.
pub mod count;
/// The `default` operator.
///
/// Replaces an empty value with the first non-empty parameter.
pub mod default;
/// The `ldelim` and `rdelim` function tags.
///
/// Output the engine's delimiters, which cannot be written literally.
pub mod delimiter;
/// The `include` function tag.
///
/// Renders another template in place, optionally in its own namespace with
/// its own variables.
pub mod include;

pub mod core;
