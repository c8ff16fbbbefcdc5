use crate::ast::Number;

/// Converts numeral text into a [`Number`].
///
/// Text without a decimal point becomes an integer when it fits in an `i64`.
/// Everything else, including integers too large for `i64`, becomes a real.
///
/// ## Returns
/// - `Some(Number)`: The parsed number.
/// - `None`: If the text is not a numeral at all.
///
/// ## Example
/// ```
/// use templar::{ast::Number, util::num::parse_numeral};
///
/// assert_eq!(parse_numeral("42"), Some(Number::Integer(42)));
/// assert_eq!(parse_numeral("-1.5"), Some(Number::Real((-1.5).into())));
/// assert_eq!(parse_numeral("12."), Some(Number::Real(12.0.into())));
/// assert_eq!(parse_numeral("abc"), None);
/// assert_eq!(parse_numeral("inf"), None);
/// ```
#[must_use]
pub fn parse_numeral(text: &str) -> Option<Number> {
    if !text.bytes().any(|b| b.is_ascii_digit())
       || !text.bytes().all(|b| b.is_ascii_digit() || b == b'.' || b == b'-')
    {
        return None;
    }
    if !text.contains('.')
       && let Ok(n) = text.parse::<i64>()
    {
        return Some(Number::Integer(n));
    }
    text.parse::<f64>().ok().map(|r| Number::Real(r.into()))
}

/// Converts an attribute key into an array index.
///
/// Only plain non-negative decimal integers are accepted; `"01"` is accepted
/// as `1` while `"1.0"`, `"-1"` and `" 1"` are not indices.
///
/// ## Example
/// ```
/// use templar::util::num::key_to_index;
///
/// assert_eq!(key_to_index("3"), Some(3));
/// assert_eq!(key_to_index("-1"), None);
/// assert_eq!(key_to_index("name"), None);
/// ```
#[must_use]
pub fn key_to_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}
