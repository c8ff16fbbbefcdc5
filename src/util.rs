/// Numeric conversion helpers.
///
/// This module converts numeral text from templates into numbers, and
/// attribute keys into array indices, without silent data loss. Every
/// function returns an `Option` which is `None` when the conversion would be
/// lossy or the text is not a numeral.
pub mod num;
