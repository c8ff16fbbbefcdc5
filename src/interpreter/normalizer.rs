use crate::{
    error::ParseError,
    interpreter::{
        diagnostics::Diagnostics,
        scanner::{Element, ElementKind},
    },
};

/// Removes layout whitespace around tags and collapses literal blocks.
///
/// This is the second parse pass. It walks the elements pairwise:
///
/// - text directly before a tag loses one trailing newline,
/// - text directly after a tag loses one leading newline,
/// - comments are dropped,
/// - text that ends up empty is dropped,
/// - a tag whose name `is_literal` reports as a literal name swallows every
///   element up to its end tag, re-serialized with the delimiters into one
///   text element.
///
/// # Parameters
/// - `elements`: Output of the first pass.
/// - `left`, `right`: The delimiters used to re-serialize literal blocks.
/// - `is_literal`: Tells whether a tag name is a literal tag.
/// - `diagnostics`: Receives a warning for unterminated literal blocks.
pub fn normalize(elements: &[Element],
                 left: &str,
                 right: &str,
                 is_literal: impl Fn(&str) -> bool,
                 diagnostics: &mut Diagnostics)
                 -> Vec<Element> {
    let mut normalized = Vec::with_capacity(elements.len());
    let mut strip_leading = false;
    let mut i = 0;

    while i < elements.len() {
        let element = &elements[i];
        let next_is_tag = elements.get(i + 1).is_some_and(|e| e.kind.is_tag());

        match element.kind {
            ElementKind::Comment => strip_leading = false,
            ElementKind::Text | ElementKind::Variable => {
                let mut text = element.text.as_str();
                if strip_leading {
                    text = text.strip_prefix('\n').unwrap_or(text);
                }
                if next_is_tag {
                    text = text.strip_suffix('\n').unwrap_or(text);
                }
                strip_leading = false;

                if !text.is_empty() {
                    normalized.push(Element { text: text.to_string(),
                                              ..element.clone() });
                }
            },
            ElementKind::SingleTag | ElementKind::NormalTag | ElementKind::EndTag => {
                strip_leading = false;

                if is_literal(element.name()) {
                    if element.kind == ElementKind::SingleTag {
                        i += 1;
                        continue;
                    }
                    let (text, resume) = capture_literal(elements, i, left, right, diagnostics);
                    if !text.is_empty() {
                        normalized.push(Element::text(text, element.line));
                    }
                    i = resume;
                    continue;
                }

                strip_leading = true;
                normalized.push(element.clone());
            },
        }

        i += 1;
    }

    normalized
}

/// Re-serializes the elements of the literal block opened at `start`.
///
/// Returns the captured text and the index of the first element after the
/// block's end tag.
fn capture_literal(elements: &[Element],
                   start: usize,
                   left: &str,
                   right: &str,
                   diagnostics: &mut Diagnostics)
                   -> (String, usize) {
    let opening = &elements[start];
    let name = opening.name();
    let mut text = String::new();

    for (offset, element) in elements[start + 1..].iter().enumerate() {
        let body = element.text.replace(right, &format!("\\{right}"));
        match element.kind {
            ElementKind::EndTag if element.name() == name => {
                return (text, start + offset + 2);
            },
            ElementKind::EndTag => text.push_str(&format!("{left}/{body}{right}")),
            ElementKind::NormalTag | ElementKind::Variable => {
                text.push_str(&format!("{left}{body}{right}"));
            },
            ElementKind::SingleTag => text.push_str(&format!("{left}{body}/{right}")),
            ElementKind::Comment => text.push_str(&format!("{left}*{}*{right}", element.text)),
            ElementKind::Text => text.push_str(&element.text),
        }
    }

    diagnostics.warning("", ParseError::UnterminatedLiteral { name: name.to_string(),
                                                              line: opening.line, });
    (text, elements.len())
}
