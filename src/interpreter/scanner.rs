use crate::{error::ParseError, interpreter::diagnostics::Diagnostics};

/// The kind of an element found by the first pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain text between tags.
    Text,
    /// `{* ... *}`
    Comment,
    /// An inline expression, `{$x}`, `{"text"}`, `{12}` or `{count($x)}`.
    Variable,
    /// A self-closing tag, `{name .../}`.
    SingleTag,
    /// An opening tag, `{name ...}`.
    NormalTag,
    /// A closing tag, `{/name}`.
    EndTag,
}

impl ElementKind {
    /// Returns `true` for the three tag kinds.
    #[must_use]
    pub const fn is_tag(self) -> bool {
        matches!(self, Self::SingleTag | Self::NormalTag | Self::EndTag)
    }

    /// Returns `true` for text and inline expressions.
    #[must_use]
    pub const fn is_text_like(self) -> bool {
        matches!(self, Self::Text | Self::Variable)
    }
}

/// A flat piece of template source produced by the first pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// What the element is.
    pub kind: ElementKind,
    /// For text, the text. For everything else, the body between the
    /// delimiters with the end tag `/`, the single tag `/` and escapes
    /// removed.
    pub text: String,
    /// For tags, the body up to the first whitespace.
    pub name: Option<String>,
    /// The line the element starts on.
    pub line: usize,
}

impl Element {
    /// Creates a text element.
    #[must_use]
    pub fn text(text: impl Into<String>, line: usize) -> Self {
        Self { kind: ElementKind::Text,
               text: text.into(),
               name: None,
               line }
    }

    /// Returns the tag name, or an empty string for non-tags.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Splits template source into elements.
///
/// This is the first parse pass. It only looks for delimiters; it does not
/// understand tag parameters or expressions.
///
/// - A left delimiter followed by `*` opens a comment that runs to `*` and
///   the right delimiter, or to the end of the source.
/// - A right delimiter preceded by a backslash does not close a tag; the
///   escape is removed from the body.
/// - An unterminated tag turns the rest of the source into text.
/// - Empty delimiters match nothing; the whole source is text.
///
/// # Parameters
/// - `source`: The template source.
/// - `left`, `right`: The delimiters, normally `{` and `}`.
/// - `diagnostics`: Receives warnings for unterminated tags and comments.
///
/// # Example
/// ```
/// use templar::interpreter::{
///     diagnostics::Diagnostics,
///     scanner::{ElementKind, scan},
/// };
///
/// let mut diagnostics = Diagnostics::new();
/// let elements = scan("abc{$x}def", "{", "}", &mut diagnostics);
/// let kinds: Vec<_> = elements.iter().map(|e| e.kind).collect();
///
/// assert_eq!(kinds, [ElementKind::Text, ElementKind::Variable, ElementKind::Text]);
/// ```
pub fn scan(source: &str, left: &str, right: &str, diagnostics: &mut Diagnostics) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut pos = 0;
    let mut line = 1;

    if left.is_empty() || right.is_empty() {
        if !source.is_empty() {
            elements.push(Element::text(source, line));
        }
        return elements;
    }

    while pos < source.len() {
        let Some(offset) = source[pos..].find(left) else {
            elements.push(Element::text(&source[pos..], line));
            break;
        };
        let block_start = pos + offset;
        let body_start = block_start + left.len();

        if block_start > pos {
            elements.push(Element::text(&source[pos..block_start], line));
            line += count_lines(&source[pos..block_start]);
            pos = block_start;
        }

        if source[body_start..].starts_with('*') {
            let terminator = format!("*{right}");
            let (body_end, block_end) = match source[body_start + 1..].find(&terminator) {
                Some(i) => (body_start + 1 + i, body_start + 1 + i + terminator.len()),
                None => {
                    diagnostics.warning("", ParseError::UnterminatedComment { line });
                    (source.len(), source.len())
                },
            };
            elements.push(Element { kind: ElementKind::Comment,
                                    text: source[body_start + 1..body_end].to_string(),
                                    name: None,
                                    line });
            line += count_lines(&source[pos..block_end]);
            pos = block_end;
            continue;
        }

        let Some(body_end) = find_unescaped(source, body_start, right) else {
            diagnostics.warning("", ParseError::UnterminatedTag { line });
            elements.push(Element::text(&source[pos..], line));
            break;
        };
        let block_end = body_end + right.len();
        let body = source[body_start..body_end].replace(&format!("\\{right}"), right);

        elements.push(classify(body, &source[block_start..block_end], line));
        line += count_lines(&source[block_start..block_end]);
        pos = block_end;
    }

    elements
}

/// Finds the next right delimiter at or after `from` that is not preceded by
/// a backslash.
fn find_unescaped(source: &str, from: usize, right: &str) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = source[search..].find(right) {
        let end = search + offset;
        if !source[..end].ends_with('\\') {
            return Some(end);
        }
        search = end + right.len();
    }
    None
}

/// Decides what kind of element a tag body is.
///
/// `raw` is the whole block including delimiters; it is used verbatim when
/// the body is empty.
fn classify(body: String, raw: &str, line: usize) -> Element {
    if body.is_empty() {
        return Element::text(raw, line);
    }

    let (kind, body) = if let Some(rest) = body.strip_prefix('/') {
        (ElementKind::EndTag, rest.to_string())
    } else if let Some(rest) = body.strip_suffix('/') {
        (ElementKind::SingleTag, rest.to_string())
    } else {
        (ElementKind::NormalTag, body)
    };

    if is_expression(&body) {
        return Element { kind: ElementKind::Variable,
                         text: body,
                         name: None,
                         line };
    }

    let name = body.split(|c: char| c.is_ascii_whitespace()).next().unwrap_or_default().to_string();
    Element { kind,
              text: body,
              name: Some(name),
              line }
}

/// Returns `true` when a tag body is an inline expression rather than a
/// named tag: it starts with `$`, a quote, a digit, `-` and a digit, or is an
/// operator call such as `count(`.
fn is_expression(body: &str) -> bool {
    let bytes = body.as_bytes();
    match bytes.first() {
        Some(b'$' | b'"' | b'\'') => true,
        Some(b) if b.is_ascii_digit() => true,
        Some(b'-') => bytes.get(1).is_some_and(u8::is_ascii_digit),
        Some(_) => {
            let ident_len = bytes.iter()
                                 .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'-')
                                 .count();
            ident_len > 0 && bytes.get(ident_len) == Some(&b'(')
        },
        None => false,
    }
}

fn count_lines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
