/// Represents all problems that can occur while parsing a template.
///
/// Every variant carries the source line of the element it was found in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A left delimiter was never closed by a right delimiter.
    #[error("Warning on line {line}: Unterminated tag, the rest of the template is treated as text.")]
    UnterminatedTag {
        /// The source line where the tag starts.
        line: usize,
    },
    /// A comment was never closed.
    #[error("Warning on line {line}: Unterminated comment.")]
    UnterminatedComment {
        /// The source line where the comment starts.
        line: usize,
    },
    /// A quoted string ran to the end of its tag.
    #[error("Warning on line {line}: Unterminated string literal.")]
    UnterminatedString {
        /// The source line where the string starts.
        line: usize,
    },
    /// A literal block had no matching end tag.
    #[error("Warning on line {line}: Literal block '{name}' is never closed.")]
    UnterminatedLiteral {
        /// The literal tag name.
        name: String,
        /// The source line where the block starts.
        line: usize,
    },
    /// Tag parameters must be separated by whitespace.
    #[error("Error on line {line}: Expected whitespace, got: '{found}'.")]
    ExpectedWhitespace {
        /// The unparsed remainder of the tag.
        found: String,
        /// The source line of the tag.
        line:  usize,
    },
    /// A tag parameter name was not followed by `=`.
    #[error("Error on line {line}: Invalid parameter characters in function '{tag}': '{found}'.")]
    InvalidParameter {
        /// The tag being parsed.
        tag:   String,
        /// The unparsed remainder of the tag.
        found: String,
        /// The source line of the tag.
        line:  usize,
    },
    /// End tags cannot carry parameters.
    #[error("Warning on line {line}: End tag '{tag}' cannot have attributes.")]
    EndTagAttributes {
        /// The end tag name.
        tag:  String,
        /// The source line of the tag.
        line: usize,
    },
    /// An end tag was found for a function that does not own children.
    #[error("Warning on line {line}: End tag '{tag}' for function which does not accept children, ignoring tag.")]
    EndTagWithoutChildren {
        /// The end tag name.
        tag:  String,
        /// The source line of the tag.
        line: usize,
    },
    /// An end tag was found with no open tag to close.
    #[error("Warning on line {line}: End tag '{tag}' has no matching start tag, ignoring tag.")]
    UnopenedEndTag {
        /// The end tag name.
        tag:  String,
        /// The source line of the tag.
        line: usize,
    },
    /// An end tag closed a different tag than the innermost open one.
    #[error("Warning on line {line}: Unterminated tag '{open}' does not match tag '{close}'.")]
    MismatchedEndTag {
        /// The innermost open tag.
        open:  String,
        /// The end tag actually found.
        close: String,
        /// The source line of the end tag.
        line:  usize,
    },
    /// A tag's child ownership changed between its opening and closing tag.
    #[error("Warning on line {line}: Function '{tag}' was opened with children but its end tag is not accepted any more.")]
    InconsistentChildren {
        /// The tag name.
        tag:  String,
        /// The source line of the end tag.
        line: usize,
    },
    /// A tag was still open at the end of the template.
    #[error("Warning on line {line}: Tag '{tag}' is never closed.")]
    UnclosedTag {
        /// The open tag name.
        tag:  String,
        /// The source line of the opening tag.
        line: usize,
    },
    /// Characters remained after a variable expression.
    #[error("Warning on line {line}: Junk at variable end: '{junk}' ({parsed}).")]
    TrailingJunk {
        /// The unparsed characters.
        junk:   String,
        /// The part that was parsed.
        parsed: String,
        /// The source line of the element.
        line:   usize,
    },
    /// A `[` attribute was not closed by `]`.
    #[error("Warning on line {line}: Indexing didn't end with a ']'.")]
    UnclosedIndex {
        /// The source line of the element.
        line: usize,
    },
    /// An operator parameter was followed by something other than `,` or `)`.
    #[error("Warning on line {line}: Parameter of operator '{operator}' didn't end with a ')' or ',', found '{found}'.")]
    ParameterTerminator {
        /// The operator being parsed.
        operator: String,
        /// What was found instead.
        found:    String,
        /// The source line of the element.
        line:     usize,
    },
}
