use std::ops::Range;

use logos::Logos;

/// Represents a lexical token of a tag or variable body.
///
/// The scanner cuts template text into elements first; this lexer only ever
/// sees what is between one pair of delimiters, e.g. `section name=abc
/// loop=$list` or `$user.name|upcase`. Whitespace is a token of its own
/// because it separates tag parameters and terminates expressions.
#[derive(Logos, Debug, PartialEq, Eq, Clone)]
pub enum Token {
    /// `$`
    #[token("$")]
    Dollar,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `|`
    #[token("|")]
    Pipe,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
    /// `=`
    #[token("=")]
    Equals,
    /// `-`, either a numeral sign or part of an identifier.
    #[token("-")]
    Minus,
    /// A run of decimal digits such as `42`.
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    Digits(String),
    /// A word such as `section`, `l10n` or `section-else`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice().to_string())]
    Word(String),
    /// A closed string literal such as `"abc"` or `'abc'`, unescaped.
    #[regex(r#""([^"\\]|\\.)*""#, unquote)]
    #[regex(r"'([^'\\]|\\.)*'", unquote)]
    Str(String),
    /// A string literal that runs to the end of the body, unescaped.
    #[regex(r#""([^"\\]|\\.)*"#, unquote_open)]
    #[regex(r"'([^'\\]|\\.)*", unquote_open)]
    OpenStr(String),
    /// Spaces, tabs and line breaks.
    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// A token together with its byte range in the body.
///
/// `token` is `None` for characters the lexer does not recognise; the
/// parser treats them as junk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    /// The token, if the characters formed one.
    pub token: Option<Token>,
    /// Byte range of the token in the body.
    pub span:  Range<usize>,
}

/// Splits a tag or variable body into lexemes.
///
/// Unrecognised characters become lexemes without a token instead of
/// stopping the lexer, so the parser can report them as junk.
///
/// # Example
/// ```
/// use templar::interpreter::lexer::{Token, tokenize};
///
/// let lexemes = tokenize("$a|upcase");
/// let tokens: Vec<_> = lexemes.into_iter().map(|l| l.token).collect();
///
/// assert_eq!(tokens,
///            vec![Some(Token::Dollar),
///                 Some(Token::Word("a".into())),
///                 Some(Token::Pipe),
///                 Some(Token::Word("upcase".into())),]);
/// ```
#[must_use]
pub fn tokenize(body: &str) -> Vec<Lexeme> {
    let mut lexer = Token::lexer(body);
    let mut lexemes = Vec::new();

    while let Some(token) = lexer.next() {
        lexemes.push(Lexeme { token: token.ok(),
                              span:  lexer.span(), });
    }

    lexemes
}

/// Strips the quotes of a closed string literal and removes escapes.
fn unquote(lex: &logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

/// Strips the opening quote of an unterminated string literal and removes
/// escapes.
fn unquote_open(lex: &logos::Lexer<Token>) -> String {
    unescape(&lex.slice()[1..])
}

/// Removes backslash escapes: `\x` becomes `x`.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }

    out
}
