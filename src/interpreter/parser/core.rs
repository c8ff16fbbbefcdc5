use crate::{
    ast::{Expression, Literal, Number, Operand},
    error::ParseError,
    interpreter::{
        diagnostics::Diagnostics,
        lexer::{Lexeme, Token, tokenize},
    },
    util::num::parse_numeral,
};

/// A recursive-descent parser over one tag or variable body.
///
/// The parser never fails. Malformed input is reported to the diagnostics
/// sink and parsing stops or skips ahead; callers check
/// [`Parser::is_at_end`] to find leftovers.
pub struct Parser<'s, 'd> {
    pub(super) body:        &'s str,
    pub(super) lexemes:     Vec<Lexeme>,
    pub(super) pos:         usize,
    /// Namespace prefixed to every variable reference.
    pub(super) namespace:   &'s str,
    pub(super) line:        usize,
    pub(super) diagnostics: &'d mut Diagnostics,
}

impl<'s, 'd> Parser<'s, 'd> {
    /// Creates a parser for `body`.
    ///
    /// # Parameters
    /// - `body`: The text between the delimiters.
    /// - `namespace`: Default namespace for variable references, usually
    ///   empty.
    /// - `line`: Source line of the element, for diagnostics.
    /// - `diagnostics`: Receives parse warnings.
    pub fn new(body: &'s str,
               namespace: &'s str,
               line: usize,
               diagnostics: &'d mut Diagnostics)
               -> Self {
        Self { body,
               lexemes: tokenize(body),
               pos: 0,
               namespace,
               line,
               diagnostics }
    }

    /// Returns `true` once every token has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    /// Byte offset of the next unconsumed token.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.lexemes.get(self.pos).map_or(self.body.len(), |l| l.span.start)
    }

    /// The unconsumed part of the body.
    #[must_use]
    pub fn rest(&self) -> &'s str {
        &self.body[self.offset()..]
    }

    /// The consumed part of the body.
    #[must_use]
    pub fn parsed(&self) -> &'s str {
        &self.body[..self.offset()]
    }

    /// Peeks at the next token. Returns `None` at the end and for
    /// unrecognised characters.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    pub(super) fn peek_at(&self, n: usize) -> Option<&Token> {
        self.lexemes.get(self.pos + n).and_then(|l| l.token.as_ref())
    }

    pub(super) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Consumes the next token if it equals `token`.
    pub(super) fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skips whitespace, returning `true` if there was any.
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek() == Some(&Token::Whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Consumes an identifier: a run of letters, digits, `_` and `-`.
    ///
    /// Returns an empty string when the next token cannot start one.
    pub fn identifier(&mut self) -> String {
        let start = self.offset();
        while matches!(self.peek(),
                       Some(Token::Word(_) | Token::Digits(_) | Token::Minus))
        {
            self.pos += 1;
        }
        self.body[start..self.offset()].to_string()
    }

    /// Parses an expression: a primary operand and an optional operator
    /// chain.
    ///
    /// Grammar:
    /// ```text
    /// expression := primary ("|" operator)*
    /// primary    := "$" variable | string | number | word "(" args ")" | word
    /// ```
    ///
    /// A word followed by `(` is an operator call without a base value, e.g.
    /// `count($list)`; its operators receive an empty value. Any other word
    /// is kept as bare text. Parsing stops at whitespace.
    ///
    /// # Example
    /// ```
    /// use templar::{
    ///     ast::{Literal, Number, Operand},
    ///     interpreter::{diagnostics::Diagnostics, parser::Parser},
    /// };
    ///
    /// let mut diagnostics = Diagnostics::new();
    /// let mut parser = Parser::new("12.3.4", "", 1, &mut diagnostics);
    /// let expression = parser.parse_expression();
    ///
    /// assert_eq!(expression.operand,
    ///            Operand::Literal(Literal::Number(Number::Real(12.3.into()))));
    /// assert_eq!(parser.rest(), ".4");
    /// ```
    pub fn parse_expression(&mut self) -> Expression {
        let operand = match self.peek() {
            Some(Token::Dollar) => {
                self.advance();
                Operand::Variable(self.parse_variable())
            },
            Some(Token::Str(text)) => {
                let text = text.clone();
                self.advance();
                Operand::Literal(Literal::Text(text))
            },
            Some(Token::OpenStr(text)) => {
                let text = text.clone();
                self.advance();
                self.diagnostics
                    .warning("", ParseError::UnterminatedString { line: self.line });
                Operand::Literal(Literal::Text(text))
            },
            Some(Token::Digits(_)) => Operand::Literal(Literal::Number(self.parse_number())),
            Some(Token::Minus) if matches!(self.peek_at(1), Some(Token::Digits(_))) => {
                Operand::Literal(Literal::Number(self.parse_number()))
            },
            _ => {
                let word = self.identifier();
                if !word.is_empty() && self.peek() == Some(&Token::LParen) {
                    return Expression { operand:   Operand::Pipeline,
                                        operators: self.parse_operator_list(word), };
                }
                Operand::Text(word)
            },
        };

        let operators = if self.peek() == Some(&Token::Pipe) {
            self.parse_operators()
        } else {
            Vec::new()
        };

        Expression { operand, operators }
    }

    /// Parses a numeral: an optional `-`, digits, and at most one `.` with
    /// optional digits after it. A second `.` ends the numeral.
    fn parse_number(&mut self) -> Number {
        let start = self.offset();
        self.eat(&Token::Minus);
        self.advance();
        if self.eat(&Token::Dot) && matches!(self.peek(), Some(Token::Digits(_))) {
            self.advance();
        }
        // Digits with an optional sign and fraction always parse.
        parse_numeral(&self.body[start..self.offset()]).unwrap_or(Number::Integer(0))
    }

    /// Records a parse problem as a warning.
    pub(super) fn warn(&mut self, error: ParseError) {
        self.diagnostics.warning("", error);
    }
}

impl Expression {
    /// Parses a complete expression from text, ignoring leftovers.
    ///
    /// Convenience for handlers and tests; the tree builder uses [`Parser`]
    /// directly so it can report trailing junk.
    pub fn parse(text: &str, diagnostics: &mut Diagnostics) -> Self {
        Parser::new(text, "", 1, diagnostics).parse_expression()
    }
}
