use indexmap::IndexMap;

use crate::{
    ast::Expression,
    error::ParseError,
    interpreter::{lexer::Token, parser::Parser},
};

impl Parser<'_, '_> {
    /// Parses a tag body: a name followed by whitespace separated
    /// `name=value` parameters.
    ///
    /// Parameter values are expressions. On a malformed parameter the
    /// problem is recorded as an error and the parameters read so far are
    /// returned. A name without `=` at the very end is ignored.
    ///
    /// # Returns
    /// The tag name and its parameters in source order. A repeated parameter
    /// keeps its first position and its last value.
    ///
    /// # Example
    /// ```
    /// use templar::{
    ///     ast::{Expression, Operand},
    ///     interpreter::{diagnostics::Diagnostics, parser::Parser},
    /// };
    ///
    /// let mut diagnostics = Diagnostics::new();
    /// let mut parser = Parser::new("include uri=\"a.tpl\" mode=raw", "", 1, &mut diagnostics);
    /// let (name, arguments) = parser.parse_tag();
    ///
    /// assert_eq!(name, "include");
    /// assert_eq!(arguments["uri"], Expression::text("a.tpl"));
    /// assert_eq!(arguments["mode"], Expression::new(Operand::Text("raw".into())));
    /// ```
    pub fn parse_tag(&mut self) -> (String, IndexMap<String, Expression>) {
        let tag = self.identifier();
        let mut arguments = IndexMap::new();

        while !self.is_at_end() {
            if !self.skip_whitespace() {
                self.diagnostics.error("",
                                       ParseError::ExpectedWhitespace { found: self.rest().to_string(),
                                                                        line:  self.line, });
                break;
            }
            if self.is_at_end() {
                break;
            }

            let name = self.identifier();
            // A bare name closing the tag is dropped.
            if self.is_at_end() {
                break;
            }
            if name.is_empty() || !self.eat(&Token::Equals) {
                self.diagnostics.error("",
                                       ParseError::InvalidParameter { tag:   tag.clone(),
                                                                      found: self.rest().to_string(),
                                                                      line:  self.line, });
                break;
            }

            let value = self.parse_expression();
            arguments.insert(name, value);
        }

        (tag, arguments)
    }
}
