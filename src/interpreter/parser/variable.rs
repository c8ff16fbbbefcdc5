use crate::{
    ast::{Attribute, VariableRef},
    error::ParseError,
    interpreter::{lexer::Token, parser::Parser},
};

impl Parser<'_, '_> {
    /// Parses a variable reference. The leading `$` has been consumed.
    ///
    /// `ns:sub:name` splits on `:`; the last segment is the name and the
    /// rest is the namespace. The parser's default namespace is prefixed to
    /// any namespace given here.
    pub(super) fn parse_variable(&mut self) -> VariableRef {
        let mut segments = vec![self.identifier()];
        while self.eat(&Token::Colon) {
            segments.push(self.identifier());
        }
        let name = segments.pop().unwrap_or_default();
        let explicit = (!segments.is_empty()).then(|| segments.join(":"));

        let namespace = match explicit {
            _ if self.namespace.is_empty() => explicit,
            Some(explicit) => Some(format!("{}:{explicit}", self.namespace)),
            None => Some(self.namespace.to_string()),
        };

        VariableRef { namespace,
                      name,
                      attributes: self.parse_attributes() }
    }

    /// Parses `.key`, `.0`, `.$expr` and `[...]` steps.
    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    attributes.push(self.parse_attribute());
                },
                Some(Token::LBracket) => {
                    self.advance();
                    attributes.push(self.parse_attribute());
                    if !self.eat(&Token::RBracket) {
                        self.warn(ParseError::UnclosedIndex { line: self.line });
                    }
                },
                _ => break,
            }
        }

        attributes
    }

    fn parse_attribute(&mut self) -> Attribute {
        match self.peek() {
            Some(Token::Dollar) => Attribute::SubExpression(Box::new(self.parse_expression())),
            Some(Token::Digits(digits)) => {
                let digits = digits.clone();
                self.advance();
                Attribute::Index(digits)
            },
            _ => Attribute::MapKey(self.identifier()),
        }
    }
}
