use crate::{
    ast::{Expression, Operator},
    error::ParseError,
    interpreter::{lexer::Token, parser::Parser},
};

impl Parser<'_, '_> {
    /// Parses a `|name(args)|name...` chain.
    pub(super) fn parse_operators(&mut self) -> Vec<Operator> {
        let mut operators = Vec::new();
        while self.eat(&Token::Pipe) {
            let name = self.identifier();
            operators.push(self.parse_invocation(name));
        }
        operators
    }

    /// Parses a chain that starts with an operator call instead of a value,
    /// e.g. `count($list)|default(0)`. `first` is the already consumed name.
    pub(super) fn parse_operator_list(&mut self, first: String) -> Vec<Operator> {
        let mut operators = vec![self.parse_invocation(first)];
        operators.extend(self.parse_operators());
        operators
    }

    fn parse_invocation(&mut self, name: String) -> Operator {
        let arguments = if self.eat(&Token::LParen) {
            self.parse_arguments(&name)
        } else {
            Vec::new()
        };
        Operator { name, arguments }
    }

    /// Parses a parameter list. The opening `(` has been consumed.
    ///
    /// Empty slots such as the middle of `f(a,,b)` become null expressions.
    /// A missing `)` or an unexpected token is reported and skipped.
    fn parse_arguments(&mut self, operator: &str) -> Vec<Expression> {
        let mut arguments = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                self.warn(ParseError::ParameterTerminator { operator: operator.to_string(),
                                                            found:    String::new(),
                                                            line:     self.line, });
                break;
            }

            match self.peek() {
                Some(Token::RParen) => {
                    self.advance();
                    break;
                },
                Some(Token::Comma) => {
                    self.advance();
                    arguments.push(Expression::null());
                },
                _ => {
                    arguments.push(self.parse_expression());
                    self.skip_whitespace();

                    if self.eat(&Token::Comma)
                       || self.is_at_end()
                       || self.peek() == Some(&Token::RParen)
                    {
                        continue;
                    }

                    let found = self.rest().chars().next().map(String::from).unwrap_or_default();
                    self.warn(ParseError::ParameterTerminator { operator: operator.to_string(),
                                                                found,
                                                                line: self.line });
                    self.advance();
                },
            }
        }

        arguments
    }
}
