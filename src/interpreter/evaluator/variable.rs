use crate::{
    ast::{Attribute, Expression, Operand, VariableRef},
    error::RuntimeError,
    interpreter::{
        evaluator::render::RenderContext,
        value::{attribute::step, core::Value},
    },
};

impl RenderContext<'_> {
    /// Evaluates an expression: its operand, then its operator chain.
    ///
    /// Never fails. Problems are recorded and the offending part evaluates
    /// to [`Value::Null`].
    pub fn evaluate(&mut self, expression: &Expression) -> Value {
        let value = match &expression.operand {
            Operand::Literal(literal) => literal.into(),
            Operand::Text(text) => text.as_str().into(),
            Operand::Variable(variable) => self.lookup(variable),
            Operand::Pipeline => Value::Null,
        };

        self.apply_operators(value, &expression.operators)
    }

    /// Resolves the namespace of a variable reference against the current
    /// namespace.
    ///
    /// # Example
    /// A reference to `$inner:x` rendered in namespace `outer` reads
    /// `outer:inner`; `$x` reads `outer`.
    #[must_use]
    pub fn resolve_namespace(&self, explicit: Option<&str>) -> String {
        match explicit {
            None => self.namespace().to_string(),
            Some(explicit) if self.namespace().is_empty() => explicit.to_string(),
            Some(explicit) => format!("{}:{explicit}", self.namespace()),
        }
    }

    /// Reads a variable and walks its attribute chain.
    fn lookup(&mut self, variable: &VariableRef) -> Value {
        let namespace = self.resolve_namespace(variable.namespace.as_deref());

        let Some(mut value) = self.store().get(&namespace, &variable.name).cloned() else {
            self.report(RuntimeError::UndefinedVariable { namespace,
                                                          name: variable.name.clone() });
            return Value::Null;
        };

        for attribute in &variable.attributes {
            let key = match attribute {
                Attribute::MapKey(key) | Attribute::Index(key) => Value::Text(key.clone()),
                Attribute::SubExpression(expression) => {
                    let key = self.evaluate(expression);
                    if key.is_null() {
                        return Value::Null;
                    }
                    key
                },
            };

            value = match step(&value, &key) {
                Ok(next) => next,
                Err(error) => {
                    self.report(error);
                    return Value::Null;
                },
            };
        }

        value
    }
}
