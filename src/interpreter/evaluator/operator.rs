use crate::{
    ast::Operator,
    interpreter::{evaluator::render::RenderContext, value::core::Value},
};

impl RenderContext<'_> {
    /// Feeds `value` through each operator in turn.
    ///
    /// An operator without a handler is recorded and skipped, leaving the
    /// value unchanged.
    pub(crate) fn apply_operators(&mut self, mut value: Value, operators: &[Operator]) -> Value {
        for operator in operators {
            if let Some(handler) = self.operator_handler(&operator.name) {
                value = handler.apply(&operator.name, value, &operator.arguments, self);
            }
        }
        value
    }
}
