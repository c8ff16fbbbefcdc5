use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    ast::{Expression, Node},
    interpreter::{evaluator::render::RenderContext, value::core::Value},
};

/// A function tag being rendered.
#[derive(Debug, Clone, Copy)]
pub struct FunctionCall<'t> {
    /// The tag name.
    pub name:      &'t str,
    /// The tag parameters, unevaluated.
    pub arguments: &'t IndexMap<String, Expression>,
    /// The nodes between the opening and end tag.
    pub children:  &'t [Node],
    /// Source line of the tag.
    pub line:      usize,
}

/// Implements one or more function tags.
pub trait FunctionHandler {
    /// The tag names this handler serves.
    fn function_names(&self) -> Vec<String>;

    /// Static child ownership flags, by tag name. Flags registered here
    /// take precedence over [`has_children`](Self::has_children).
    fn child_tags(&self) -> Vec<(String, bool)> {
        Vec::new()
    }

    /// Returns `true` if the tag `name` owns the nodes up to its end tag.
    fn has_children(&self, _name: &str) -> bool {
        false
    }

    /// Renders the tag and returns its output.
    fn process(&self, call: &FunctionCall<'_>, context: &mut RenderContext<'_>) -> String;
}

/// Implements one or more operators.
pub trait OperatorHandler {
    /// The operator names this handler serves.
    fn operator_names(&self) -> Vec<String>;

    /// Applies the operator `name` to `value`.
    ///
    /// `arguments` are the parameter expressions, unevaluated; evaluate them
    /// through `context` as needed.
    fn apply(&self,
             name: &str,
             value: Value,
             arguments: &[Expression],
             context: &mut RenderContext<'_>)
             -> Value;
}

/// A handler produced by a loader.
#[derive(Clone)]
pub enum Handler {
    /// A function tag handler.
    Function(Rc<dyn FunctionHandler>),
    /// An operator handler.
    Operator(Rc<dyn OperatorHandler>),
}

/// Creates a handler on demand. Receives the descriptor's class parameter.
pub type Factory = Rc<dyn Fn(Option<&str>) -> Option<Handler>>;
