use std::rc::Rc;

use crate::{
    ast::Node,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Engine, MAX_INCLUDE_DEPTH},
        registry::{FunctionCall, OperatorHandler},
        store::VariableStore,
        value::core::Value,
    },
};

/// The state of one render: the engine, the namespace variables resolve in
/// and the include depth.
///
/// Function and operator handlers receive the context to evaluate their
/// parameters, read and bind variables, and render child nodes.
pub struct RenderContext<'e> {
    engine:    &'e mut Engine,
    namespace: String,
    depth:     usize,
}

impl<'e> RenderContext<'e> {
    pub(crate) fn new(engine: &'e mut Engine, namespace: String, depth: usize) -> Self {
        Self { engine,
               namespace,
               depth }
    }

    /// The namespace variables without an explicit namespace resolve in.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The engine's left delimiter.
    #[must_use]
    pub fn left_delimiter(&self) -> &str {
        &self.engine.left
    }

    /// The engine's right delimiter.
    #[must_use]
    pub fn right_delimiter(&self) -> &str {
        &self.engine.right
    }

    /// Returns the variable store.
    #[must_use]
    pub fn store(&self) -> &VariableStore {
        &self.engine.store
    }

    /// Returns the variable store for modification.
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.engine.store
    }

    /// Records a warning on behalf of the handler `name`.
    pub fn warning(&mut self, name: &str, error: RuntimeError) {
        self.engine.diagnostics.warning(name, error);
    }

    /// Records an error on behalf of the handler `name`.
    pub fn error(&mut self, name: &str, error: RuntimeError) {
        self.engine.diagnostics.error(name, error);
    }

    /// Records a problem with the severity the engine uses for its kind.
    pub(crate) fn report(&mut self, error: RuntimeError) {
        self.engine.report("", error);
    }

    /// Looks up an operator, recording why if there is none.
    pub(crate) fn operator_handler(&mut self, name: &str) -> Option<Rc<dyn OperatorHandler>> {
        self.engine
            .registry
            .operator(name)
            .map_err(|error| self.engine.report("", error))
            .ok()
    }

    /// Renders nodes in order and returns the output.
    pub fn render_nodes(&mut self, nodes: &[Node]) -> String {
        let mut output = String::new();
        for node in nodes {
            self.render_node(node, &mut output);
        }
        output
    }

    fn render_node(&mut self, node: &Node, output: &mut String) {
        match node {
            Node::Root { children } => output.push_str(&self.render_nodes(children)),
            Node::Text(text) => output.push_str(text),
            Node::Variable { expression, .. } => {
                let value = self.evaluate(expression);
                self.append_value(value, output);
            },
            Node::Function { name,
                             arguments,
                             children,
                             line, } => {
                let handler = match self.engine.registry.function(name) {
                    Ok(handler) => handler,
                    Err(error) => {
                        self.report(error);
                        return;
                    },
                };
                let call = FunctionCall { name,
                                          arguments,
                                          children,
                                          line: *line };
                output.push_str(&handler.process(&call, self));
            },
        }
    }

    /// Appends the display form of `value`. An object with template data is
    /// bound under its variable name and rendered through its template.
    fn append_value(&mut self, value: Value, output: &mut String) {
        let Value::Object(object) = &value else {
            output.push_str(&value.to_string());
            return;
        };
        let Some(data) = object.template_data() else {
            output.push_str(&value.to_string());
            return;
        };

        let namespace = self.namespace.clone();
        self.engine
            .store
            .set(&namespace, &data.variable_name, Value::Object(Rc::clone(object)));
        output.push_str(&self.include(&data.uri, namespace));
    }

    /// Renders the template at `uri` with variables resolving in
    /// `namespace`, and returns the output.
    ///
    /// A template that cannot be loaded is recorded as an error and
    /// contributes nothing. So does nesting deeper than
    /// [`MAX_INCLUDE_DEPTH`].
    pub fn include(&mut self, uri: &str, namespace: String) -> String {
        if self.depth >= MAX_INCLUDE_DEPTH {
            self.error("include",
                       RuntimeError::IncludeDepthExceeded { uri:   uri.to_string(),
                                                            depth: MAX_INCLUDE_DEPTH, });
            return String::new();
        }

        let tree = match self.engine.load(uri) {
            Ok(tree) => tree,
            Err(error) => {
                self.engine.diagnostics.error("include", error);
                return String::new();
            },
        };

        tracing::debug!(uri, namespace = %namespace, depth = self.depth + 1, "including template");
        RenderContext::new(self.engine, namespace, self.depth + 1).render_nodes(tree.nodes())
    }
}
