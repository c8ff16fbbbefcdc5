use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::render::RenderContext,
        registry::{FunctionCall, FunctionHandler},
    },
};

/// Implements `{include uri=... [name=...] [var=value ...]}`.
///
/// - `uri` (required): the template to render.
/// - `name`: a namespace for the included template, nested in the current
///   one. Without it the template renders in the current namespace.
/// - Every other parameter is evaluated and bound as a variable in that
///   namespace before rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeFunction;

impl FunctionHandler for IncludeFunction {
    fn function_names(&self) -> Vec<String> {
        vec!["include".to_string()]
    }

    fn child_tags(&self) -> Vec<(String, bool)> {
        vec![("include".to_string(), false)]
    }

    fn process(&self, call: &FunctionCall<'_>, context: &mut RenderContext<'_>) -> String {
        let Some(uri) = call.arguments.get("uri") else {
            context.error(call.name, RuntimeError::MissingParameter { parameter: "uri".to_string() });
            return String::new();
        };
        let uri = context.evaluate(uri).to_string();

        let namespace = match call.arguments.get("name") {
            Some(name) => {
                let name = context.evaluate(name).to_string();
                context.resolve_namespace(Some(&name))
            },
            None => context.namespace().to_string(),
        };

        for (key, expression) in call.arguments {
            if key == "uri" || key == "name" {
                continue;
            }
            let value = context.evaluate(expression);
            context.store_mut().set(&namespace, key, value);
        }

        context.include(&uri, namespace)
    }
}
