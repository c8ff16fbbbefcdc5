use crate::interpreter::{
    evaluator::render::RenderContext,
    registry::{FunctionCall, FunctionHandler},
};

/// Implements `{ldelim}` and `{rdelim}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimiterFunctions;

impl FunctionHandler for DelimiterFunctions {
    fn function_names(&self) -> Vec<String> {
        vec!["ldelim".to_string(), "rdelim".to_string()]
    }

    fn child_tags(&self) -> Vec<(String, bool)> {
        vec![("ldelim".to_string(), false), ("rdelim".to_string(), false)]
    }

    fn process(&self, call: &FunctionCall<'_>, context: &mut RenderContext<'_>) -> String {
        match call.name {
            "ldelim" => context.left_delimiter().to_string(),
            _ => context.right_delimiter().to_string(),
        }
    }
}
