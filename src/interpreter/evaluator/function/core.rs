use std::{fmt, rc::Rc};

use crate::{
    ast::Expression,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            function::{count, default, delimiter::DelimiterFunctions, include::IncludeFunction, text},
            render::RenderContext,
        },
        registry::{OperatorHandler, Registry},
        value::core::Value,
    },
};

/// Type alias for builtin operator implementations.
///
/// A builtin receives the value flowing through the chain and its evaluated
/// parameters, and returns the new value.
type OperatorFn = fn(Value, &[Value]) -> Value;

/// Specifies the allowed number of parameters for a builtin operator.
///
/// - `Exact(n)` means the operator must receive exactly `n` parameters.
/// - `AtLeast(n)` means the operator accepts `n` or more.
/// - `Unary` means no parameters in a chain. In call form, `count($x)`, the
///   single parameter is the value.
#[derive(Clone, Copy)]
enum Arity {
    Exact(usize),
    AtLeast(usize),
    Unary,
}

impl Arity {
    /// Tests whether the given parameter count satisfies this arity.
    const fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::AtLeast(m) => n >= m,
            Self::Unary => n == 0,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::Unary => write!(f, "0"),
        }
    }
}

/// Defines builtin operators by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a function pointer implementing the operator.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_OPERATORS` (public list of builtin names).
macro_rules! builtin_operators {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  OperatorFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of the operators every standard engine provides.
        pub const BUILTIN_OPERATORS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_operators! {
    "upcase"   => { arity: Arity::Unary,      func: text::upcase },
    "downcase" => { arity: Arity::Unary,      func: text::downcase },
    "reverse"  => { arity: Arity::Unary,      func: text::reverse },
    "identity" => { arity: Arity::Unary,      func: text::identity },
    "count"    => { arity: Arity::Unary,      func: count::count },
    "default"  => { arity: Arity::AtLeast(1), func: default::default },
}

/// The builtin operator table as an [`OperatorHandler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinOperators;

impl OperatorHandler for BuiltinOperators {
    fn operator_names(&self) -> Vec<String> {
        BUILTIN_OPERATORS.iter().map(ToString::to_string).collect()
    }

    /// Checks the parameter count, evaluates the parameters and runs the
    /// builtin. A wrong parameter count leaves the value unchanged.
    ///
    /// A unary builtin called with one parameter and no incoming value takes
    /// that parameter as its value.
    fn apply(&self,
             name: &str,
             value: Value,
             arguments: &[Expression],
             context: &mut RenderContext<'_>)
             -> Value {
        let Some(builtin) = BUILTIN_TABLE.iter().find(|b| b.name == name) else {
            context.warning(name, RuntimeError::UnregisteredOperator { name: name.to_string() });
            return value;
        };

        let (value, arguments) = match (builtin.arity, arguments) {
            (Arity::Unary, [operand]) if value.is_null() => (context.evaluate(operand), &[][..]),
            _ => (value, arguments),
        };

        if !builtin.arity.check(arguments.len()) {
            context.warning(name,
                            RuntimeError::ArgumentCountMismatch { name:     name.to_string(),
                                                                  expected: builtin.arity.to_string(),
                                                                  found:    arguments.len(), });
            return value;
        }

        let parameters: Vec<Value> = arguments.iter().map(|a| context.evaluate(a)).collect();
        (builtin.func)(value, &parameters)
    }
}

/// Registers the builtin operators and the `ldelim`, `rdelim` and `include`
/// function tags.
pub fn register_standard_handlers(registry: &mut Registry) {
    registry.register_operators(Rc::new(BuiltinOperators));
    registry.register_functions(Rc::new(DelimiterFunctions));
    registry.register_functions(Rc::new(IncludeFunction));
}
