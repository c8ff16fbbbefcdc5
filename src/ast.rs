use std::{fmt, time::SystemTime};

use indexmap::IndexMap;
use ordered_float::OrderedFloat;

/// A numeric literal.
///
/// Numerals without a decimal point are integers; everything else is real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    /// A 64-bit signed integer literal.
    Integer(i64),
    /// A 64-bit floating-point literal.
    Real(OrderedFloat<f64>),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(r) => write!(f, "{}", r.0),
        }
    }
}

/// A literal value written directly in template source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// A quoted string, with escapes already removed.
    Text(String),
    /// A numeral.
    Number(Number),
    /// The empty value, produced by empty operator parameter slots.
    Null,
}

/// One step of an attribute chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// `.name` or `[name]`.
    MapKey(String),
    /// `.3` or `[3]`.
    Index(String),
    /// `[$key]`, or `.$key`: the key is computed at render time.
    SubExpression(Box<Expression>),
}

/// A reference to a variable in the store.
///
/// `$outer:inner:name.attr[0]` has the namespace `outer:inner`, the name
/// `name` and two attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableRef {
    /// The namespace written in the source, joined by `:`. `None` when the
    /// variable was written without one and no default namespace applied.
    pub namespace:  Option<String>,
    /// The variable name.
    pub name:       String,
    /// The attribute chain, applied left to right.
    pub attributes: Vec<Attribute>,
}

/// One operator invocation of a chain, e.g. `|l10n(date)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator {
    /// The operator name.
    pub name:      String,
    /// The parameter expressions, unevaluated.
    pub arguments: Vec<Expression>,
}

/// The base value of an expression, before any operators run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A string or numeric literal.
    Literal(Literal),
    /// A variable reference.
    Variable(VariableRef),
    /// A bare word. Its meaning is up to the function receiving it.
    Text(String),
    /// No base value: the expression starts directly with an operator
    /// invocation such as `count($list)`, which receives an empty value.
    Pipeline,
}

/// A parsed expression: a base operand followed by an operator chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expression {
    /// The value the chain starts from.
    pub operand:   Operand,
    /// Operators applied in order to the operand's value.
    pub operators: Vec<Operator>,
}

impl Expression {
    /// Creates an expression with no operators.
    #[must_use]
    pub const fn new(operand: Operand) -> Self {
        Self { operand,
               operators: Vec::new() }
    }

    /// The empty value, as produced by `f(,x)`.
    #[must_use]
    pub const fn null() -> Self {
        Self::new(Operand::Literal(Literal::Null))
    }

    /// A quoted text literal.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Operand::Literal(Literal::Text(text.into())))
    }
}

/// A node of a parsed template tree.
///
/// Nodes own their children; there are no parent links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// The top of a tree.
    Root {
        /// Top-level nodes in source order.
        children: Vec<Self>,
    },
    /// Literal text copied to the output.
    Text(String),
    /// An inline expression such as `{$name|upcase}`.
    Variable {
        /// The expression to evaluate.
        expression: Expression,
        /// Line number in the source template.
        line:       usize,
    },
    /// A function tag such as `{include uri="x.tpl"/}`.
    Function {
        /// The tag name.
        name:      String,
        /// Tag parameters in source order.
        arguments: IndexMap<String, Expression>,
        /// The nodes between the opening and the end tag, empty for tags that
        /// do not own children.
        children:  Vec<Self>,
        /// Line number in the source template.
        line:      usize,
    },
}

impl Node {
    /// Returns the child nodes of a root or function node.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Root { children } | Self::Function { children, .. } => children,
            Self::Text(_) | Self::Variable { .. } => &[],
        }
    }
}

/// A parsed template, ready to be rendered any number of times.
///
/// A tree is immutable once built, so it can be shared between renders and
/// threads through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    /// The root node.
    pub root:            Node,
    /// Where the source came from, for diagnostics.
    pub source:          String,
    /// The left delimiter the tree was parsed with.
    pub left_delimiter:  String,
    /// The right delimiter the tree was parsed with.
    pub right_delimiter: String,
    /// When the source was last modified, if the loader knew.
    pub modified:        Option<SystemTime>,
}

impl Tree {
    /// Creates a tree without a modification time.
    #[must_use]
    pub fn new(root: Node, source: &str, left_delimiter: &str, right_delimiter: &str) -> Self {
        Self { root,
               source: source.to_string(),
               left_delimiter: left_delimiter.to_string(),
               right_delimiter: right_delimiter.to_string(),
               modified: None }
    }

    /// Returns the top-level nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        self.root.children()
    }
}
