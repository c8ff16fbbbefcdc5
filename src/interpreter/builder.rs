use std::mem;

use crate::{
    ast::Node,
    error::ParseError,
    interpreter::{
        diagnostics::Diagnostics,
        parser::Parser,
        registry::Registry,
        scanner::{Element, ElementKind},
    },
};

/// An open function tag waiting for its end tag.
struct Frame {
    node: usize,
    tag:  String,
    line: usize,
}

/// Nodes under construction, linked by index.
struct Arena {
    nodes:    Vec<Node>,
    children: Vec<Vec<usize>>,
}

impl Arena {
    fn new() -> Self {
        Self { nodes:    vec![Node::Root { children: Vec::new() }],
               children: vec![Vec::new()], }
    }

    fn push(&mut self, parent: usize, node: Node) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.children[parent].push(index);
        index
    }

    /// Moves the nodes into their parents, bottom-up from `index`.
    fn assemble(&mut self, index: usize) -> Node {
        let child_indices = mem::take(&mut self.children[index]);
        let assembled: Vec<Node> = child_indices.into_iter().map(|i| self.assemble(i)).collect();
        let mut node = mem::replace(&mut self.nodes[index], Node::Text(String::new()));

        if let Node::Root { children } | Node::Function { children, .. } = &mut node {
            *children = assembled;
        }
        node
    }
}

/// Builds a node tree from normalized elements.
///
/// This is the third parse pass. Function tags that own children open a
/// scope that lasts until the matching end tag. Problems with end tags are
/// reported and the builder keeps going:
///
/// - an end tag for a tag that does not own children is ignored,
/// - an end tag with nothing open is ignored,
/// - an end tag that does not match the innermost open tag closes it anyway,
/// - tags still open at the end of input are closed.
///
/// Child ownership is decided once, at the opening tag. If the end tag's
/// lookup disagrees while that tag is the innermost one, the disagreement is
/// reported and the scope is closed.
///
/// # Parameters
/// - `elements`: Output of the second pass.
/// - `registry`: Decides which tags own children.
/// - `namespace`: Default namespace for variable references.
/// - `diagnostics`: Receives parse problems.
///
/// # Returns
/// A [`Node::Root`] holding the top-level nodes.
pub fn build(elements: &[Element],
             registry: &mut Registry,
             namespace: &str,
             diagnostics: &mut Diagnostics)
             -> Node {
    let mut arena = Arena::new();
    let mut stack: Vec<Frame> = Vec::new();

    for element in elements {
        let parent = stack.last().map_or(0, |frame| frame.node);

        match element.kind {
            ElementKind::Text => {
                arena.push(parent, Node::Text(element.text.clone()));
            },
            ElementKind::Comment => {},
            ElementKind::Variable => {
                let mut parser = Parser::new(&element.text, namespace, element.line, diagnostics);
                let expression = parser.parse_expression();
                let junk = (!parser.is_at_end()).then(|| {
                                                    (parser.rest().to_string(), parser.parsed().to_string())
                                                });

                if let Some((junk, parsed)) = junk {
                    diagnostics.warning("",
                                        ParseError::TrailingJunk { junk,
                                                                   parsed,
                                                                   line: element.line });
                }
                arena.push(parent,
                           Node::Variable { expression,
                                            line: element.line });
            },
            ElementKind::SingleTag | ElementKind::NormalTag => {
                let (name, arguments) =
                    Parser::new(&element.text, namespace, element.line, diagnostics).parse_tag();
                let owns_children =
                    element.kind == ElementKind::NormalTag && owns_children(registry, &name, diagnostics);

                let index = arena.push(parent,
                                       Node::Function { name: name.clone(),
                                                        arguments,
                                                        children: Vec::new(),
                                                        line: element.line });
                if owns_children {
                    stack.push(Frame { node: index,
                                       tag:  name,
                                       line: element.line, });
                }
            },
            ElementKind::EndTag => close(element, registry, &mut stack, diagnostics),
        }
    }

    while let Some(frame) = stack.pop() {
        diagnostics.warning("",
                            ParseError::UnclosedTag { tag:  frame.tag,
                                                      line: frame.line, });
    }

    arena.assemble(0)
}

/// Handles an end tag.
fn close(element: &Element, registry: &mut Registry, stack: &mut Vec<Frame>, diagnostics: &mut Diagnostics) {
    let line = element.line;
    let (name, has_attributes) = {
        let mut parser = Parser::new(&element.text, "", line, diagnostics);
        let name = parser.identifier();
        (name, !parser.rest().trim().is_empty())
    };
    let name = name.as_str();

    if has_attributes {
        diagnostics.warning("",
                            ParseError::EndTagAttributes { tag: name.to_string(),
                                                           line });
    }

    if !owns_children(registry, name, diagnostics) {
        if stack.last().is_some_and(|frame| frame.tag == name) {
            diagnostics.warning("",
                                ParseError::InconsistentChildren { tag: name.to_string(),
                                                                   line });
            stack.pop();
        } else {
            diagnostics.warning("",
                                ParseError::EndTagWithoutChildren { tag: name.to_string(),
                                                                    line });
        }
        return;
    }

    match stack.pop() {
        None => {
            diagnostics.warning("",
                                ParseError::UnopenedEndTag { tag: name.to_string(),
                                                             line });
        },
        Some(frame) if frame.tag != name => {
            diagnostics.warning("",
                                ParseError::MismatchedEndTag { open: frame.tag,
                                                               close: name.to_string(),
                                                               line });
        },
        Some(_) => {},
    }
}

fn owns_children(registry: &mut Registry, name: &str, diagnostics: &mut Diagnostics) -> bool {
    registry.has_children(name).unwrap_or_else(|error| {
                                   diagnostics.error("", error);
                                   true
                               })
}
