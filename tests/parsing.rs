use std::{cell::Cell, rc::Rc};

use templar::{
    ast::{Attribute, Expression, Literal, Node, Number, Operand, Operator, VariableRef},
    error::{ParseError, TemplateError},
    interpreter::{
        builder::build,
        diagnostics::{Diagnostics, Severity},
        evaluator::{core::Engine, function::delimiter::DelimiterFunctions, render::RenderContext},
        lexer::{Token, tokenize},
        normalizer::normalize,
        parser::Parser,
        registry::{FunctionCall, FunctionHandler, Registry},
        scanner::{Element, ElementKind, scan},
    },
    util::num::parse_numeral,
};

fn kinds(elements: &[Element]) -> Vec<ElementKind> {
    elements.iter().map(|e| e.kind).collect()
}

fn parse_expression(text: &str) -> (Expression, String, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let (expression, rest) = {
        let mut parser = Parser::new(text, "", 1, &mut diagnostics);
        let expression = parser.parse_expression();
        (expression, parser.rest().to_string())
    };
    (expression, rest, diagnostics)
}

fn parse_errors(diagnostics: &Diagnostics) -> Vec<&ParseError> {
    diagnostics.entries()
               .iter()
               .filter_map(|d| match &d.error {
                   TemplateError::Parse(error) => Some(error),
                   _ => None,
               })
               .collect()
}

fn variable(namespace: Option<&str>, name: &str, attributes: Vec<Attribute>) -> Operand {
    Operand::Variable(VariableRef { namespace: namespace.map(ToString::to_string),
                                    name: name.to_string(),
                                    attributes })
}

#[test]
fn lexer_recognises_tokens() {
    let tokens: Vec<_> = tokenize("a-b=12 'x\\'y'").into_iter().map(|l| l.token).collect();
    assert_eq!(tokens,
               vec![Some(Token::Word("a-b".into())),
                    Some(Token::Equals),
                    Some(Token::Digits("12".into())),
                    Some(Token::Whitespace),
                    Some(Token::Str("x'y".into())),]);

    let junk = tokenize("#");
    assert_eq!(junk.len(), 1);
    assert_eq!(junk[0].token, None);
}

#[test]
fn scanner_splits_text_and_tags() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("a{$x}b{f p=1}c{/f}{g/}{* c *}", "{", "}", &mut diagnostics);

    assert_eq!(kinds(&elements),
               [ElementKind::Text,
                ElementKind::Variable,
                ElementKind::Text,
                ElementKind::NormalTag,
                ElementKind::Text,
                ElementKind::EndTag,
                ElementKind::SingleTag,
                ElementKind::Comment]);
    assert_eq!(elements[3].name(), "f");
    assert_eq!(elements[3].text, "f p=1");
    assert_eq!(elements[5].name(), "f");
    assert_eq!(elements[6].name(), "g");
    assert!(diagnostics.is_empty());
}

#[test]
fn scanner_classifies_expressions() {
    let mut diagnostics = Diagnostics::new();
    for body in ["{$x}", "{\"s\"}", "{'s'}", "{12}", "{-1}", "{count($x)}"] {
        let elements = scan(body, "{", "}", &mut diagnostics);
        assert_eq!(kinds(&elements), [ElementKind::Variable], "{body}");
    }

    let elements = scan("{-x}", "{", "}", &mut diagnostics);
    assert_eq!(kinds(&elements), [ElementKind::NormalTag]);
}

#[test]
fn scanner_unescapes_right_delimiter() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("{f p='a\\}b'}", "{", "}", &mut diagnostics);

    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].text, "f p='a}b'");
}

#[test]
fn scanner_counts_lines() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("a\nb\n{$x}\n{* \n *}{$y}", "{", "}", &mut diagnostics);

    let lines: Vec<_> = elements.iter().map(|e| e.line).collect();
    assert_eq!(lines, [1, 3, 3, 4, 5]);
}

#[test]
fn scanner_reports_unterminated_tags() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("ok\n{$x", "{", "}", &mut diagnostics);

    assert_eq!(elements.last().map(|e| e.text.as_str()), Some("{$x"));
    assert_eq!(parse_errors(&diagnostics), [&ParseError::UnterminatedTag { line: 2 }]);
}

#[test]
fn scanner_with_multi_character_delimiters() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("a{{$x}}b{{* c *}}", "{{", "}}", &mut diagnostics);

    assert_eq!(kinds(&elements),
               [ElementKind::Text, ElementKind::Variable, ElementKind::Text, ElementKind::Comment]);
    assert_eq!(elements[1].text, "$x");
}

#[test]
fn scanner_with_empty_delimiters_returns_text() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("a{$x}b", "", "", &mut diagnostics);

    assert_eq!(elements, [Element::text("a{$x}b", 1)]);
    assert!(scan("", "", "}", &mut diagnostics).is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn normalizer_strips_one_newline_around_tags() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("a\n\n{f/}\n\nb", "{", "}", &mut diagnostics);
    let normalized = normalize(&elements, "{", "}", |_| false, &mut diagnostics);

    let texts: Vec<_> = normalized.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["a\n", "f", "\nb"]);
}

#[test]
fn normalizer_drops_comments_and_empty_text() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("{f/}\n{* c *}x", "{", "}", &mut diagnostics);
    let normalized = normalize(&elements, "{", "}", |_| false, &mut diagnostics);

    assert_eq!(kinds(&normalized), [ElementKind::SingleTag, ElementKind::Text]);
    assert_eq!(normalized[1].text, "x");
}

#[test]
fn normalizer_captures_literal_blocks() {
    let mut diagnostics = Diagnostics::new();
    let elements = scan("{raw}{$x} {f a='\\}'/}{/f}{/raw}after", "{", "}", &mut diagnostics);
    let normalized = normalize(&elements, "{", "}", |name| name == "raw", &mut diagnostics);

    let texts: Vec<_> = normalized.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["{$x} {f a='\\}'/}{/f}", "after"]);
    assert!(normalized.iter().all(|e| e.kind == ElementKind::Text));
}

#[test]
fn numerals() {
    assert_eq!(parse_numeral("12"), Some(Number::Integer(12)));
    assert_eq!(parse_numeral("-3.5"), Some(Number::Real((-3.5).into())));
    assert_eq!(parse_numeral("-"), None);
    assert_eq!(parse_numeral("1.2.3"), None);
    assert_eq!(parse_numeral("abc"), None);
}

#[test]
fn number_parsing_stops_at_second_dot() {
    let (expression, rest, _) = parse_expression("12.3.4");
    assert_eq!(expression.operand,
               Operand::Literal(Literal::Number(Number::Real(12.3.into()))));
    assert_eq!(rest, ".4");

    let (expression, rest, _) = parse_expression("-8");
    assert_eq!(expression.operand, Operand::Literal(Literal::Number(Number::Integer(-8))));
    assert_eq!(rest, "");
}

#[test]
fn lone_minus_is_a_word() {
    let (expression, _, _) = parse_expression("-");
    assert_eq!(expression.operand, Operand::Text("-".into()));
}

#[test]
fn variables_with_namespaces_and_attributes() {
    let (expression, rest, diagnostics) = parse_expression("$a:b:name.key[0][$j].$i");

    assert_eq!(expression.operand,
               variable(Some("a:b"),
                        "name",
                        vec![Attribute::MapKey("key".into()),
                             Attribute::Index("0".into()),
                             Attribute::SubExpression(Box::new(Expression::new(variable(None, "j", vec![])))),
                             Attribute::SubExpression(Box::new(Expression::new(variable(None, "i", vec![]))))]));
    assert_eq!(rest, "");
    assert!(diagnostics.is_empty());
}

#[test]
fn default_namespace_is_prefixed() {
    let mut diagnostics = Diagnostics::new();

    let nested = Parser::new("$inner:x", "outer", 1, &mut diagnostics).parse_expression();
    assert_eq!(nested.operand, variable(Some("outer:inner"), "x", vec![]));

    let plain = Parser::new("$x", "outer", 1, &mut diagnostics).parse_expression();
    assert_eq!(plain.operand, variable(Some("outer"), "x", vec![]));
}

#[test]
fn unclosed_index_warns() {
    let (expression, _, diagnostics) = parse_expression("$x[0");

    assert_eq!(expression.operand, variable(None, "x", vec![Attribute::Index("0".into())]));
    assert_eq!(parse_errors(&diagnostics), [&ParseError::UnclosedIndex { line: 1 }]);
}

#[test]
fn operator_chains() {
    let (expression, _, diagnostics) = parse_expression("$x|f|g(1, 'a', $y)|h()");

    let names: Vec<_> = expression.operators.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["f", "g", "h"]);
    assert_eq!(expression.operators[1].arguments,
               [Expression::new(Operand::Literal(Literal::Number(Number::Integer(1)))),
                Expression::text("a"),
                Expression::new(variable(None, "y", vec![]))]);
    assert!(expression.operators[2].arguments.is_empty());
    assert!(diagnostics.is_empty());
}

#[test]
fn operator_call_without_value() {
    let (expression, _, _) = parse_expression("count($list)|default(0)");

    assert_eq!(expression.operand, Operand::Pipeline);
    assert_eq!(expression.operators.len(), 2);
    assert_eq!(expression.operators[0],
               Operator { name:      "count".into(),
                          arguments: vec![Expression::new(variable(None, "list", vec![]))], });
}

#[test]
fn empty_parameter_slots_are_null() {
    let (expression, _, _) = parse_expression("f(,'b')");
    assert_eq!(expression.operators[0].arguments, [Expression::null(), Expression::text("b")]);
}

#[test]
fn unterminated_parameter_list_warns() {
    let (expression, _, diagnostics) = parse_expression("f('a'");

    assert_eq!(expression.operators[0].arguments, [Expression::text("a")]);
    assert!(matches!(parse_errors(&diagnostics)[..],
                     [ParseError::ParameterTerminator { found, .. }] if found.is_empty()));

    let (_, _, diagnostics) = parse_expression("f('a' 'b')");
    assert!(parse_errors(&diagnostics).iter()
                                      .any(|e| matches!(e, ParseError::ParameterTerminator { found, .. } if found == "'")));
}

#[test]
fn unterminated_string_warns() {
    let (expression, _, diagnostics) = parse_expression("'open");

    assert_eq!(expression, Expression::text("open"));
    assert_eq!(parse_errors(&diagnostics), [&ParseError::UnterminatedString { line: 1 }]);
}

#[test]
fn tag_parameters() {
    let mut diagnostics = Diagnostics::new();
    let mut parser = Parser::new("section name=list loop=$items|count start='1'", "", 1, &mut diagnostics);
    let (name, arguments) = parser.parse_tag();

    assert_eq!(name, "section");
    let keys: Vec<_> = arguments.keys().map(String::as_str).collect();
    assert_eq!(keys, ["name", "loop", "start"]);
    assert_eq!(arguments["loop"].operators[0].name, "count");
    assert!(diagnostics.is_empty());
}

#[test]
fn bare_name_closing_a_tag_is_ignored() {
    let mut diagnostics = Diagnostics::new();
    let (name, arguments) = Parser::new("f a=1 b", "", 1, &mut diagnostics).parse_tag();

    assert_eq!(name, "f");
    let keys: Vec<_> = arguments.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a"]);
    assert!(diagnostics.is_empty());
}

#[test]
fn malformed_tag_parameters_are_errors() {
    let cases: [(&str, fn(&ParseError) -> bool); 2] =
        [("f a b=1", |e| matches!(e, ParseError::InvalidParameter { .. })),
         ("f a='x'b=1", |e| matches!(e, ParseError::ExpectedWhitespace { .. }))];

    for (body, check) in cases {
        let mut diagnostics = Diagnostics::new();
        Parser::new(body, "", 1, &mut diagnostics).parse_tag();

        let entry = diagnostics.entries().first();
        assert!(entry.is_some_and(|d| d.severity == Severity::Error), "{body}");
        assert!(parse_errors(&diagnostics).iter().any(|e| check(e)), "{body}");
    }
}

fn build_source(source: &str, registry: &mut Registry) -> (Node, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let elements = scan(source, "{", "}", &mut diagnostics);
    let elements = normalize(&elements, "{", "}", |name| name == "literal", &mut diagnostics);
    let root = build(&elements, registry, "", &mut diagnostics);
    (root, diagnostics)
}

#[test]
fn builder_nests_children() {
    let mut registry = Registry::new();
    let (root, diagnostics) = build_source("a{outer}b{inner}c{/inner}{/outer}d", &mut registry);

    assert!(diagnostics.is_empty());
    let top = root.children();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0], Node::Text("a".into()));
    assert_eq!(top[2], Node::Text("d".into()));

    let Node::Function { name, children, .. } = &top[1] else {
        panic!("Expected a function node, got {:?}", top[1]);
    };
    assert_eq!(name, "outer");
    assert_eq!(children.len(), 2);
    assert_eq!(children[1].children(), [Node::Text("c".into())]);
}

#[test]
fn builder_keeps_childless_tags_flat() {
    let mut registry = Registry::new();
    registry.register_functions(Rc::new(DelimiterFunctions));
    let (root, diagnostics) = build_source("{ldelim}x{rdelim}", &mut registry);

    assert!(diagnostics.is_empty());
    assert_eq!(root.children().len(), 3);
    assert!(root.children().iter().all(|n| n.children().is_empty()));
}

#[test]
fn builder_closes_mismatched_end_tag() {
    let mut registry = Registry::new();
    let (root, diagnostics) = build_source("{a}x{/b}y", &mut registry);

    assert_eq!(parse_errors(&diagnostics),
               [&ParseError::MismatchedEndTag { open:  "a".into(),
                                                close: "b".into(),
                                                line:  1, }]);
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.children()[1], Node::Text("y".into()));
}

#[test]
fn builder_reports_unclosed_and_unopened_tags() {
    let mut registry = Registry::new();

    let (root, diagnostics) = build_source("{a}\nx", &mut registry);
    assert_eq!(parse_errors(&diagnostics), [&ParseError::UnclosedTag { tag: "a".into(), line: 1 }]);
    assert_eq!(root.children()[0].children(), [Node::Text("x".into())]);

    let (_, diagnostics) = build_source("x{/a}", &mut registry);
    assert_eq!(parse_errors(&diagnostics), [&ParseError::UnopenedEndTag { tag: "a".into(), line: 1 }]);

    let (_, diagnostics) = build_source("{a}{/a extra}", &mut registry);
    assert_eq!(parse_errors(&diagnostics), [&ParseError::EndTagAttributes { tag: "a".into(), line: 1 }]);
}

#[test]
fn builder_matches_end_tags_by_identifier() {
    let mut registry = Registry::new();

    for source in ["{section}x{/section\t}y", "{section}x{/section\n}y", "{section\tp=1}x{/section}y"] {
        let (root, diagnostics) = build_source(source, &mut registry);
        assert!(diagnostics.is_empty(), "{source}: {diagnostics:?}");
        assert_eq!(root.children().len(), 2, "{source}");
        assert_eq!(root.children()[0].children(), [Node::Text("x".into())], "{source}");
    }
}

/// Owns children the first time it is asked and never again.
struct Fickle(Cell<bool>);

impl FunctionHandler for Fickle {
    fn function_names(&self) -> Vec<String> {
        vec!["fickle".to_string()]
    }

    fn has_children(&self, _name: &str) -> bool {
        !self.0.replace(true)
    }

    fn process(&self, _call: &FunctionCall<'_>, _context: &mut RenderContext<'_>) -> String {
        String::new()
    }
}

#[test]
fn builder_keeps_child_decision_of_opening_tag() {
    let mut registry = Registry::new();
    registry.register_functions(Rc::new(Fickle(Cell::new(false))));
    let (root, diagnostics) = build_source("{fickle}x{/fickle}y", &mut registry);

    assert_eq!(parse_errors(&diagnostics),
               [&ParseError::InconsistentChildren { tag: "fickle".into(), line: 1 }]);
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.children()[0].children(), [Node::Text("x".into())]);
}

#[test]
fn builder_reports_trailing_junk() {
    let mut registry = Registry::new();
    let (root, diagnostics) = build_source("{$x)}", &mut registry);

    assert!(matches!(root.children()[0], Node::Variable { .. }));
    assert_eq!(parse_errors(&diagnostics),
               [&ParseError::TrailingJunk { junk:   ")".into(),
                                            parsed: "$x".into(),
                                            line:   1, }]);
}

#[test]
fn parse_errors_never_abort() {
    let mut engine = Engine::with_standard_handlers();
    let tree = engine.parse("{a}{/b}{$x[}{f a}{'open}{/}{* x");

    assert!(!engine.diagnostics().is_empty());
    assert!(!tree.nodes().is_empty());
    assert!(engine.diagnostics()
                  .entries()
                  .iter()
                  .any(|d| d.severity == Severity::Warning));
}
