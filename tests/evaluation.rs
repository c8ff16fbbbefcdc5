use std::{cell::Cell, fs, rc::Rc, sync::Arc, thread};

use indexmap::IndexMap;
use templar::{
    ast::Expression,
    config::EngineConfig,
    error::{ConfigError, ResourceError, RuntimeError, TemplateError},
    interpreter::{
        diagnostics::{Diagnostic, Severity},
        evaluator::{
            core::{Engine, MAX_INCLUDE_DEPTH},
            render::RenderContext,
        },
        registry::{AutoloadDefinition, FunctionCall, FunctionHandler, Handler, OperatorHandler},
        resource::{
            cache::TreeCache,
            loader::{FileLoader, MemoryLoader, ResourceLoader, Resources},
        },
        store::VariableStore,
        value::{
            attribute::{resolve, step},
            core::Value,
            object::{AttributeObject, TemplateData},
        },
    },
};

#[derive(Debug)]
struct Person {
    first: String,
    last:  String,
}

impl AttributeObject for Person {
    fn type_name(&self) -> &str {
        "person"
    }

    fn supports_attributes(&self) -> bool {
        true
    }

    fn has_attribute(&self, key: &str) -> bool {
        matches!(key, "first" | "last")
    }

    fn get_attribute(&self, key: &str) -> Value {
        match key {
            "first" => self.first.as_str().into(),
            "last" => self.last.as_str().into(),
            _ => Value::Null,
        }
    }
}

#[derive(Debug)]
struct Opaque;

impl AttributeObject for Opaque {
    fn type_name(&self) -> &str {
        "opaque"
    }
}

/// Renders itself through `card.tpl`.
#[derive(Debug)]
struct Card {
    title: String,
}

impl AttributeObject for Card {
    fn type_name(&self) -> &str {
        "card"
    }

    fn supports_attributes(&self) -> bool {
        true
    }

    fn has_attribute(&self, key: &str) -> bool {
        key == "title"
    }

    fn get_attribute(&self, _key: &str) -> Value {
        self.title.as_str().into()
    }

    fn template_data(&self) -> Option<TemplateData> {
        Some(TemplateData { uri:           "card.tpl".to_string(),
                            variable_name: "card".to_string(), })
    }
}

/// Appends `!` and upcases.
struct Shout;

impl OperatorHandler for Shout {
    fn operator_names(&self) -> Vec<String> {
        vec!["shout".to_string()]
    }

    fn apply(&self, _name: &str, value: Value, _arguments: &[Expression], _context: &mut RenderContext<'_>) -> Value {
        format!("{value}!").to_uppercase().into()
    }
}

/// Appends a fixed suffix.
struct Suffix(String);

impl OperatorHandler for Suffix {
    fn operator_names(&self) -> Vec<String> {
        vec!["exclaim".to_string()]
    }

    fn apply(&self, _name: &str, value: Value, _arguments: &[Expression], _context: &mut RenderContext<'_>) -> Value {
        format!("{value}{}", self.0).into()
    }
}

/// `{repeat times=n}...{/repeat}`
struct Repeat;

impl FunctionHandler for Repeat {
    fn function_names(&self) -> Vec<String> {
        vec!["repeat".to_string()]
    }

    fn child_tags(&self) -> Vec<(String, bool)> {
        vec![("repeat".to_string(), true)]
    }

    fn process(&self, call: &FunctionCall<'_>, context: &mut RenderContext<'_>) -> String {
        let times = match call.arguments.get("times").map(|e| context.evaluate(e)) {
            Some(Value::Integer(n)) => usize::try_from(n).unwrap_or_default(),
            _ => 1,
        };
        let body = context.render_nodes(call.children);
        body.repeat(times)
    }
}

/// `{wrap}...{/wrap}` surrounds its children with brackets.
struct Wrap;

impl FunctionHandler for Wrap {
    fn function_names(&self) -> Vec<String> {
        vec!["wrap".to_string()]
    }

    fn has_children(&self, _name: &str) -> bool {
        true
    }

    fn process(&self, call: &FunctionCall<'_>, context: &mut RenderContext<'_>) -> String {
        format!("<{}>", context.render_nodes(call.children))
    }
}

fn engine_with(templates: &[(&str, &str)]) -> Engine {
    let mut loader = MemoryLoader::new();
    for (name, text) in templates {
        loader.insert(name, text);
    }
    let mut engine = Engine::with_standard_handlers();
    engine.register_resource("mem", Rc::new(loader));
    engine
}

fn render(engine: &mut Engine, source: &str) -> String {
    let tree = engine.parse(source);
    engine.render(&tree)
}

fn has_runtime_error(diagnostics: &[Diagnostic], check: impl Fn(&RuntimeError) -> bool) -> bool {
    diagnostics.iter().any(|d| matches!(&d.error, TemplateError::Runtime(e) if check(e)))
}

#[test]
fn store_binds_by_namespace() {
    let mut store = VariableStore::new();
    store.set("", "x", "global");
    store.set("app", "x", "scoped");

    assert_eq!(store.get("", "x"), Some(&Value::from("global")));
    assert_eq!(store.get("app", "x"), Some(&Value::from("scoped")));
    assert!(!store.has("app:sub", "x"));

    assert_eq!(store.unset("app", "x"), Ok(Value::from("scoped")));
    assert_eq!(store.unset("app", "x"),
               Err(RuntimeError::UnsetUndefined { namespace: "app".into(),
                                                  name:      "x".into(), }));
}

#[test]
fn diagnostics_accumulate_until_drained() {
    let mut engine = Engine::with_standard_handlers();
    let tree = engine.parse("{$missing}");

    engine.render(&tree);
    engine.render(&tree);
    assert_eq!(engine.diagnostics().entries().len(), 2);

    assert_eq!(engine.take_diagnostics().len(), 2);
    assert!(engine.diagnostics().is_empty());
    engine.render(&tree);
    assert_eq!(engine.diagnostics().entries().len(), 1);
}

#[test]
fn store_resolves_paths() {
    let mut store = VariableStore::new();
    let row = IndexMap::from([("cells".to_string(), Value::from(vec![Value::Integer(7)]))]);
    store.set("", "row", row);

    assert_eq!(store.get_path("", "row", &["cells".into(), Value::Integer(0)]),
               Ok(Value::Integer(7)));
    assert!(store.has_path("", "row", &[]));
    assert!(!store.has_path("", "row", &["rows".into()]));
    assert!(matches!(store.get_path("", "nothing", &[]),
                     Err(RuntimeError::UndefinedVariable { .. })));
}

#[test]
fn attribute_steps() {
    let person = Value::from(Rc::new(Person { first: "Jane".into(),
                                              last:  "Doe".into(), }));

    assert_eq!(step(&person, &"last".into()), Ok(Value::from("Doe")));
    assert_eq!(step(&person, &"age".into()),
               Err(RuntimeError::NoSuchObjectAttribute { key: "age".into() }));
    assert_eq!(step(&person, &Value::Bool(true)),
               Err(RuntimeError::InvalidAttributeKey { type_name: "bool" }));

    let opaque = Value::from(Rc::new(Opaque));
    assert_eq!(step(&opaque, &"x".into()),
               Err(RuntimeError::NoAttributeCapability { type_name: "opaque".into() }));
    assert_eq!(opaque.to_string(), "Object(opaque)");

    let list = Value::from(vec![person, Value::Integer(1)]);
    assert_eq!(resolve(list.clone(), &[Value::Integer(0), "first".into()]), Ok(Value::from("Jane")));
    assert_eq!(resolve(list.clone(), &[Value::Real(1.0)]), Ok(Value::Integer(1)));
    assert_eq!(resolve(list.clone(), &[Value::Real(1.5)]),
               Err(RuntimeError::NoSuchArrayAttribute { key: "1.5".into() }));
    assert_eq!(resolve(list, &[Value::Integer(1), "x".into()]),
               Err(RuntimeError::NotAContainer { type_name: "integer" }));
}

#[test]
fn objects_in_templates() {
    let mut engine = Engine::with_standard_handlers();
    engine.set_variable("",
                        "user",
                        Rc::new(Person { first: "Jane".into(),
                                         last:  "Doe".into(), }));

    assert_eq!(render(&mut engine, "{$user.first} {$user.last|upcase}{$user.age}"), "Jane DOE");
    let diagnostics = engine.take_diagnostics();
    assert!(has_runtime_error(&diagnostics, |e| {
                matches!(e, RuntimeError::NoSuchObjectAttribute { key } if key == "age")
            }));
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn objects_with_template_data_render_through_their_template() {
    let mut engine = engine_with(&[("card.tpl", "<{$card.title}>")]);
    engine.set_variable("", "c", Rc::new(Card { title: "Hi".into() }));

    assert_eq!(render(&mut engine, "[{$c}]"), "[<Hi>]");
    assert!(engine.has_variable("", "card"));
}

#[test]
fn custom_operators() {
    let mut engine = Engine::with_standard_handlers();
    engine.register_operators(Rc::new(Shout));
    engine.register_operator("loud", Rc::new(Shout));

    assert_eq!(render(&mut engine, "{'hey'|shout} {'you'|loud}"), "HEY! YOU!");
    assert!(engine.diagnostics().is_empty());
}

#[test]
fn custom_function_with_children() {
    let mut engine = Engine::with_standard_handlers();
    engine.register_functions(Rc::new(Repeat));
    engine.set_variable("", "x", "ab");

    assert_eq!(render(&mut engine, "{repeat times=3}{$x}-{/repeat}"), "ab-ab-ab-");
    assert_eq!(render(&mut engine, "{repeat}\nonce\n{/repeat}"), "once");
    assert!(engine.diagnostics().is_empty());
}

#[test]
fn unregistering() {
    let mut engine = Engine::with_standard_handlers();
    engine.unregister_operator("upcase");
    engine.unregister_function("nothing");

    assert_eq!(render(&mut engine, "{'a'|upcase}"), "a");
    let diagnostics = engine.take_diagnostics();
    assert!(has_runtime_error(&diagnostics, |e| {
                matches!(e, RuntimeError::UnregisterUnknown { name } if name == "nothing")
            }));
    assert!(has_runtime_error(&diagnostics, |e| {
                matches!(e, RuntimeError::UnregisteredOperator { name } if name == "upcase")
            }));

    engine.unset_variable("", "never");
    assert!(has_runtime_error(&engine.take_diagnostics(), |e| {
                matches!(e, RuntimeError::UnsetUndefined { .. })
            }));
}

#[test]
fn autoload_operators_load_once() {
    let calls = Rc::new(Cell::new(0));
    let mut engine = Engine::with_standard_handlers();

    let counter = Rc::clone(&calls);
    engine.register_loader("shout_loader", move |_| {
              counter.set(counter.get() + 1);
              Some(Handler::Operator(Rc::new(Shout)))
          });
    engine.register_autoload_operators(AutoloadDefinition { function: Some("shout_loader".into()),
                                                            names: vec!["shout".into()],
                                                            ..AutoloadDefinition::default() });

    assert!(engine.registry().has_operator("shout"));
    assert_eq!(calls.get(), 0);
    assert_eq!(render(&mut engine, "{'a'|shout}{'b'|shout}"), "A!B!");
    assert_eq!(calls.get(), 1);
}

#[test]
fn autoload_class_receives_parameter() {
    let mut engine = Engine::with_standard_handlers();
    engine.register_loader("Suffix", |parameter| {
              Some(Handler::Operator(Rc::new(Suffix(parameter.unwrap_or_default().to_string()))))
          });
    engine.register_autoload_operators(AutoloadDefinition { class: Some("Suffix".into()),
                                                            class_parameter: Some("?!".into()),
                                                            names: vec!["exclaim".into()],
                                                            ..AutoloadDefinition::default() });

    assert_eq!(render(&mut engine, "{'what'|exclaim}"), "what?!");
}

#[test]
fn autoload_functions_decide_children_when_needed() {
    let mut engine = Engine::with_standard_handlers();
    engine.register_loader("blocks", |_| Some(Handler::Function(Rc::new(Wrap))));
    engine.register_autoload_functions(AutoloadDefinition { function: Some("blocks".into()),
                                                            names: vec!["wrap".into()],
                                                            child_tags: vec!["wrap".into()],
                                                            ..AutoloadDefinition::default() });

    assert_eq!(render(&mut engine, "{wrap}x{/wrap}y"), "<x>y");
    assert!(engine.diagnostics().is_empty());
}

#[test]
fn autoload_functions_resolve_every_child_tag_once() {
    let calls = Rc::new(Cell::new(0));
    let mut engine = Engine::with_standard_handlers();

    let counter = Rc::clone(&calls);
    engine.register_loader("blocks", move |_| {
              counter.set(counter.get() + 1);
              Some(Handler::Function(Rc::new(Wrap)))
          });
    engine.register_autoload_functions(AutoloadDefinition { function: Some("blocks".into()),
                                                            names: vec!["a".into(), "b".into()],
                                                            child_tags: vec!["a".into(), "b".into()],
                                                            ..AutoloadDefinition::default() });

    assert_eq!(render(&mut engine, "{a}1{/a}{b}2{/b}"), "<1><2>");
    assert_eq!(calls.get(), 1);
    assert!(engine.diagnostics().is_empty());
}

#[test]
fn failed_autoload_is_an_error_and_forgets_the_names() {
    let mut engine = Engine::with_standard_handlers();
    engine.register_autoload_operators(AutoloadDefinition { function: Some("absent".into()),
                                                            names: vec!["ghost".into(), "spirit".into()],
                                                            ..AutoloadDefinition::default() });

    assert_eq!(render(&mut engine, "{'a'|ghost}"), "a");
    let diagnostics = engine.take_diagnostics();
    assert!(diagnostics.iter().any(|d| {
                                   d.severity == Severity::Error
                                   && matches!(&d.error,
                                               TemplateError::Runtime(RuntimeError::AutoloadFailed { loader, .. })
                                               if loader == "absent")
                               }));
    assert!(!engine.registry().has_operator("ghost"));
    assert!(!engine.registry().has_operator("spirit"));
}

#[test]
fn invalid_autoload_definitions_are_rejected() {
    let mut engine = Engine::new();
    engine.register_autoload_operators(AutoloadDefinition::default());
    engine.register_autoload_functions(AutoloadDefinition { function: Some("f".into()),
                                                            ..AutoloadDefinition::default() });

    let diagnostics = engine.take_diagnostics();
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| {
                                  matches!(d.error,
                                           TemplateError::Runtime(RuntimeError::InvalidAutoloadDefinition { .. }))
                              }));
}

#[test]
fn include_with_namespace_and_parameters() {
    let mut engine = engine_with(&[("card", "[{$title}|{$outer}]"), ("page", "{include uri='card' name=card title='First'}")]);
    engine.set_variable("", "outer", "o");

    assert_eq!(engine.fetch("page"), Ok("[First|]".to_string()));
    assert_eq!(engine.variable("card", "title"), Some(&Value::from("First")));
}

#[test]
fn include_without_name_shares_the_namespace() {
    let mut engine = engine_with(&[("part", "{$x}{$y}")]);
    engine.set_variable("", "x", "1");

    assert_eq!(render(&mut engine, "{include uri='part' y=2}"), "12");
    assert_eq!(engine.variable("", "y"), Some(&Value::Integer(2)));
}

#[test]
fn nested_includes_nest_namespaces() {
    let mut engine = engine_with(&[("outer", "{include uri='inner' name=b v=$v}"), ("inner", "{$v}")]);
    engine.set_variable("a", "v", "deep");

    assert_eq!(render(&mut engine, "{include uri='outer' name=a}"), "deep");
    assert!(engine.has_variable("a:b", "v"));
}

#[test]
fn include_problems() {
    let mut engine = engine_with(&[("loop", "a{include uri='loop'}")]);

    assert_eq!(render(&mut engine, "x{include name=n}y"), "xy");
    assert!(has_runtime_error(&engine.take_diagnostics(), |e| {
                matches!(e, RuntimeError::MissingParameter { parameter } if parameter == "uri")
            }));

    assert_eq!(render(&mut engine, "x{include uri='missing'}y"), "xy");
    let diagnostics = engine.take_diagnostics();
    assert!(diagnostics.iter().any(|d| {
                                   d.origin == "templar:include"
                                   && matches!(d.error, TemplateError::Resource(ResourceError::NotFound { .. }))
                               }));

    let output = engine.fetch("loop").unwrap_or_default();
    assert_eq!(output, "a".repeat(MAX_INCLUDE_DEPTH + 1));
    assert!(has_runtime_error(&engine.take_diagnostics(), |e| {
                matches!(e, RuntimeError::IncludeDepthExceeded { .. })
            }));
}

#[test]
fn delimiter_functions_follow_engine_delimiters() {
    let mut engine = Engine::with_standard_handlers();
    engine.set_delimiters("[[", "]]").unwrap();

    assert_eq!(render(&mut engine, "[[ldelim]]x[[rdelim]]"), "[[x]]");
}

#[test]
fn empty_delimiters_are_refused() {
    let mut engine = Engine::with_standard_handlers();
    engine.set_variable("", "x", "v");

    assert!(matches!(engine.set_delimiters("", ""), Err(ConfigError::EmptyDelimiter)));
    assert!(matches!(engine.set_delimiters("<", ""), Err(ConfigError::EmptyDelimiter)));
    assert_eq!(engine.left_delimiter(), "{");
    assert_eq!(engine.right_delimiter(), "}");
    assert_eq!(render(&mut engine, "abc{$x}"), "abcv");

    let config = EngineConfig { left_delimiter: String::new(),
                                ..EngineConfig::default() };
    assert!(matches!(config.validate(), Err(ConfigError::EmptyDelimiter)));
    assert!(matches!(Engine::from_config(&config), Err(ConfigError::EmptyDelimiter)));
}

#[test]
fn resources_dispatch_on_scheme() {
    let mut resources = Resources::new();
    resources.register("a", Rc::new(MemoryLoader::new().with("t", "from a")));
    resources.register("b", Rc::new(MemoryLoader::new().with("t", "from b")));

    assert_eq!(resources.fetch("b:t").map(|r| r.text), Ok("from b".to_string()));
    assert_eq!(resources.fetch("t").map(|r| r.text), Ok("from a".to_string()));
    assert_eq!(resources.fetch("unknown:t").map(|r| r.text), Ok("from a".to_string()));
    assert_eq!(resources.fetch("b:x"),
               Err(ResourceError::NotFound { scheme: "b".into(),
                                             name:   "x".into(), }));

    resources.set_default("b");
    assert_eq!(resources.fetch("t").map(|r| r.text), Ok("from b".to_string()));

    resources.unregister("b");
    assert_eq!(resources.fetch("t"), Err(ResourceError::NoLoader { scheme: String::new() }));
}

#[test]
fn fetch_without_loader_fails() {
    let mut engine = Engine::with_standard_handlers();

    assert!(matches!(engine.fetch("page"), Err(ResourceError::NoLoader { .. })));
    assert_eq!(engine.diagnostics().entries().len(), 1);
}

#[test]
fn file_loader_reads_templates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("page.tpl"), "Hi {$name}").unwrap();

    let loader = FileLoader::new(dir.path());
    let resource = loader.fetch("page.tpl").unwrap();
    assert_eq!(resource.text, "Hi {$name}");
    assert!(resource.modified.is_some());
    assert_eq!(loader.fetch("none.tpl"),
               Err(ResourceError::NotFound { scheme: "file".into(),
                                             name:   "none.tpl".into(), }));

    let mut engine = Engine::with_standard_handlers();
    engine.register_resource("file", Rc::new(loader));
    engine.set_variable("", "name", "you");
    assert_eq!(engine.fetch("file:page.tpl"), Ok("Hi you".to_string()));
    assert!(engine.load("page.tpl").unwrap().modified.is_some());
}

#[test]
fn file_loader_stays_below_its_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("templates");
    fs::create_dir_all(root.join("parts")).unwrap();
    fs::write(root.join("parts/head.tpl"), "head").unwrap();
    let secret = dir.path().join("secret.txt");
    fs::write(&secret, "secret").unwrap();
    let absolute = secret.to_string_lossy().into_owned();

    let loader = FileLoader::new(&root);
    assert_eq!(loader.fetch("./parts/head.tpl").map(|r| r.text), Ok("head".to_string()));
    for name in ["../secret.txt", "parts/../../secret.txt", absolute.as_str()] {
        assert_eq!(loader.fetch(name),
                   Err(ResourceError::OutsideRoot { name: name.to_string() }),
                   "{name}");
    }

    let mut engine = Engine::with_standard_handlers();
    engine.register_resource("file", Rc::new(loader));
    assert_eq!(render(&mut engine, "[{include uri='../secret.txt'}]"), "[]");
    assert!(engine.take_diagnostics().iter().any(|d| {
                                               matches!(d.error,
                                                        TemplateError::Resource(ResourceError::OutsideRoot { .. }))
                                           }));
}

#[test]
fn trees_are_cached_per_delimiters() {
    let mut engine = engine_with(&[("t", "{$x}")]);

    let first = engine.load("t").unwrap();
    let second = engine.load("t").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cache().len(), 1);

    engine.set_delimiters("<", ">").unwrap();
    let other = engine.load("t").unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(other.left_delimiter, "<");
    assert_eq!(engine.cache().len(), 2);

    engine.cache().invalidate("t");
    assert!(engine.cache().is_empty());
}

#[test]
fn cache_is_shared_between_threads() {
    let cache = Arc::new(TreeCache::new());

    let worker_cache = Arc::clone(&cache);
    thread::spawn(move || {
        let mut engine = engine_with(&[("t", "shared {$x}")]).with_cache(worker_cache);
        engine.load("t").map(drop)
    }).join()
      .unwrap()
      .unwrap();

    let mut engine = Engine::with_standard_handlers().with_cache(cache);
    engine.set_variable("", "x", "tree");
    assert_eq!(engine.fetch("t"), Ok("shared tree".to_string()));
}

#[test]
fn config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("templar.toml");
    fs::write(&path,
              r#"
left_delimiter = "<%"
right_delimiter = "%>"
literals = ["verbatim"]

[[autoload.operators]]
function = "shout_loader"
names = ["shout"]
"#).unwrap();

    let config = EngineConfig::from_file(&path).unwrap();
    assert_eq!(config.right_delimiter, "%>");
    assert_eq!(config.autoload.operators.len(), 1);

    let mut engine = Engine::from_config(&config).unwrap();
    engine.register_loader("shout_loader", |_| Some(Handler::Operator(Rc::new(Shout))));
    assert_eq!(render(&mut engine, "<%'a'|shout%> <%verbatim%><%$x%><%/verbatim%> {$x}"),
               "A! <%$x%> {$x}");
}

#[test]
fn config_template_root_registers_file_loader() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("t.tpl"), "file").unwrap();

    let config = EngineConfig { template_root: Some(dir.path().to_path_buf()),
                                ..EngineConfig::default() };
    let mut engine = Engine::from_config(&config).unwrap();
    assert_eq!(engine.fetch("t.tpl"), Ok("file".to_string()));
}

#[test]
fn config_errors() {
    assert!(matches!(EngineConfig::from_file("/definitely/not/here.toml"),
                     Err(ConfigError::Io { .. })));
    assert!(matches!(EngineConfig::from_toml("unknown = 1"), Err(ConfigError::Toml(_))));
    assert!(matches!(EngineConfig::from_toml("right_delimiter = \"\""),
                     Err(ConfigError::EmptyDelimiter)));
    assert_eq!(EngineConfig::from_toml("").ok(), Some(EngineConfig::default()));
}
