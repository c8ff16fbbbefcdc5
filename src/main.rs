use std::{
    path::{Path, PathBuf},
    process,
    rc::Rc,
};

use clap::Parser;
use templar::{
    config::EngineConfig,
    interpreter::{evaluator::core::Engine, resource::loader::FileLoader, value::core::Value},
    util::num::parse_numeral,
};
use tracing_subscriber::EnvFilter;

/// templar renders delimiter-based templates with namespaced variables,
/// operator chains and includes.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The template to render. Includes are resolved relative to its
    /// directory unless the configuration sets a template root.
    template: PathBuf,

    /// Binds a variable, as `name=value` or `namespace:name=value`. Numerals
    /// become numbers, anything else text. May be repeated.
    #[arg(short, long = "set", value_name = "BINDING")]
    set: Vec<String>,

    /// Overrides the left delimiter.
    #[arg(long)]
    left: Option<String>,

    /// Overrides the right delimiter.
    #[arg(long)]
    right: Option<String>,

    /// Reads engine settings from a TOML file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logs parse and cache activity.
    #[arg(short, long)]
    verbose: bool,

    /// Prints the parsed tree instead of rendering it.
    #[arg(long)]
    tree: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                                                  EnvFilter::new(default_level)
                                              }))
                             .with_writer(std::io::stderr)
                             .with_target(false)
                             .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
                                                       eprintln!("{e}");
                                                       process::exit(1);
                                                   }),
        None => EngineConfig::default(),
    };
    if let Some(left) = args.left {
        config.left_delimiter = left;
    }
    if let Some(right) = args.right {
        config.right_delimiter = right;
    }

    if let Err(e) = config.validate() {
        eprintln!("{e}");
        process::exit(1);
    }

    let (root, name) = split_template_path(&args.template, config.template_root.as_deref());
    let mut engine = Engine::from_config(&config).unwrap_or_else(|e| {
                                                     eprintln!("{e}");
                                                     process::exit(1);
                                                 });
    engine.register_resource("file", Rc::new(FileLoader::new(root)));
    engine.set_default_resource("file");

    for binding in &args.set {
        let Some((target, value)) = binding.split_once('=') else {
            eprintln!("Invalid binding '{binding}', expected name=value.");
            process::exit(1);
        };
        let (namespace, name) = target.rsplit_once(':').unwrap_or(("", target));
        let value = parse_numeral(value).map_or_else(|| Value::from(value), Value::from);
        engine.set_variable(namespace, name, value);
    }

    if args.tree {
        match engine.load(&name) {
            Ok(tree) => println!("{:#?}", tree.root),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            },
        }
        return;
    }

    match engine.fetch(&name) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        },
    }
}

/// Splits the template argument into the loader root and the name to fetch.
///
/// With a configured root the argument is taken as a name below it.
fn split_template_path(template: &Path, configured_root: Option<&Path>) -> (PathBuf, String) {
    if let Some(root) = configured_root {
        return (root.to_path_buf(), template.to_string_lossy().into_owned());
    }

    let root = template.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = template.file_name()
                       .map(|n| n.to_string_lossy().into_owned())
                       .unwrap_or_default();
    (root, name)
}
