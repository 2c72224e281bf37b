//! Command-line interface for hilite
//! Tokenizes source files with the bundled (or user supplied) grammars and prints the token tree.
//!
//! Usage:
//!   hilite tokenize `<path|->` [--language `<lang>`] [--format `<format>`] [--grammar `<file>`] [--config `<file>`]
//!   hilite languages                                   - List registered languages
//!   hilite formats                                     - List output formats
//!
//! Logging goes to stderr and is controlled by `HILITE_LOG` (default `warn`).

use clap::{Arg, ArgMatches, Command};
use hilite::config::{HiliteConfig, Loader};
use hilite::formats::FormatRegistry;
use hilite::grammar::GrammarSpec;
use hilite::{languages, GrammarRegistry, Tokenizer};
use std::io::Read;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HILITE_LOG";
const LOCAL_CONFIG: &str = "hilite.toml";

fn main() {
    init_logging();

    let matches = Command::new("hilite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tokenize source code with declarative highlighting grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("tokenize")
                .about("Tokenize a file and print the token tree")
                .arg(
                    Arg::new("path")
                        .help("Path to the source file, or '-' for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("language")
                        .long("language")
                        .short('l')
                        .help("Language to tokenize with (default: guessed from the file extension)"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g., 'treeviz', 'tag', 'json')"),
                )
                .arg(
                    Arg::new("grammar")
                        .long("grammar")
                        .short('g')
                        .help("JSON or YAML grammar file to register before tokenizing"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Configuration file layered over the defaults"),
                ),
        )
        .subcommand(Command::new("languages").about("List registered languages"))
        .subcommand(Command::new("formats").about("List available output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("tokenize", tokenize_matches)) => handle_tokenize_command(tokenize_matches),
        Some(("languages", _)) => handle_languages_command(),
        Some(("formats", _)) => handle_formats_command(),
        _ => unreachable!(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Handle the tokenize command
fn handle_tokenize_command(matches: &ArgMatches) {
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-");
    let config = load_config(matches).unwrap_or_else(|e| fail(format!("Invalid configuration: {e}")));

    let source = read_source(path).unwrap_or_else(|e| fail(format!("Error reading {path}: {e}")));

    let mut registry =
        GrammarRegistry::with_defaults().unwrap_or_else(|e| fail(format!("Bundled grammars: {e}")));

    let grammar_file = matches.get_one::<String>("grammar");
    let language = config
        .output
        .language
        .clone()
        .or_else(|| grammar_file.and_then(|file| file_stem(file)))
        .or_else(|| guess_language(path).map(str::to_string))
        .unwrap_or_else(|| fail("No language given and none could be guessed; use --language"));

    if let Some(file) = grammar_file {
        load_grammar_file(&mut registry, &language, file, &config);
    }

    let grammar = registry
        .resolve(&language)
        .unwrap_or_else(|e| fail(e));
    debug!(%language, bytes = source.len(), "Tokenizing");
    let tokens = Tokenizer::with_config(&registry, config.tokenizer).tokenize(&source, &grammar);

    let output = FormatRegistry::with_defaults()
        .render(&tokens, &config.output.format)
        .unwrap_or_else(|e| fail(e));
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }
}

/// Handle the languages command
fn handle_languages_command() {
    let registry =
        GrammarRegistry::with_defaults().unwrap_or_else(|e| fail(format!("Bundled grammars: {e}")));
    println!("Registered languages:\n");
    for name in registry.languages() {
        println!("  {}", name);
    }
}

/// Handle the formats command
fn handle_formats_command() {
    let formats = FormatRegistry::with_defaults();
    println!("Available formats:\n");
    for format in formats.iter() {
        println!("  {}", format.name());
        println!("    {}", format.summary());
    }
}

fn load_config(matches: &ArgMatches) -> Result<HiliteConfig, config::ConfigError> {
    let mut loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };
    if let Some(format) = matches.get_one::<String>("format") {
        loader = loader.set_override("output.format", format.as_str())?;
    }
    if let Some(language) = matches.get_one::<String>("language") {
        loader = loader.set_override("output.language", language.as_str())?;
    }
    loader.build()
}

fn read_source(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        std::fs::read_to_string(path)
    }
}

fn guess_language(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?;
    languages::for_extension(extension)
}

fn file_stem(path: &str) -> Option<String> {
    Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}

/// Compile a grammar file and register it under `language`
fn load_grammar_file(registry: &mut GrammarRegistry, language: &str, file: &str, config: &HiliteConfig) {
    let source = std::fs::read_to_string(file)
        .unwrap_or_else(|e| fail(format!("Error reading {file}: {e}")));

    let extension = Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    let spec = match extension {
        "json" => GrammarSpec::from_json(&source),
        "yaml" | "yml" => GrammarSpec::from_yaml(&source),
        other => fail(format!(
            "Unsupported grammar file extension '{other}' (expected json, yaml or yml)"
        )),
    }
    .unwrap_or_else(|e| fail(e));

    let grammar = spec
        .compile(config.tokenizer.backtrack_limit)
        .unwrap_or_else(|e| fail(e));
    registry.define(language, grammar);
}
