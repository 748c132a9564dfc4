//! Snipgen CLI
//!
//! Usage:
//!   snipgen [OPTIONS] <LIBRARY>...
//!
//! Options:
//!   -s, --scene <FILE>            Scene to generate (TOML); stdin if omitted
//!   -m, --messages <FILE>         Diagnostic message catalog (TOML)
//!       --separator <CHAR>        Inline tag separator [default: #]
//!       --legacy-loops            Close dual-array loops in opening order
//!       --distinct-colors <CLASS> Give instances of CLASS distinct colors
//!   -c, --check                   Only load libraries and report problems
//!   -g, --grammar                 Show snippet grammar reference
//!   -v, --verbose                 Debug logging
//!   -h, --help                    Print help

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use snipgen::{
    DistinctColors, Generator, GeneratorConfig, LibraryRegistry, LoopStyle, MessageCatalog, Scene,
};

#[derive(Parser)]
#[command(name = "snipgen")]
#[command(about = "Generate simulation scripts from snippet libraries")]
struct Cli {
    /// Snippet library files
    libraries: Vec<PathBuf>,

    /// Scene file (TOML); read from stdin if not provided
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Message catalog for generation diagnostics (TOML)
    #[arg(short, long)]
    messages: Option<PathBuf>,

    /// Character delimiting inline tags in patterns
    #[arg(long, default_value_t = '#')]
    separator: char,

    /// Emit dual-array relation loops the way older scripts do
    #[arg(long)]
    legacy_loops: bool,

    /// Reassign duplicate colors on instances of this class
    #[arg(long, value_name = "CLASS")]
    distinct_colors: Vec<String>,

    /// Load the libraries, report rejected snippets and list classes
    #[arg(short, long)]
    check: bool,

    /// Show snippet grammar reference
    #[arg(short, long)]
    grammar: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.grammar {
        print_grammar();
        return;
    }

    if cli.libraries.is_empty() {
        print_intro();
        return;
    }

    let (registry, rejected) = load_libraries(&cli.libraries);

    if cli.check {
        for library in registry.libraries() {
            println!("{} ({}, version {})", library.name(), library.toolbar_name(), library.version());
            for snippet in library.iter() {
                let kind = if snippet.is_relation() { "relation" } else { "entity" };
                println!("  {} {}", kind, snippet.name());
            }
        }
        if rejected > 0 {
            eprintln!("{} snippet(s) rejected", rejected);
            std::process::exit(1);
        }
        return;
    }

    let messages = match &cli.messages {
        Some(path) => match MessageCatalog::from_file(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error loading message catalog '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => MessageCatalog::default(),
    };

    let scene = match read_scene(cli.scene.as_deref()) {
        Ok(scene) => scene,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    let mut world = match scene.build(&registry) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Error building scene: {}", e);
            std::process::exit(1);
        }
    };

    let loop_style = if cli.legacy_loops {
        LoopStyle::Legacy
    } else {
        LoopStyle::Nested
    };
    let config = GeneratorConfig::new()
        .with_separator(cli.separator)
        .with_loop_style(loop_style)
        .with_messages(messages);

    let mut generator = Generator::new(config);
    for class in &cli.distinct_colors {
        generator.register_pre_pass(class.as_str(), DistinctColors);
    }

    println!("{}", generator.assemble(&mut world));
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Load every library, printing diagnostics; exits on unreadable files
fn load_libraries(paths: &[PathBuf]) -> (LibraryRegistry, usize) {
    let mut registry = LibraryRegistry::new();
    let mut rejected = 0;

    for path in paths {
        match registry.load_file(path) {
            Ok(diagnostics) => {
                let filename = path.display().to_string();
                for diagnostic in &diagnostics {
                    eprintln!("{}", diagnostic.format(&filename));
                }
                rejected += diagnostics.len();
                info!(library = %filename, rejected = diagnostics.len(), "Loaded library");
            }
            Err(e) => {
                eprintln!("Error loading library '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    (registry, rejected)
}

fn read_scene(path: Option<&Path>) -> Result<Scene, String> {
    match path {
        Some(path) => Scene::from_file(path)
            .map_err(|e| format!("Error loading scene '{}': {}", path.display(), e)),
        None => {
            if io::stdin().is_terminal() {
                return Err("No scene given: pass --scene <FILE> or pipe one on stdin".to_string());
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Error reading from stdin: {}", e))?;
            Scene::from_str(&buffer).map_err(|e| format!("Error parsing scene: {}", e))
        }
    }
}

fn print_intro() {
    println!(
        r#"Snipgen - generate simulation scripts from snippet libraries

USAGE:
    snipgen [OPTIONS] <LIBRARY>...
    cat scene.toml | snipgen library.tcl

OPTIONS:
    -s, --scene              Scene to generate (TOML)
    -m, --messages           Diagnostic message catalog (TOML)
    --separator              Inline tag separator (default #)
    --legacy-loops           Close dual-array loops in opening order
    --distinct-colors        Give instances of a class distinct colors
    -c, --check              Validate libraries and list classes
    -g, --grammar            Show snippet grammar reference
    -v, --verbose            Debug logging
    -h, --help               Print help

QUICK START:
    snipgen --scene net.toml base.tcl > net.tcl

Run --grammar for the snippet syntax."#
    );
}

fn print_grammar() {
    println!(
        r#"SNIPPET GRAMMAR
===============

LIBRARY FILE
------------
<library name>
<toolbar name>
<version>
<snippet block>...

A block ends at the first line ending with the word `end`.

SNIPPET BLOCK
-------------
<header> : <attribute>; ... begin <pattern>; ... end

HEADERS
-------
[!]entity <Name> <base> <icon>
[!]relation <Name> [!]<fromBase> [!]<toBase> <baseStyle> <lineStyle> <lineWidth> <endStyle>

Leading ! on the kind: at most one instance in a model.
Leading ! on a base: an endpoint carries at most one relation of the class.
Icons: 0 node, 1 agent, 2 application, 3 timer, 4 generic.

ATTRIBUTES
----------
name                         No default
name=default                 Default value
name=default:opt1 opt2       Default restricted to listed options
name:opt1 opt2               Options, no default

PATTERNS
--------
text with #tag# tags         Literal line, tags substituted
?attr=value:then:else        Conditional on an attribute's value

TAGS
----
#name#       Instance name, name($array) when replicated
#from# #to#  Relation endpoints
#env.attr#   Attribute of the environment object
#attr#       Attribute value; unknown tags print attr.NotFound"#
    );
}
