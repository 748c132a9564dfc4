//! Snipgen - template-driven simulation script generation
//!
//! This library parses snippet libraries (textual class definitions with
//! attributes and output patterns), holds a model of class instances,
//! relations and arrays, and generates the script for a model by binding
//! attribute values into each class's patterns.
//!
//! # Example
//!
//! ```rust
//! use snipgen::generate_script;
//!
//! let library = "Net\nNet\n1\n\
//!     !entity Simulator env 4 : begin set #name# [new Simulator]; end\n\
//!     entity Node node 0 : begin set #name# [$ns node]; end\n";
//! let scene = "[environment]\nclass = \"Simulator\"\n\
//!     [[entities]]\nclass = \"Node\"\nname = \"n0\"\n";
//!
//! let script = generate_script(library, scene).unwrap();
//! assert_eq!(script, "set ns [new Simulator]\nset n0 [$ns node]\n$ns run");
//! ```

pub mod codegen;
pub mod error;
pub mod library;
pub mod messages;
pub mod parser;
pub mod scene;
pub mod world;

pub use codegen::{DistinctColors, Generator, GeneratorConfig, LoopStyle, PrePass};
pub use error::ParseError;
pub use library::{Diagnostic, Library, LibraryError, LibraryLoad, LibraryRegistry};
pub use messages::MessageCatalog;
pub use parser::{parse_snippet, SnippetDefinition};
pub use scene::{Scene, SceneError};
pub use world::{InstanceId, World, WorldError};

use thiserror::Error;

/// Errors that can occur in the library-to-script pipeline
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Error loading a library
    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    /// Error loading the scene or building its model
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),
}

/// Generate the script for a model with default configuration
///
/// No pre-passes are registered, so the model is only read.
pub fn generate(world: &World) -> String {
    generate_with_config(world, GeneratorConfig::default())
}

/// Generate the script for a model with custom configuration
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use snipgen::{generate_with_config, parse_snippet, GeneratorConfig, World};
///
/// let env = parse_snippet("!entity Simulator env 4 : begin set %name% [new Simulator]; end").unwrap();
/// let world = World::new(Arc::new(env), "sim").unwrap();
///
/// let config = GeneratorConfig::new().with_separator('%');
/// assert_eq!(
///     generate_with_config(&world, config),
///     "set sim [new Simulator]\n$sim run"
/// );
/// ```
pub fn generate_with_config(world: &World, config: GeneratorConfig) -> String {
    Generator::new(config).assemble_prepared(world)
}

/// Load one library and one scene from text and generate the script
///
/// Snippets rejected while loading the library are skipped; the scene fails
/// to build only if it names one of them.
pub fn generate_script(library: &str, scene: &str) -> Result<String, GenerateError> {
    let mut registry = LibraryRegistry::new();
    registry.load_str(library)?;
    let world = Scene::from_str(scene)?.build(&registry)?;
    Ok(generate(&world))
}
