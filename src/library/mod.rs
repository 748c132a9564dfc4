//! Snippet libraries
//!
//! A library file starts with three preamble lines (name, toolbar name,
//! version) followed by snippet blocks. Each block runs up to and including
//! the first line ending with the keyword `end`.
//!
//! Loading is partial: a block that fails to parse, or that reuses the name
//! of an earlier snippet, is left out and reported as a [`Diagnostic`] while
//! every other snippet is kept.

mod registry;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::parser::{parse_snippet, rfind_word, SnippetDefinition};

pub use registry::LibraryRegistry;

/// Errors that can occur when loading or registering libraries
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LibraryError {
    /// The text ends before the three preamble lines
    #[error("library is missing its {line} line")]
    MissingPreamble { line: &'static str },

    /// A snippet name is already defined
    #[error("duplicate snippet definition: {name}")]
    DuplicateSnippet { name: String },

    /// A library with the same name is already registered
    #[error("duplicate library: {name}")]
    DuplicateLibrary { name: String },

    /// Error reading a library file
    #[error("error reading library file {path}: {message}")]
    FileReadError { path: String, message: String },
}

/// Why a block was left out of a library
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    Parse(Vec<ParseError>),
    Duplicate { name: String },
}

/// A rejected snippet block
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 0-based block position in the library
    pub block: usize,
    /// 1-based line where the block starts
    pub line: usize,
    /// The block text, which parse error spans refer to
    pub source: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Human-readable report; parse errors are annotated against the block
    pub fn format(&self, filename: &str) -> String {
        match &self.kind {
            DiagnosticKind::Parse(errors) => {
                let name = format!("{}:{}", filename, self.line);
                errors
                    .iter()
                    .map(|e| e.format(&self.source, &name))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            DiagnosticKind::Duplicate { name } => format!(
                "{}:{}: snippet '{}' is already defined, keeping the first",
                filename, self.line, name
            ),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::Parse(errors) => {
                write!(f, "block {} (line {}):", self.block, self.line)?;
                for error in errors {
                    write!(f, " {}", error)?;
                }
                Ok(())
            }
            DiagnosticKind::Duplicate { name } => {
                write!(f, "block {} (line {}): duplicate snippet '{}'", self.block, self.line, name)
            }
        }
    }
}

/// Result of [`Library::parse`]: the snippets that loaded and why others did not
#[derive(Debug, Clone)]
pub struct LibraryLoad {
    pub library: Library,
    pub diagnostics: Vec<Diagnostic>,
}

impl LibraryLoad {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// A named, ordered set of snippet definitions
#[derive(Debug, Clone, Default)]
pub struct Library {
    name: String,
    toolbar_name: String,
    version: String,
    snippets: Vec<Arc<SnippetDefinition>>,
}

impl Library {
    pub fn new(
        name: impl Into<String>,
        toolbar_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            toolbar_name: toolbar_name.into(),
            version: version.into(),
            snippets: Vec::new(),
        }
    }

    /// Parse library text, keeping every snippet that loads
    pub fn parse(text: &str) -> Result<LibraryLoad, LibraryError> {
        let mut lines = text.lines();
        let mut preamble = |line: &'static str| {
            lines
                .next()
                .map(|l| l.trim().to_string())
                .ok_or(LibraryError::MissingPreamble { line })
        };
        let name = preamble("name")?;
        let toolbar_name = preamble("toolbar name")?;
        let version = preamble("version")?;

        let mut library = Library::new(name, toolbar_name, version);
        let mut diagnostics = Vec::new();

        for (block, (line, source)) in blocks(text.lines().skip(3), 4).into_iter().enumerate() {
            let kind = match parse_snippet(&source) {
                Ok(snippet) => match library.add(snippet) {
                    Ok(()) => continue,
                    Err(LibraryError::DuplicateSnippet { name }) => {
                        warn!(library = %library.name, snippet = %name, line, "Duplicate snippet dropped");
                        DiagnosticKind::Duplicate { name }
                    }
                    Err(other) => return Err(other),
                },
                Err(errors) => {
                    warn!(library = %library.name, line, errors = errors.len(), "Snippet rejected");
                    DiagnosticKind::Parse(errors)
                }
            };
            diagnostics.push(Diagnostic {
                block,
                line,
                source,
                kind,
            });
        }

        debug!(
            library = %library.name,
            snippets = library.len(),
            rejected = diagnostics.len(),
            "Library loaded"
        );
        Ok(LibraryLoad {
            library,
            diagnostics,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn toolbar_name(&self) -> &str {
        &self.toolbar_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Append a snippet; its name must not be taken
    pub fn add(&mut self, snippet: SnippetDefinition) -> Result<(), LibraryError> {
        if self.contains(snippet.name()) {
            return Err(LibraryError::DuplicateSnippet {
                name: snippet.name().to_string(),
            });
        }
        self.snippets.push(Arc::new(snippet));
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Arc<SnippetDefinition>> {
        self.snippets.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&Arc<SnippetDefinition>> {
        self.snippets.iter().find(|s| s.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SnippetDefinition>> {
        self.snippets.iter()
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} : {} : {}", self.name, self.toolbar_name, self.version)?;
        for snippet in &self.snippets {
            writeln!(f, "{}", snippet)?;
        }
        Ok(())
    }
}

/// Whether a line closes a snippet block
fn closes_block(line: &str) -> bool {
    let line = line.trim_end();
    line.ends_with("end") && rfind_word(line, "end", 0) == Some(line.len() - 3)
}

/// Group lines into blocks, yielding `(first line number, block text)`;
/// trailing text without a closing line is yielded if not blank
fn blocks<'a>(lines: impl Iterator<Item = &'a str>, first_line: usize) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut start = first_line;

    for (offset, line) in lines.enumerate() {
        let number = first_line + offset;
        if current.is_empty() {
            if line.trim().is_empty() {
                continue;
            }
            start = number;
        }
        current.push(line);
        if closes_block(line) {
            out.push((start, current.join("\n")));
            current.clear();
        }
    }

    if current.iter().any(|l| !l.trim().is_empty()) {
        out.push((start, current.join("\n")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Pattern;

    const NETWORK: &str = "\
Network
Network Tools
1.0
!entity Simulator env 4 :
  begin
  set #name# [new Simulator];
end
entity Node node 0 : color=black:black red;
begin
set #name# [$ns node];
end
relation Link node node 0 0 1 0 : bw=1Mb; delay=10ms;
begin
$ns duplex-link #from# #to# #bw# #delay# DropTail;
end
";

    #[test]
    fn test_parse_library() {
        let load = Library::parse(NETWORK).unwrap();
        assert!(load.is_clean());

        let lib = load.library;
        assert_eq!(lib.name(), "Network");
        assert_eq!(lib.toolbar_name(), "Network Tools");
        assert_eq!(lib.version(), "1.0");
        assert_eq!(lib.len(), 3);
        assert!(lib.contains("Link"));
        assert_eq!(lib.get(1).unwrap().name(), "Node");
        assert_eq!(
            lib.find("Simulator").unwrap().patterns(),
            &[Pattern::Literal("set #name# [new Simulator]".to_string())]
        );
    }

    #[test]
    fn test_missing_preamble() {
        assert_eq!(
            Library::parse("Network\nTools").unwrap_err(),
            LibraryError::MissingPreamble { line: "version" }
        );
    }

    #[test]
    fn test_bad_block_is_skipped() {
        let text = "Lib\nLib\n1\n\
entity Node node 0 : begin set #name# [$ns node]; end\n\
entity Broken node : begin x; end\n\
entity Agent agent 1 : begin y; end\n";

        let load = Library::parse(text).unwrap();
        assert_eq!(load.library.len(), 2);
        assert!(load.library.contains("Agent"));
        assert_eq!(load.diagnostics.len(), 1);

        let diag = &load.diagnostics[0];
        assert_eq!(diag.block, 1);
        assert_eq!(diag.line, 5);
        assert!(matches!(diag.kind, DiagnosticKind::Parse(_)));
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let text = "Lib\nLib\n1\n\
entity Node node 0 : begin first; end\n\
entity Node node 0 : begin second; end\n";

        let load = Library::parse(text).unwrap();
        assert_eq!(load.library.len(), 1);
        assert_eq!(
            load.library.find("Node").unwrap().patterns(),
            &[Pattern::Literal("first".to_string())]
        );
        assert_eq!(
            load.diagnostics[0].kind,
            DiagnosticKind::Duplicate {
                name: "Node".to_string()
            }
        );
        assert!(load.diagnostics[0].format("lib.tcl").contains("lib.tcl:5"));
    }

    #[test]
    fn test_block_end_is_whole_word() {
        assert!(closes_block("end"));
        assert!(closes_block("  x; end  "));
        assert!(!closes_block("$ns append"));
        assert!(!closes_block("endless"));
        assert!(!closes_block(""));
    }

    #[test]
    fn test_unterminated_trailing_block_is_reported() {
        let load = Library::parse("Lib\nLib\n1\nentity Node node 0 : begin x;\n\n").unwrap();
        assert!(load.library.is_empty());
        assert_eq!(load.diagnostics.len(), 1);
    }

    #[test]
    fn test_display_lists_snippets() {
        let lib = Library::parse(NETWORK).unwrap().library;
        let text = lib.to_string();
        assert!(text.starts_with("Network : Network Tools : 1.0\n"));
        assert!(text.contains("Link"));
    }
}
