//! Registry of loaded libraries

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use super::{Diagnostic, Library, LibraryError, LibraryLoad};
use crate::parser::SnippetDefinition;

/// All libraries available to a session; snippet names are unique across them
#[derive(Debug, Default)]
pub struct LibraryRegistry {
    libraries: Vec<Library>,
}

impl LibraryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a library; rejected if its name or any snippet name is taken
    pub fn add(&mut self, library: Library) -> Result<(), LibraryError> {
        if self.library(library.name()).is_some() {
            return Err(LibraryError::DuplicateLibrary {
                name: library.name().to_string(),
            });
        }
        if let Some(clash) = library.iter().find(|s| self.snippet(s.name()).is_some()) {
            warn!(library = library.name(), snippet = clash.name(), "Library rejected");
            return Err(LibraryError::DuplicateSnippet {
                name: clash.name().to_string(),
            });
        }
        self.libraries.push(library);
        Ok(())
    }

    /// Parse and register library text, returning the load diagnostics
    pub fn load_str(&mut self, text: &str) -> Result<Vec<Diagnostic>, LibraryError> {
        let LibraryLoad {
            library,
            diagnostics,
        } = Library::parse(text)?;
        self.add(library)?;
        Ok(diagnostics)
    }

    /// Read, parse and register a library file
    pub fn load_file(&mut self, path: &Path) -> Result<Vec<Diagnostic>, LibraryError> {
        let text = std::fs::read_to_string(path).map_err(|e| LibraryError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.load_str(&text)
    }

    pub fn library(&self, name: &str) -> Option<&Library> {
        self.libraries.iter().find(|l| l.name() == name)
    }

    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Look up a snippet by name in any library
    pub fn snippet(&self, name: &str) -> Option<&Arc<SnippetDefinition>> {
        self.libraries.iter().find_map(|l| l.find(name))
    }

    /// Every registered snippet, library by library
    pub fn snippets(&self) -> impl Iterator<Item = &Arc<SnippetDefinition>> {
        self.libraries.iter().flat_map(Library::iter)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "Base\nBase\n1\nentity Node node 0 : begin n; end\n";
    const AGENTS: &str = "Agents\nAgents\n1\nentity TCP agent 1 : begin t; end\n";

    #[test]
    fn test_lookup_across_libraries() {
        let mut registry = LibraryRegistry::new();
        registry.load_str(BASE).unwrap();
        registry.load_str(AGENTS).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snippet("TCP").unwrap().name(), "TCP");
        assert!(registry.snippet("UDP").is_none());
        assert_eq!(registry.snippets().count(), 2);
    }

    #[test]
    fn test_duplicate_library_name() {
        let mut registry = LibraryRegistry::new();
        registry.load_str(BASE).unwrap();
        let err = registry
            .load_str("Base\nOther\n2\nentity X node 0 : begin x; end\n")
            .unwrap_err();
        assert_eq!(
            err,
            LibraryError::DuplicateLibrary {
                name: "Base".to_string()
            }
        );
    }

    #[test]
    fn test_snippet_clash_rejects_whole_library() {
        let mut registry = LibraryRegistry::new();
        registry.load_str(BASE).unwrap();
        let err = registry
            .load_str("More\nMore\n1\nentity Router node 0 : begin r; end\nentity Node node 0 : begin n; end\n")
            .unwrap_err();
        assert!(matches!(err, LibraryError::DuplicateSnippet { ref name } if name == "Node"));
        assert!(registry.snippet("Router").is_none());
    }

    #[test]
    fn test_missing_file() {
        let mut registry = LibraryRegistry::new();
        let err = registry
            .load_file(Path::new("/nonexistent/library.tcl"))
            .unwrap_err();
        assert!(matches!(err, LibraryError::FileReadError { .. }));
    }
}
