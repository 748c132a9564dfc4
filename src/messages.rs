//! Diagnostic message catalog
//!
//! Generation never fails outright: unresolved attribute references and
//! malformed patterns are written into the output as diagnostic text. The
//! catalog holds that text so it can be localized or replaced without
//! touching the generator.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a message catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read message catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse message catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Text emitted for generation-time diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    /// Optional name for the catalog
    pub name: Option<String>,
    /// Replaces the whole output of a pattern with an unterminated tag
    pub bad_pattern: String,
    /// Appended to a token the resolver could not find
    pub not_found_suffix: String,
}

/// TOML structure for deserializing catalogs
#[derive(Deserialize)]
struct TomlCatalog {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    messages: TomlMessages,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
struct TomlMessages {
    bad_pattern: Option<String>,
    not_found_suffix: Option<String>,
}

const DEFAULT_BAD_PATTERN: &str = "# bad formed pattern";
const DEFAULT_NOT_FOUND_SUFFIX: &str = ".NotFound";

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            name: None,
            bad_pattern: DEFAULT_BAD_PATTERN.to_string(),
            not_found_suffix: DEFAULT_NOT_FOUND_SUFFIX.to_string(),
        }
    }
}

impl MessageCatalog {
    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string; missing messages keep their defaults
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(MessageCatalog {
            name: parsed.metadata.and_then(|m| m.name),
            bad_pattern: parsed.messages.bad_pattern.unwrap_or(defaults.bad_pattern),
            not_found_suffix: parsed
                .messages
                .not_found_suffix
                .unwrap_or(defaults.not_found_suffix),
        })
    }

    /// Set the text used for malformed patterns
    pub fn with_bad_pattern(mut self, text: impl Into<String>) -> Self {
        self.bad_pattern = text.into();
        self
    }

    pub fn bad_pattern(&self) -> &str {
        &self.bad_pattern
    }

    /// The sentinel for an unresolved token, e.g. `rate.NotFound`
    pub fn not_found(&self, token: &str) -> String {
        format!("{}{}", token, self.not_found_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = MessageCatalog::default();
        assert_eq!(catalog.not_found("rate"), "rate.NotFound");
        assert_eq!(catalog.bad_pattern(), "# bad formed pattern");
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let toml_str = r##"
[metadata]
name = "es"

[messages]
bad_pattern = "# patron mal formado"
not_found_suffix = ".NoEncontrado"
"##;
        let catalog = MessageCatalog::from_str(toml_str).expect("Should parse");
        assert_eq!(catalog.name, Some("es".to_string()));
        assert_eq!(catalog.bad_pattern(), "# patron mal formado");
        assert_eq!(catalog.not_found("x"), "x.NoEncontrado");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let catalog = MessageCatalog::from_str("[messages]\nbad_pattern = \"BAD\"\n")
            .expect("Should parse");
        assert_eq!(catalog.bad_pattern(), "BAD");
        assert_eq!(catalog.not_found("x"), "x.NotFound");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let catalog = MessageCatalog::from_str("").expect("Should parse");
        assert_eq!(catalog, MessageCatalog::default());
    }

    #[test]
    fn test_invalid_toml_error() {
        let result = MessageCatalog::from_str("this is not valid toml {{{{");
        assert!(matches!(result, Err(CatalogError::ParseError(_))));
    }
}
