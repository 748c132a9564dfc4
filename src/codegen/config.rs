//! Configuration for script generation

use crate::messages::MessageCatalog;

/// How loops for relations between two differently-replicated endpoints
/// are closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopStyle {
    /// Inner loop indented and closed first
    #[default]
    Nested,
    /// Closers emitted in opening order, as older generated scripts have them
    Legacy,
}

/// Configuration options for script generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Character delimiting inline tags in patterns
    pub separator: char,

    pub loop_style: LoopStyle,

    /// Diagnostic text for unresolved tags and malformed patterns
    pub messages: MessageCatalog,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            separator: '#',
            loop_style: LoopStyle::default(),
            messages: MessageCatalog::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inline tag separator
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_loop_style(mut self, style: LoopStyle) -> Self {
        self.loop_style = style;
        self
    }

    /// Set the diagnostic message catalog
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }
}
