//! Snippet definition types produced by the parser

use std::fmt;

pub use crate::error::Span;

/// One templated attribute of a snippet: `name[=default][:options]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    name: String,
    default: Option<String>,
    options: Option<String>,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, default: Option<String>, options: Option<String>) -> Self {
        Self {
            name: name.into(),
            default,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default value, empty when the clause declared none
    pub fn default_value(&self) -> &str {
        self.default.as_deref().unwrap_or("")
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn has_options(&self) -> bool {
        self.options.is_some()
    }

    /// The options text exactly as written in the clause
    pub fn options_raw(&self) -> &str {
        self.options.as_deref().unwrap_or("")
    }

    /// The allowed values, split on whitespace
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.options_raw().split_whitespace()
    }

    /// Whether `value` is acceptable; attributes without options take anything
    pub fn allows(&self, value: &str) -> bool {
        !self.has_options() || self.options().any(|o| o == value)
    }
}

impl fmt::Display for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} : {}",
            self.name,
            self.default_value(),
            self.options_raw()
        )
    }
}

/// One output-generating template line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Always expanded
    Literal(String),
    /// `?attribute=value:pattern:alternative`
    Conditional {
        attribute: String,
        value: String,
        pattern: String,
        alternative: String,
    },
}

impl Pattern {
    pub fn is_conditional(&self) -> bool {
        matches!(self, Pattern::Conditional { .. })
    }

    /// Pick the template to expand, given a lookup for the guard attribute
    pub fn select<F>(&self, lookup: F) -> &str
    where
        F: FnOnce(&str) -> String,
    {
        match self {
            Pattern::Literal(text) => text,
            Pattern::Conditional {
                attribute,
                value,
                pattern,
                alternative,
            } => {
                if lookup(attribute) == *value {
                    pattern
                } else {
                    alternative
                }
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(text) => write!(f, "{}", text),
            Pattern::Conditional {
                attribute,
                value,
                pattern,
                alternative,
            } => write!(f, "{} = {} : {} : {}", attribute, value, pattern, alternative),
        }
    }
}

/// Drawing styles of a relation line; carried through untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineStyle {
    pub base_style: i32,
    pub line_style: i32,
    pub line_width: i32,
    pub end_style: i32,
}

/// Entity-specific header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    /// Category name, e.g. `node` or `agent`
    pub base: String,
    pub icon: i32,
}

/// Relation-specific header fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInfo {
    pub from_base: String,
    pub to_base: String,
    /// An endpoint may carry at most one relation of this class
    pub from_base_unique: bool,
    pub to_base_unique: bool,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetKind {
    Entity(EntityInfo),
    Relation(RelationInfo),
}

/// An immutable class definition parsed from a snippet block
///
/// The attribute list order is the index used by every instance's value list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDefinition {
    name: String,
    unique: bool,
    kind: SnippetKind,
    attributes: Vec<AttributeDefinition>,
    patterns: Vec<Pattern>,
}

impl SnippetDefinition {
    pub fn new(
        name: impl Into<String>,
        unique: bool,
        kind: SnippetKind,
        attributes: Vec<AttributeDefinition>,
        patterns: Vec<Pattern>,
    ) -> Self {
        Self {
            name: name.into(),
            unique,
            kind,
            attributes,
            patterns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// At most one instance of this class may exist in a model
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn kind(&self) -> &SnippetKind {
        &self.kind
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, SnippetKind::Relation(_))
    }

    pub fn entity(&self) -> Option<&EntityInfo> {
        match &self.kind {
            SnippetKind::Entity(info) => Some(info),
            SnippetKind::Relation(_) => None,
        }
    }

    pub fn relation(&self) -> Option<&RelationInfo> {
        match &self.kind {
            SnippetKind::Relation(info) => Some(info),
            SnippetKind::Entity(_) => None,
        }
    }

    /// Category name of an entity class
    pub fn base(&self) -> Option<&str> {
        self.entity().map(|e| e.base.as_str())
    }

    pub fn attributes(&self) -> &[AttributeDefinition] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&AttributeDefinition> {
        self.attributes.get(index)
    }

    /// Position of the first attribute called `name`
    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Initial values for a fresh instance
    pub fn default_values(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|a| a.default_value().to_string())
            .collect()
    }
}

impl fmt::Display for SnippetDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for attribute in &self.attributes {
            writeln!(f, "  {}", attribute)?;
        }
        writeln!(f, "begin")?;
        for pattern in &self.patterns {
            writeln!(f, "  {}", pattern)?;
        }
        writeln!(f, "end")
    }
}
