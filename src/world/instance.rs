//! Object instances and array definitions

use std::sync::Arc;

use crate::parser::SnippetDefinition;

/// Stable handle to an instance; survives removal of other instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub(crate) usize);

/// Entity or relation; relations reference their two endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Entity,
    Relation { from: InstanceId, to: InstanceId },
}

/// A class instantiation inside a [`World`](super::World)
#[derive(Debug, Clone)]
pub struct ObjectInstance {
    id: InstanceId,
    snippet: Arc<SnippetDefinition>,
    name: String,
    array_index: Option<usize>,
    values: Vec<String>,
    kind: InstanceKind,
}

impl ObjectInstance {
    /// New instance with every attribute at its default
    pub(crate) fn new(
        id: InstanceId,
        snippet: Arc<SnippetDefinition>,
        name: String,
        kind: InstanceKind,
    ) -> Self {
        let values = snippet.default_values();
        Self {
            id,
            snippet,
            name,
            array_index: None,
            values,
            kind,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn snippet(&self) -> &Arc<SnippetDefinition> {
        &self.snippet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index into the world's array list, if this instance is replicated
    pub fn array_index(&self) -> Option<usize> {
        self.array_index
    }

    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    pub fn is_relation(&self) -> bool {
        matches!(self.kind, InstanceKind::Relation { .. })
    }

    /// `(from, to)` for relations
    pub fn endpoints(&self) -> Option<(InstanceId, InstanceId)> {
        match self.kind {
            InstanceKind::Relation { from, to } => Some((from, to)),
            InstanceKind::Entity => None,
        }
    }

    pub fn references(&self, id: InstanceId) -> bool {
        self.endpoints()
            .is_some_and(|(from, to)| from == id || to == id)
    }

    /// Attribute values in the snippet's attribute order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at `index`, empty when out of range
    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    /// Value of the first attribute called `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.snippet
            .attribute_index(name)
            .map(|index| self.value(index))
    }

    pub(crate) fn values_mut(&mut self) -> &mut [String] {
        &mut self.values
    }

    pub(crate) fn set_value(&mut self, index: usize, value: String) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub(crate) fn reset_values(&mut self) {
        self.values = self.snippet.default_values();
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_array_index(&mut self, index: Option<usize>) {
        self.array_index = index;
    }

    /// Adjust after the array at `removed` was deleted
    pub(crate) fn array_removed(&mut self, removed: usize) {
        self.array_index = match self.array_index {
            Some(i) if i == removed => None,
            Some(i) if i > removed => Some(i - 1),
            other => other,
        };
    }
}

/// A named replication count; instances on it are emitted inside a loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDefinition {
    /// Also the loop variable name
    pub name: String,
    pub elements: usize,
}

impl ArrayDefinition {
    pub fn new(name: impl Into<String>, elements: usize) -> Self {
        Self {
            name: name.into(),
            elements,
        }
    }
}
