//! Error types for model edits

use thiserror::Error;

use super::InstanceId;

/// Errors that can occur while editing a [`World`](super::World)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Another instance already uses this name
    #[error("an object named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("no object with id {id:?}")]
    UnknownInstance { id: InstanceId },

    #[error("array index {index} is out of range ({count} arrays defined)")]
    UnknownArray { index: usize, count: usize },

    #[error("class '{class}' has no attribute '{attribute}'")]
    UnknownAttribute { class: String, attribute: String },

    /// The value is not among the attribute's declared options
    #[error("'{value}' is not an option of {class}.{attribute} (options: {options})")]
    InvalidOption {
        class: String,
        attribute: String,
        value: String,
        options: String,
    },

    /// A class marked unique already has an instance
    #[error("class '{class}' allows a single instance")]
    UniqueClass { class: String },

    #[error("class '{class}' is a relation and needs two endpoints")]
    RelationClass { class: String },

    #[error("class '{class}' is not a relation")]
    NotARelation { class: String },

    #[error("relations connect entities, but '{name}' is a relation")]
    EndpointNotEntity { name: String },

    /// Endpoint category does not match the relation's fromBase/toBase
    #[error("'{class}' expects a '{expected}' {side} endpoint, got '{found}'")]
    EndpointMismatch {
        class: String,
        side: &'static str,
        expected: String,
        found: String,
    },

    #[error("a relation cannot connect '{name}' to itself")]
    SelfRelation { name: String },

    /// Base-unique endpoint already carries a relation of this class
    #[error("'{name}' already has a '{class}' relation")]
    EndpointTaken { name: String, class: String },

    /// Names become script variables, so they must be a single non-empty word
    #[error("'{name}' is not a valid object name")]
    InvalidName { name: String },

    #[error("the environment object cannot be removed")]
    EnvironmentRemoval,

    #[error("the environment object cannot be replicated over an array")]
    EnvironmentArray,

    #[error("the environment class '{class}' must be an entity")]
    EnvironmentNotEntity { class: String },
}

impl WorldError {
    pub(crate) fn unknown(id: InstanceId) -> Self {
        Self::UnknownInstance { id }
    }

    pub(crate) fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }
}
