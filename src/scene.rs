//! TOML scene descriptions
//!
//! A scene lists the objects of a model by class name so a [`World`] can be
//! built without an editor:
//!
//! ```toml
//! [environment]
//! class = "Simulator"
//! name = "ns"
//!
//! [[arrays]]
//! name = "i"
//! elements = 5
//!
//! [[entities]]
//! class = "Node"
//! name = "n0"
//! array = "i"
//! attributes = { color = "red" }
//!
//! [[relations]]
//! class = "Link"
//! from = "n0"
//! to = "n1"
//! array = "i"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::library::LibraryRegistry;
use crate::parser::SnippetDefinition;
use crate::world::{InstanceId, World, WorldError, DEFAULT_ENVIRONMENT_NAME};

/// Errors that can occur when loading a scene or building its world
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("unknown class: {class}")]
    UnknownClass { class: String },
    #[error("unknown array: {name}")]
    UnknownArray { name: String },
    #[error("unknown instance: {name}")]
    UnknownInstance { name: String },
    #[error(transparent)]
    World(#[from] WorldError),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSpec {
    pub class: String,
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ArraySpec {
    pub name: String,
    pub elements: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    pub class: String,
    /// Generated from the class name when absent
    pub name: Option<String>,
    /// Name of the array to replicate over
    pub array: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RelationSpec {
    pub class: String,
    pub name: Option<String>,
    pub from: String,
    pub to: String,
    /// Replicates the relation itself, independent of its endpoints
    pub array: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// A model description; entities and relations are added in file order
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    pub environment: EnvironmentSpec,
    #[serde(default)]
    pub arrays: Vec<ArraySpec>,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
}

impl Scene {
    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a scene from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        Ok(toml::from_str(content)?)
    }

    /// Instantiate every object against the registered classes
    pub fn build(&self, registry: &LibraryRegistry) -> Result<World, SceneError> {
        let class = |name: &str| -> Result<Arc<SnippetDefinition>, SceneError> {
            registry
                .snippet(name)
                .cloned()
                .ok_or_else(|| SceneError::UnknownClass {
                    class: name.to_string(),
                })
        };

        let env = &self.environment;
        let mut world = World::new(
            class(&env.class)?,
            env.name.as_deref().unwrap_or(DEFAULT_ENVIRONMENT_NAME),
        )?;
        let env_id = world.environment().id();
        set_attributes(&mut world, env_id, &env.attributes)?;

        for array in &self.arrays {
            world.add_array(&array.name, array.elements);
        }

        for entity in &self.entities {
            let snippet = class(&entity.class)?;
            let id = match &entity.name {
                Some(name) => world.add_entity(snippet, name)?,
                None => world.instantiate(snippet)?,
            };
            place_on_array(&mut world, id, entity.array.as_deref())?;
            set_attributes(&mut world, id, &entity.attributes)?;
        }

        for relation in &self.relations {
            let snippet = class(&relation.class)?;
            let from = lookup(&world, &relation.from)?;
            let to = lookup(&world, &relation.to)?;
            let id = match &relation.name {
                Some(name) => world.add_relation(snippet, name, from, to)?,
                None => world.connect(snippet, from, to)?,
            };
            place_on_array(&mut world, id, relation.array.as_deref())?;
            set_attributes(&mut world, id, &relation.attributes)?;
        }

        Ok(world)
    }
}

fn lookup(world: &World, name: &str) -> Result<InstanceId, SceneError> {
    world
        .get_by_name(name)
        .map(|o| o.id())
        .ok_or_else(|| SceneError::UnknownInstance {
            name: name.to_string(),
        })
}

fn place_on_array(world: &mut World, id: InstanceId, array: Option<&str>) -> Result<(), SceneError> {
    let Some(array) = array else {
        return Ok(());
    };
    let index = world
        .array_index_of(array)
        .ok_or_else(|| SceneError::UnknownArray {
            name: array.to_string(),
        })?;
    world.set_array_index(id, Some(index))?;
    Ok(())
}

fn set_attributes(
    world: &mut World,
    id: InstanceId,
    attributes: &BTreeMap<String, String>,
) -> Result<(), SceneError> {
    for (name, value) in attributes {
        world.set_attribute(id, name, value)?;
    }
    Ok(())
}
