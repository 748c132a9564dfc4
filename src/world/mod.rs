//! The object model: instances, relations and arrays
//!
//! A [`World`] owns an ordered list of instances with the environment object
//! fixed at position 0, plus the array definitions instances can be
//! replicated over. All edits go through methods that keep the model's
//! invariants: unique names, valid array indices, relation endpoints of the
//! right category, and no relation left pointing at a removed entity.
//!
//! The generator reads a `World` through a shared borrow. Editors must not
//! interleave mutations with a generation call; the borrow checker enforces
//! this within one thread, and callers sharing a `World` across threads must
//! serialize access themselves.

mod error;
mod instance;

use std::sync::Arc;

use tracing::debug;

use crate::parser::SnippetDefinition;

pub use error::WorldError;
pub use instance::{ArrayDefinition, InstanceId, InstanceKind, ObjectInstance};

/// Name given to the environment by [`World::reset`]
pub const DEFAULT_ENVIRONMENT_NAME: &str = "ns";

#[derive(Debug, Clone)]
pub struct World {
    instances: Vec<ObjectInstance>,
    arrays: Vec<ArrayDefinition>,
    next_id: usize,
}

impl World {
    /// Create a model holding only the environment object
    pub fn new(
        environment: Arc<SnippetDefinition>,
        name: impl Into<String>,
    ) -> Result<Self, WorldError> {
        if environment.is_relation() {
            return Err(WorldError::EnvironmentNotEntity {
                class: environment.name().to_string(),
            });
        }

        let name = name.into();
        check_name_syntax(&name)?;
        let env = ObjectInstance::new(InstanceId(0), environment, name, InstanceKind::Entity);
        Ok(Self {
            instances: vec![env],
            arrays: Vec::new(),
            next_id: 1,
        })
    }

    /// The environment object (always present, always first)
    pub fn environment(&self) -> &ObjectInstance {
        &self.instances[0]
    }

    /// Instances in insertion order, environment first
    pub fn instances(&self) -> impl Iterator<Item = &ObjectInstance> {
        self.instances.iter()
    }

    pub(crate) fn instances_mut(&mut self) -> impl Iterator<Item = &mut ObjectInstance> {
        self.instances.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Never true: the environment is always present
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, id: InstanceId) -> Option<&ObjectInstance> {
        self.instances.iter().find(|o| o.id() == id)
    }

    fn get_mut(&mut self, id: InstanceId) -> Result<&mut ObjectInstance, WorldError> {
        self.instances
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or(WorldError::unknown(id))
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ObjectInstance> {
        self.instances.iter().find(|o| o.name() == name)
    }

    /// Whether `name` is free for a new instance
    pub fn is_valid_name(&self, name: &str) -> bool {
        self.get_by_name(name).is_none()
    }

    /// Whether any instance of the class called `class` exists
    pub fn has_instance_of(&self, class: &str) -> bool {
        self.instances.iter().any(|o| o.snippet().name() == class)
    }

    /// Smallest free `{class}{i}` name
    pub fn fresh_name(&self, class: &str) -> String {
        (0..)
            .map(|i| format!("{}{}", class, i))
            .find(|name| self.is_valid_name(name))
            .unwrap_or_else(|| class.to_string())
    }

    fn allocate_id(&mut self) -> InstanceId {
        let id = InstanceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity with a generated name
    pub fn instantiate(&mut self, snippet: Arc<SnippetDefinition>) -> Result<InstanceId, WorldError> {
        let name = self.fresh_name(snippet.name());
        self.add_entity(snippet, name)
    }

    /// Add an entity with every attribute at its default
    pub fn add_entity(
        &mut self,
        snippet: Arc<SnippetDefinition>,
        name: impl Into<String>,
    ) -> Result<InstanceId, WorldError> {
        let name = name.into();
        if snippet.is_relation() {
            return Err(WorldError::RelationClass {
                class: snippet.name().to_string(),
            });
        }
        self.check_new_instance(&snippet, &name)?;

        let id = self.allocate_id();
        debug!(class = snippet.name(), %name, "adding entity");
        self.instances
            .push(ObjectInstance::new(id, snippet, name, InstanceKind::Entity));
        Ok(id)
    }

    /// Add a relation with a generated name
    pub fn connect(
        &mut self,
        snippet: Arc<SnippetDefinition>,
        from: InstanceId,
        to: InstanceId,
    ) -> Result<InstanceId, WorldError> {
        let name = self.fresh_name(snippet.name());
        self.add_relation(snippet, name, from, to)
    }

    /// Add a relation between two entities
    ///
    /// The endpoints' categories must match the relation's `fromBase` and
    /// `toBase`; a base-unique endpoint may carry one relation of the class.
    pub fn add_relation(
        &mut self,
        snippet: Arc<SnippetDefinition>,
        name: impl Into<String>,
        from: InstanceId,
        to: InstanceId,
    ) -> Result<InstanceId, WorldError> {
        let name = name.into();
        let info = snippet.relation().ok_or_else(|| WorldError::NotARelation {
            class: snippet.name().to_string(),
        })?;
        self.check_new_instance(&snippet, &name)?;

        let from_obj = self.get(from).ok_or(WorldError::unknown(from))?;
        let to_obj = self.get(to).ok_or(WorldError::unknown(to))?;
        if from == to {
            return Err(WorldError::SelfRelation {
                name: from_obj.name().to_string(),
            });
        }

        for (side, obj, expected) in [("from", from_obj, &info.from_base), ("to", to_obj, &info.to_base)] {
            let found = obj.snippet().base().ok_or_else(|| WorldError::EndpointNotEntity {
                name: obj.name().to_string(),
            })?;
            if found != expected.as_str() {
                return Err(WorldError::EndpointMismatch {
                    class: snippet.name().to_string(),
                    side,
                    expected: expected.clone(),
                    found: found.to_string(),
                });
            }
        }

        for (unique, endpoint) in [(info.from_base_unique, from), (info.to_base_unique, to)] {
            if unique && self.relation_of_class_exists(endpoint, snippet.name()) {
                let name = self.get(endpoint).map(|o| o.name().to_string()).unwrap_or_default();
                return Err(WorldError::EndpointTaken {
                    name,
                    class: snippet.name().to_string(),
                });
            }
        }

        let id = self.allocate_id();
        debug!(class = snippet.name(), %name, "adding relation");
        self.instances.push(ObjectInstance::new(
            id,
            snippet,
            name,
            InstanceKind::Relation { from, to },
        ));
        Ok(id)
    }

    fn check_new_instance(&self, snippet: &SnippetDefinition, name: &str) -> Result<(), WorldError> {
        if snippet.is_unique() && self.has_instance_of(snippet.name()) {
            return Err(WorldError::UniqueClass {
                class: snippet.name().to_string(),
            });
        }
        check_name_syntax(name)?;
        if !self.is_valid_name(name) {
            return Err(WorldError::duplicate(name));
        }
        Ok(())
    }

    /// Whether `endpoint` takes part in a relation of class `class`
    pub fn relation_of_class_exists(&self, endpoint: InstanceId, class: &str) -> bool {
        self.instances
            .iter()
            .any(|o| o.snippet().name() == class && o.references(endpoint))
    }

    /// Set an attribute by name, honoring its declared options
    pub fn set_attribute(
        &mut self,
        id: InstanceId,
        attribute: &str,
        value: impl Into<String>,
    ) -> Result<(), WorldError> {
        let value = value.into();
        let obj = self.get_mut(id)?;
        let snippet = Arc::clone(obj.snippet());
        let index = snippet
            .attribute_index(attribute)
            .ok_or_else(|| WorldError::UnknownAttribute {
                class: snippet.name().to_string(),
                attribute: attribute.to_string(),
            })?;

        if let Some(def) = snippet.attribute(index) {
            if !def.allows(&value) {
                return Err(WorldError::InvalidOption {
                    class: snippet.name().to_string(),
                    attribute: attribute.to_string(),
                    value,
                    options: def.options_raw().trim().to_string(),
                });
            }
        }

        obj.set_value(index, value);
        Ok(())
    }

    pub fn attribute(&self, id: InstanceId, attribute: &str) -> Option<&str> {
        self.get(id).and_then(|o| o.attribute(attribute))
    }

    pub fn rename(&mut self, id: InstanceId, name: impl Into<String>) -> Result<(), WorldError> {
        let name = name.into();
        if self.get(id).is_some_and(|o| o.name() == name) {
            return Ok(());
        }
        check_name_syntax(&name)?;
        if !self.is_valid_name(&name) {
            return Err(WorldError::duplicate(name));
        }
        self.get_mut(id)?.set_name(name);
        Ok(())
    }

    /// Remove an instance together with every relation referencing it
    ///
    /// Returns the ids that were removed, the requested one first.
    pub fn remove_instance(&mut self, id: InstanceId) -> Result<Vec<InstanceId>, WorldError> {
        if id == self.environment().id() {
            return Err(WorldError::EnvironmentRemoval);
        }
        if self.get(id).is_none() {
            return Err(WorldError::unknown(id));
        }

        let mut removed = vec![id];
        removed.extend(
            self.instances
                .iter()
                .filter(|o| o.references(id))
                .map(|o| o.id()),
        );
        self.instances.retain(|o| !removed.contains(&o.id()));
        debug!(?removed, "removed instances");
        Ok(removed)
    }

    /// Drop every instance but the environment and every array; the
    /// environment returns to its defaults under the default name
    pub fn reset(&mut self) {
        self.instances.truncate(1);
        self.arrays.clear();
        let env = &mut self.instances[0];
        env.reset_values();
        env.set_name(DEFAULT_ENVIRONMENT_NAME.to_string());
    }

    /// Define a new array, returning its index
    pub fn add_array(&mut self, name: impl Into<String>, elements: usize) -> usize {
        self.arrays.push(ArrayDefinition::new(name, elements));
        self.arrays.len() - 1
    }

    pub fn array(&self, index: usize) -> Option<&ArrayDefinition> {
        self.arrays.get(index)
    }

    pub fn arrays(&self) -> &[ArrayDefinition] {
        &self.arrays
    }

    pub fn array_index_of(&self, name: &str) -> Option<usize> {
        self.arrays.iter().position(|a| a.name == name)
    }

    pub fn resize_array(&mut self, index: usize, elements: usize) -> Result<(), WorldError> {
        let count = self.arrays.len();
        let array = self
            .arrays
            .get_mut(index)
            .ok_or(WorldError::UnknownArray { index, count })?;
        array.elements = elements;
        Ok(())
    }

    /// Remove an array; instances on it lose their index, later indices shift
    pub fn remove_array(&mut self, index: usize) -> Result<ArrayDefinition, WorldError> {
        if index >= self.arrays.len() {
            return Err(WorldError::UnknownArray {
                index,
                count: self.arrays.len(),
            });
        }
        let removed = self.arrays.remove(index);
        for obj in &mut self.instances {
            obj.array_removed(index);
        }
        Ok(removed)
    }

    pub fn set_array_index(&mut self, id: InstanceId, index: Option<usize>) -> Result<(), WorldError> {
        if id == self.environment().id() && index.is_some() {
            return Err(WorldError::EnvironmentArray);
        }
        if let Some(index) = index {
            if index >= self.arrays.len() {
                return Err(WorldError::UnknownArray {
                    index,
                    count: self.arrays.len(),
                });
            }
        }
        self.get_mut(id)?.set_array_index(index);
        Ok(())
    }
}

fn check_name_syntax(name: &str) -> Result<(), WorldError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(WorldError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
