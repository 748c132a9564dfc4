//! Attribute value resolution for inline tags

use crate::messages::MessageCatalog;
use crate::world::{InstanceId, InstanceKind, ObjectInstance, World};

/// Resolves inline tag tokens against instances of one world
#[derive(Debug, Clone, Copy)]
pub struct ValueResolver<'w> {
    world: &'w World,
    messages: &'w MessageCatalog,
}

impl<'w> ValueResolver<'w> {
    pub fn new(world: &'w World, messages: &'w MessageCatalog) -> Self {
        Self { world, messages }
    }

    /// Value of `token` for `instance`; first match wins:
    ///
    /// 1. a token containing `env` resolves what follows `env.` against the
    ///    environment object
    /// 2. `from` / `to` on a relation give the endpoint's qualified name
    /// 3. `name` gives the instance's qualified name
    /// 4. an attribute of the instance's class gives its current value
    ///
    /// Anything else yields the catalog's not-found sentinel.
    pub fn resolve(&self, instance: &ObjectInstance, token: &str) -> String {
        if let Some(i) = token.find("env") {
            let rest = token.get(i + 4..).unwrap_or("");
            return self.resolve(self.world.environment(), rest);
        }

        if let InstanceKind::Relation { from, to } = instance.kind() {
            match token {
                "from" => return self.endpoint_name(from, token),
                "to" => return self.endpoint_name(to, token),
                _ => {}
            }
        }

        if token == "name" {
            return self.qualified_name(instance);
        }

        match instance.attribute(token) {
            Some(value) => value.to_string(),
            None => self.messages.not_found(token),
        }
    }

    /// `name($array)` for replicated instances, plain `name` otherwise
    pub fn qualified_name(&self, instance: &ObjectInstance) -> String {
        match instance.array_index().and_then(|i| self.world.array(i)) {
            Some(array) => format!("{}(${})", instance.name(), array.name),
            None => instance.name().to_string(),
        }
    }

    fn endpoint_name(&self, id: InstanceId, token: &str) -> String {
        match self.world.get(id) {
            Some(endpoint) => self.qualified_name(endpoint),
            None => self.messages.not_found(token),
        }
    }
}
