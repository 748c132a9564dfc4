//! Per-instance code generation and whole-script assembly

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::config::GeneratorConfig;
use super::hooks::PrePass;
use super::loops;
use super::precedence;
use super::resolver::ValueResolver;
use super::substitute::expand;
use crate::world::{ObjectInstance, World};

/// Turns a [`World`] into script text
///
/// Generation reads the world through a shared borrow and never fails:
/// unresolved tags and malformed patterns become inline diagnostic text.
/// Only the registered pre-passes write to the world, and they all finish
/// in [`Generator::prepare`] before any pattern is expanded.
pub struct Generator {
    config: GeneratorConfig,
    pre_passes: BTreeMap<String, Box<dyn PrePass>>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("pre_passes", &self.pre_passes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            pre_passes: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run `pass` on every instance of the class called `snippet`;
    /// replaces any pass already registered for that class
    pub fn register_pre_pass(&mut self, snippet: impl Into<String>, pass: impl PrePass + 'static) {
        self.pre_passes.insert(snippet.into(), Box::new(pass));
    }

    pub fn with_pre_pass(mut self, snippet: impl Into<String>, pass: impl PrePass + 'static) -> Self {
        self.register_pre_pass(snippet, pass);
        self
    }

    pub fn has_pre_passes(&self) -> bool {
        !self.pre_passes.is_empty()
    }

    /// Apply the registered pre-passes to the instances of their classes
    pub fn prepare(&self, world: &mut World) {
        if self.pre_passes.is_empty() {
            return;
        }
        for instance in world.instances_mut() {
            let Some(pass) = self.pre_passes.get(instance.snippet().name()) else {
                continue;
            };
            let name = instance.name().to_string();
            debug!(instance = %name, class = instance.snippet().name(), "Running pre-pass");
            pass.apply(&name, instance.values_mut());
        }
    }

    /// Script text for one instance
    ///
    /// Empty when every pattern expands to whitespace, even if the instance
    /// sits on an array.
    pub fn to_text(&self, world: &World, instance: &ObjectInstance) -> String {
        let resolver = ValueResolver::new(world, &self.config.messages);
        let mut body = String::new();

        for pattern in instance.snippet().patterns() {
            let template = pattern.select(|attribute| resolver.resolve(instance, attribute));
            let line = self.expand_line(&resolver, instance, template);
            if !line.trim().is_empty() {
                body.push_str(&line);
                body.push('\n');
            }
        }

        if body.trim().is_empty() {
            return String::new();
        }

        loops::frame(world, instance, self.config.loop_style)
            .wrap(&body)
            .trim()
            .to_string()
    }

    fn expand_line(&self, resolver: &ValueResolver<'_>, instance: &ObjectInstance, template: &str) -> String {
        expand(template, self.config.separator, |tag| resolver.resolve(instance, tag)).unwrap_or_else(|err| {
            debug!(instance = instance.name(), %err, "Malformed pattern");
            self.config.messages.bad_pattern().to_string()
        })
    }

    /// Run the pre-passes, then assemble the script
    pub fn assemble(&self, world: &mut World) -> String {
        self.prepare(world);
        self.assemble_prepared(world)
    }

    /// Assemble without running pre-passes
    ///
    /// Instances are emitted environment first, then by category rank and
    /// name; the script ends by running the environment.
    pub fn assemble_prepared(&self, world: &World) -> String {
        let mut parts: Vec<String> = precedence::ordered(world)
            .into_iter()
            .map(|instance| self.to_text(world, instance))
            .filter(|text| !text.is_empty())
            .collect();
        parts.push(format!("${} run", world.environment().name()));
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codegen::{DistinctColors, LoopStyle};
    use crate::messages::MessageCatalog;
    use crate::parser::{parse_snippet, SnippetDefinition};

    fn snippet(block: &str) -> Arc<SnippetDefinition> {
        Arc::new(parse_snippet(block).expect("Should parse"))
    }

    fn env() -> Arc<SnippetDefinition> {
        snippet("!entity Simulator env 4 : begin set #name# [new Simulator]; end")
    }

    fn node() -> Arc<SnippetDefinition> {
        snippet("entity Node node 0 : begin set #name# [new Node]; end")
    }

    #[test]
    fn test_plain_entity() {
        let mut world = World::new(env(), "ns").unwrap();
        let n0 = world.add_entity(node(), "n0").unwrap();
        let text = Generator::default().to_text(&world, world.get(n0).unwrap());
        assert_eq!(text, "set n0 [new Node]");
    }

    #[test]
    fn test_array_entity_is_looped() {
        let mut world = World::new(env(), "ns").unwrap();
        let n1 = world.add_entity(node(), "n1").unwrap();
        let i = world.add_array("i", 5);
        world.set_array_index(n1, Some(i)).unwrap();

        let text = Generator::default().to_text(&world, world.get(n1).unwrap());
        assert_eq!(text, "for {set i 0} {$i<5} {incr i} {\nset n1($i) [new Node]\n}");
    }

    #[test]
    fn test_empty_body_elides_loop() {
        let quiet = snippet("entity Quiet node 0 : x; begin  #x# ; end");
        let mut world = World::new(env(), "ns").unwrap();
        let q = world.add_entity(quiet, "q").unwrap();
        let i = world.add_array("i", 3);
        world.set_array_index(q, Some(i)).unwrap();

        assert_eq!(Generator::default().to_text(&world, world.get(q).unwrap()), "");
    }

    #[test]
    fn test_conditional_pattern() {
        let queue = snippet(
            "entity Queue node 0 : kind=drop:drop red; begin ?kind=red:use RED:use DropTail; end",
        );
        let mut world = World::new(env(), "ns").unwrap();
        let q = world.add_entity(queue, "q").unwrap();
        let generator = Generator::default();

        assert_eq!(generator.to_text(&world, world.get(q).unwrap()), "use DropTail");
        world.set_attribute(q, "kind", "red").unwrap();
        assert_eq!(generator.to_text(&world, world.get(q).unwrap()), "use RED");
    }

    #[test]
    fn test_bad_pattern_uses_catalog_text() {
        let broken = snippet("entity Broken node 0 : begin set #name [new Node]; ok #name#; end");
        let mut world = World::new(env(), "ns").unwrap();
        let b = world.add_entity(broken, "b").unwrap();

        let config = GeneratorConfig::new()
            .with_messages(MessageCatalog::default().with_bad_pattern("# broken"));
        let text = Generator::new(config).to_text(&world, world.get(b).unwrap());
        assert_eq!(text, "# broken\nok b");
    }

    fn dual_array_world() -> World {
        let link = snippet("relation Link node node 0 0 1 0 : begin $ns duplex-link #from# #to#; end");
        let mut world = World::new(env(), "ns").unwrap();
        let a = world.add_entity(node(), "a").unwrap();
        let b = world.add_entity(node(), "b").unwrap();
        let i = world.add_array("i", 2);
        let j = world.add_array("j", 3);
        world.set_array_index(a, Some(i)).unwrap();
        world.set_array_index(b, Some(j)).unwrap();
        world.add_relation(link, "l", a, b).unwrap();
        world
    }

    #[test]
    fn test_dual_array_relation_nested() {
        let world = dual_array_world();
        let link = world.get_by_name("l").unwrap();
        assert_eq!(
            Generator::default().to_text(&world, link),
            "for {set i 0} {$i<2} {incr i} {\n  for {set j 0} {$j<3} {incr j} {\n$ns duplex-link a($i) b($j)\n  }\n}"
        );
    }

    #[test]
    fn test_dual_array_relation_legacy() {
        let world = dual_array_world();
        let link = world.get_by_name("l").unwrap();
        let generator = Generator::new(GeneratorConfig::new().with_loop_style(LoopStyle::Legacy));
        assert_eq!(
            generator.to_text(&world, link),
            "for {set i 0} {$i<2} {incr i} {\n  for {set j 0} {$j<3} {incr j} {\n$ns duplex-link a($i) b($j)\n}\n  }"
        );
    }

    #[test]
    fn test_shared_array_relation_single_loop() {
        let link = snippet("relation Link node node 0 0 1 0 : begin link #from# #to#; end");
        let mut world = World::new(env(), "ns").unwrap();
        let a = world.add_entity(node(), "a").unwrap();
        let b = world.add_entity(node(), "b").unwrap();
        let i = world.add_array("i", 4);
        world.set_array_index(a, Some(i)).unwrap();
        world.set_array_index(b, Some(i)).unwrap();
        let l = world.add_relation(link, "l", a, b).unwrap();

        assert_eq!(
            Generator::default().to_text(&world, world.get(l).unwrap()),
            "for {set i 0} {$i<4} {incr i} {\nlink a($i) b($i)\n}"
        );
    }

    #[test]
    fn test_assemble_orders_and_runs() {
        let link = snippet("relation Link node node 0 0 1 0 : begin $ns link #from# #to#; end");
        let mut world = World::new(env(), "sim").unwrap();
        let b = world.add_entity(node(), "b").unwrap();
        let a = world.add_entity(node(), "a").unwrap();
        world.add_relation(link, "l", a, b).unwrap();

        let script = Generator::default().assemble(&mut world);
        assert_eq!(
            script,
            "set sim [new Simulator]\nset a [new Node]\nset b [new Node]\n$ns link a b\n$sim run"
        );
    }

    #[test]
    fn test_pre_pass_runs_only_for_registered_class() {
        let colors = snippet("entity Colors generic 4 : c1=red; c2=red; begin #c1# #c2#; end");
        let other = snippet("entity Other generic 4 : c1=red; c2=red; begin #c1# #c2#; end");
        let mut world = World::new(env(), "ns").unwrap();
        let c = world.add_entity(colors, "c").unwrap();
        let o = world.add_entity(other, "o").unwrap();

        let generator = Generator::default().with_pre_pass("Colors", DistinctColors);
        generator.assemble(&mut world);

        assert_eq!(world.attribute(c, "c2"), Some("black"));
        assert_eq!(world.attribute(o, "c2"), Some("red"));
    }

    #[test]
    fn test_debug_lists_registered_passes() {
        let generator = Generator::default().with_pre_pass("Colors", DistinctColors);
        assert!(format!("{:?}", generator).contains("\"Colors\""));
    }
}
