//! Emission order of instances in an assembled script

use crate::world::{InstanceKind, ObjectInstance, World};

/// Entity category derived from a snippet's icon id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconClass {
    Node,
    Agent,
    Application,
    Timer,
    Generic,
    Other,
}

impl IconClass {
    pub fn from_icon(icon: i32) -> Self {
        match icon {
            0 => IconClass::Node,
            1 => IconClass::Agent,
            2 => IconClass::Application,
            3 => IconClass::Timer,
            4 => IconClass::Generic,
            _ => IconClass::Other,
        }
    }

    /// Category of an instance; relations have none
    pub fn of(instance: &ObjectInstance) -> Option<Self> {
        instance
            .snippet()
            .entity()
            .map(|info| IconClass::from_icon(info.icon))
    }

    fn entity_rank(self) -> u32 {
        match self {
            IconClass::Node => 1,
            IconClass::Agent => 3,
            IconClass::Application => 5,
            IconClass::Timer => 7,
            IconClass::Generic => 9,
            IconClass::Other => 11,
        }
    }
}

fn relation_rank(from: Option<IconClass>, to: Option<IconClass>) -> u32 {
    use IconClass::*;

    match (from, to) {
        (Some(Node), Some(Node)) => 2,
        (Some(Node), Some(Agent)) | (Some(Agent), Some(Node)) | (Some(Agent), Some(Agent)) => 4,
        (Some(Agent), Some(Application)) | (Some(Application), Some(Agent)) => 6,
        (Some(Timer), _) | (_, Some(Timer)) => 8,
        _ => 10,
    }
}

/// Sort key: topology first, then what depends on it; each relation tier
/// follows the entities it connects
pub fn rank(world: &World, instance: &ObjectInstance) -> u32 {
    match instance.kind() {
        InstanceKind::Entity => IconClass::of(instance)
            .unwrap_or(IconClass::Other)
            .entity_rank(),
        InstanceKind::Relation { from, to } => {
            let class = |id| world.get(id).and_then(IconClass::of);
            relation_rank(class(from), class(to))
        }
    }
}

/// Environment first, then every other instance by `(rank, name)`
pub fn ordered(world: &World) -> Vec<&ObjectInstance> {
    let environment = world.environment();
    let mut rest: Vec<(u32, &ObjectInstance)> = world
        .instances()
        .skip(1)
        .map(|o| (rank(world, o), o))
        .collect();
    rest.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.name().cmp(b.name())));

    std::iter::once(environment)
        .chain(rest.into_iter().map(|(_, o)| o))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::parser::{parse_snippet, SnippetDefinition};

    fn snippet(block: &str) -> Arc<SnippetDefinition> {
        Arc::new(parse_snippet(block).expect("Should parse"))
    }

    #[test]
    fn test_icon_classes() {
        assert_eq!(IconClass::from_icon(0), IconClass::Node);
        assert_eq!(IconClass::from_icon(3), IconClass::Timer);
        assert_eq!(IconClass::from_icon(42), IconClass::Other);
        assert_eq!(IconClass::from_icon(-1), IconClass::Other);
    }

    #[test]
    fn test_relation_ranks() {
        use IconClass::*;
        assert_eq!(relation_rank(Some(Node), Some(Node)), 2);
        assert_eq!(relation_rank(Some(Agent), Some(Node)), 4);
        assert_eq!(relation_rank(Some(Agent), Some(Agent)), 4);
        assert_eq!(relation_rank(Some(Application), Some(Agent)), 6);
        assert_eq!(relation_rank(Some(Application), Some(Timer)), 8);
        assert_eq!(relation_rank(Some(Timer), Some(Generic)), 8);
        assert_eq!(relation_rank(Some(Generic), Some(Generic)), 10);
        assert_eq!(relation_rank(None, Some(Node)), 10);
    }

    #[test]
    fn test_ordering_is_by_rank_then_name() {
        let env = snippet("!entity Simulator env 4 : begin end");
        let node = snippet("entity Node node 0 : begin end");
        let agent = snippet("entity TCP agent 1 : begin end");
        let app = snippet("entity FTP app 2 : begin end");
        let attach = snippet("relation Attach agent node 0 0 1 0 : begin end");
        let link = snippet("relation Link node node 0 0 1 0 : begin end");

        let mut world = World::new(env, "ns").unwrap();
        let ftp = world.add_entity(app, "ftp").unwrap();
        let tcp = world.add_entity(agent, "tcp").unwrap();
        let b = world.add_entity(Arc::clone(&node), "b").unwrap();
        let a = world.add_entity(node, "a").unwrap();
        world.add_relation(attach, "attach", tcp, a).unwrap();
        world.add_relation(link, "link", a, b).unwrap();
        let _ = ftp;

        let names: Vec<&str> = ordered(&world).iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["ns", "a", "b", "link", "tcp", "attach", "ftp"]);
    }

    #[test]
    fn test_environment_stays_first() {
        let env = snippet("!entity Zzz other 9 : begin end");
        let node = snippet("entity Node node 0 : begin end");
        let mut world = World::new(env, "zz").unwrap();
        world.add_entity(node, "a").unwrap();

        let names: Vec<&str> = ordered(&world).iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["zz", "a"]);
    }
}
