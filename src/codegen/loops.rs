//! Loop wrapping for array-replicated instances

use tracing::warn;

use super::config::LoopStyle;
use crate::world::{ArrayDefinition, InstanceKind, ObjectInstance, World};

/// Text placed around an instance's body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopFrame {
    pub preamble: String,
    pub epilogue: String,
}

impl LoopFrame {
    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty() && self.epilogue.is_empty()
    }

    pub fn wrap(&self, body: &str) -> String {
        format!("{}{}{}", self.preamble, body, self.epilogue)
    }
}

fn header(array: &ArrayDefinition) -> String {
    format!(
        "for {{set {name} 0}} {{${name}<{n}}} {{incr {name}}} {{\n",
        name = array.name,
        n = array.elements
    )
}

fn lookup<'w>(world: &'w World, index: Option<usize>, owner: &str) -> Option<&'w ArrayDefinition> {
    let index = index?;
    let array = world.array(index);
    if array.is_none() {
        warn!(instance = owner, index, "Array index out of range, loop skipped");
    }
    array
}

/// Loops an instance needs: its own array if it has one, otherwise the
/// arrays of a relation's endpoints
pub fn frame(world: &World, instance: &ObjectInstance, style: LoopStyle) -> LoopFrame {
    if instance.array_index().is_some() {
        return match lookup(world, instance.array_index(), instance.name()) {
            Some(array) => single(array),
            None => LoopFrame::default(),
        };
    }

    let InstanceKind::Relation { from, to } = instance.kind() else {
        return LoopFrame::default();
    };
    let from = world.get(from).and_then(|o| o.array_index());
    let to = world.get(to).and_then(|o| o.array_index());

    if from.is_some() && from == to {
        return match lookup(world, from, instance.name()) {
            Some(array) => single(array),
            None => LoopFrame::default(),
        };
    }

    let outer = lookup(world, from, instance.name());
    let inner = lookup(world, to, instance.name());
    match style {
        LoopStyle::Nested => nested(outer, inner),
        LoopStyle::Legacy => legacy(outer, inner),
    }
}

fn single(array: &ArrayDefinition) -> LoopFrame {
    LoopFrame {
        preamble: header(array),
        epilogue: "}\n".to_string(),
    }
}

/// Inner loop indented under the outer one and closed first
fn nested(outer: Option<&ArrayDefinition>, inner: Option<&ArrayDefinition>) -> LoopFrame {
    match (outer, inner) {
        (Some(outer), Some(inner)) => LoopFrame {
            preamble: format!("{}  {}", header(outer), header(inner)),
            epilogue: "  }\n}\n".to_string(),
        },
        (Some(array), None) | (None, Some(array)) => single(array),
        (None, None) => LoopFrame::default(),
    }
}

/// The `to` loop is indented but both closers are emitted in opening order
fn legacy(outer: Option<&ArrayDefinition>, inner: Option<&ArrayDefinition>) -> LoopFrame {
    let mut frame = LoopFrame::default();
    if let Some(array) = outer {
        frame.preamble.push_str(&header(array));
        frame.epilogue.push_str("}\n");
    }
    if let Some(array) = inner {
        frame.preamble.push_str("  ");
        frame.preamble.push_str(&header(array));
        frame.epilogue.push_str("  }\n");
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(name: &str, n: usize) -> ArrayDefinition {
        ArrayDefinition::new(name, n)
    }

    #[test]
    fn test_header_text() {
        assert_eq!(header(&arr("i", 5)), "for {set i 0} {$i<5} {incr i} {\n");
    }

    #[test]
    fn test_single_loop_wraps_body() {
        let frame = single(&arr("i", 5));
        assert_eq!(
            frame.wrap("set n1($i) [new Node]\n").trim(),
            "for {set i 0} {$i<5} {incr i} {\nset n1($i) [new Node]\n}"
        );
    }

    #[test]
    fn test_nested_closes_inner_first() {
        let (i, j) = (arr("i", 2), arr("j", 3));
        let frame = nested(Some(&i), Some(&j));
        assert_eq!(
            frame.wrap("body\n"),
            "for {set i 0} {$i<2} {incr i} {\n  for {set j 0} {$j<3} {incr j} {\nbody\n  }\n}\n"
        );
    }

    #[test]
    fn test_legacy_keeps_opening_order() {
        let (i, j) = (arr("i", 2), arr("j", 3));
        let frame = legacy(Some(&i), Some(&j));
        assert_eq!(frame.epilogue, "}\n  }\n");

        let only_to = legacy(None, Some(&j));
        assert_eq!(only_to.preamble, "  for {set j 0} {$j<3} {incr j} {\n");
        assert_eq!(only_to.epilogue, "  }\n");
    }

    #[test]
    fn test_one_sided_nested_is_single() {
        let j = arr("j", 3);
        assert_eq!(nested(None, Some(&j)), single(&j));
        assert!(nested(None, None).is_empty());
    }
}
