//! Minimal scene graph standing in for the 3D rendering collaborator.
//!
//! The frontend registers one node per visual element; selectable
//! property roots are tagged with their property id. Input collaborators
//! report raw intersected nodes, and target resolution walks the
//! containment ancestry until it finds a selectable root.

use crate::models::WorldPosition;

/// Identifier of a node in the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Input modality that produced a selection event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Mouse/pointer click.
    Pointer,
    /// Gaze-cursor fuse.
    Gaze,
    /// Controller trigger pull.
    Trigger,
}

/// A raw intersection reported by an input collaborator.
#[derive(Debug, Clone, Copy)]
pub struct InputEvent {
    /// Which modality fired.
    pub kind: InputKind,
    /// The intersected element, before ancestry resolution.
    pub target: NodeId,
}

#[derive(Debug)]
struct Node {
    parent: Option<NodeId>,
    position: WorldPosition,
    selectable: Option<String>,
}

/// Append-only scene graph owned by the host application.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain (non-selectable) node.
    pub fn add_node(&mut self, parent: Option<NodeId>, position: WorldPosition) -> NodeId {
        self.push(Node {
            parent,
            position,
            selectable: None,
        })
    }

    /// Add a node tagged as the selectable root of a property.
    pub fn add_selectable(
        &mut self,
        parent: Option<NodeId>,
        position: WorldPosition,
        property_id: impl Into<String>,
    ) -> NodeId {
        self.push(Node {
            parent,
            position,
            selectable: Some(property_id.into()),
        })
    }

    /// World position of a node, if it exists.
    pub fn world_position(&self, id: NodeId) -> Option<WorldPosition> {
        self.nodes.get(id.0).map(|node| node.position)
    }

    /// Walk the containment ancestry from `from` towards the root and
    /// return the first selectable property id, or `None` when the walk
    /// exhausts the ancestry without finding one.
    pub fn resolve_selectable(&self, from: NodeId) -> Option<&str> {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = self.nodes.get(id.0)?;
            if let Some(property_id) = node.selectable.as_deref() {
                return Some(property_id);
            }
            current = node.parent;
        }
        None
    }

    /// The selectable root node registered for a property, if any.
    pub fn selectable_node(&self, property_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.selectable.as_deref() == Some(property_id))
            .map(NodeId)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64) -> WorldPosition {
        WorldPosition { x, y: 0.5, z: -2.0 }
    }

    #[test]
    fn resolves_through_nested_children() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, WorldPosition::default());
        let property = scene.add_selectable(Some(root), pos(-1.5), "prop-001");
        let mesh = scene.add_node(Some(property), pos(-1.5));
        let trim = scene.add_node(Some(mesh), pos(-1.5));

        assert_eq!(scene.resolve_selectable(trim), Some("prop-001"));
        assert_eq!(scene.resolve_selectable(mesh), Some("prop-001"));
        assert_eq!(scene.resolve_selectable(property), Some("prop-001"));
    }

    #[test]
    fn environment_nodes_resolve_to_no_target() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, WorldPosition::default());
        let floor = scene.add_node(Some(root), WorldPosition::default());

        assert_eq!(scene.resolve_selectable(floor), None);
        assert_eq!(scene.resolve_selectable(root), None);
    }

    #[test]
    fn selectable_node_lookup_matches_registration() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, WorldPosition::default());
        let a = scene.add_selectable(Some(root), pos(-1.5), "prop-001");
        let _ = scene.add_selectable(Some(root), pos(1.5), "prop-003");

        assert_eq!(scene.selectable_node("prop-001"), Some(a));
        assert_eq!(scene.selectable_node("prop-404"), None);
    }
}
