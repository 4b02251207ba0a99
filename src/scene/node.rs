//! Static scene hierarchy and world-transform traversal.

use glam::Mat4;

use crate::mesh::Transform;

/// Type-safe handle to a mesh asset.
///
/// Scene nodes refer to meshes by id so the hierarchy can be known before the
/// mesh data itself has finished loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// What a scene node carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Transform-only node used to group children.
    Group,
    /// Node that renders the given mesh.
    Mesh(MeshId),
}

/// A node of a static scene hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

/// A mesh placed in the world by the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshInstance {
    pub mesh: MeshId,
    /// Accumulated local-to-world matrix of the mesh node.
    pub world: Mat4,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: MeshId) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Every mesh node of this subtree with its world matrix, in pre-order.
    ///
    /// `self` is treated as the root: its transform is applied to an identity
    /// parent.
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut instances = Vec::new();
        self.visit_meshes(Mat4::IDENTITY, &mut |instance| instances.push(instance));
        instances
    }

    /// Walk the subtree in pre-order (node before its children, children in
    /// order), calling `visit` for each mesh node.
    pub fn visit_meshes(&self, parent_world: Mat4, visit: &mut impl FnMut(MeshInstance)) {
        let world = parent_world * self.transform.matrix();

        match self.kind {
            NodeKind::Mesh(mesh) => visit(MeshInstance { mesh, world }),
            NodeKind::Group => {}
        }

        for child in &self.children {
            child.visit_meshes(world, visit);
        }
    }
}
