//! Scene hierarchy and the mouse-picking scene built on it.
//!
//! A scene is a static tree of [`SceneNode`]s. Each node has a local
//! [`Transform`](crate::Transform) and a [`NodeKind`] that says whether it
//! carries a mesh. Traversal turns the tree into [`MeshInstance`]s (mesh id plus
//! accumulated world matrix). [`PickingScene`] consumes those instances as mesh
//! data finishes loading.
//!
//! # Example
//!
//! ```
//! use raypick::*;
//!
//! let root = SceneNode::group("level")
//!     .with_transform(Transform::new().uniform_scale(10.0))
//!     .with_child(SceneNode::mesh("floor", MeshId(0)))
//!     .with_child(
//!         SceneNode::mesh("crate", MeshId(1))
//!             .with_transform(Transform::from_position(Vec3::new(0.0, 0.05, 0.0))),
//!     );
//!
//! let instances = root.mesh_instances();
//! assert_eq!(instances.len(), 2);
//! assert_eq!(instances[1].mesh, MeshId(1));
//! ```

mod node;
mod picking_scene;

pub use node::{MeshId, MeshInstance, NodeKind, SceneNode};
pub use picking_scene::PickingScene;
