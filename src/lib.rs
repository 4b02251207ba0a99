//! # raypick
//!
//! **Closest-hit mouse picking against world-space triangle soups.**
//!
//! Load a static hierarchy, move each submesh into world space once, then every
//! frame cast a ray through the cursor and outline the triangle under it.
//!
//! ## Quick Start
//!
//! ```
//! use raypick::*;
//!
//! let camera = Camera::new().at(0.0, 0.8, 1.5).rotated(-30.0, 0.0);
//! let mut scene = PickingScene::new(camera, PickingConfig::default());
//!
//! // The hierarchy is known first...
//! let root = SceneNode::group("root").with_child(
//!     SceneNode::mesh("floor", MeshId(0)),
//! );
//! scene.on_hierarchy_loaded(&root);
//!
//! // ...and mesh data arrives later.
//! scene.on_mesh_loaded(MeshId(0), &Mesh::plane(4.0));
//!
//! let viewport = Viewport::sized(800.0, 600.0);
//! let mut lines = DebugLines::new();
//! if let Some(hit) = scene.frame(viewport.center(), viewport, &mut lines) {
//!     println!("triangle {} at {:.2}", hit.triangle, hit.distance);
//! }
//! // Upload `lines.as_bytes()` and draw with `lines.proj_view()`.
//! ```
//!
//! ## Layers
//!
//! - [`pick`] / [`ClosestHitPicker`] — the linear-scan picker over [`MeshGeometry`]
//! - [`MeshGeometry::from_submesh`] — strided vertex extraction into world space
//! - [`SceneNode`] — static hierarchy with world-transform traversal
//! - [`Camera`] — matrices and viewport-point-to-ray projection
//! - [`DebugLines`] — per-frame line batch for the highlight
//! - [`PickingScene`] — the above wired into load notifications and a frame step

mod camera;
mod color;
mod config;
mod debug_lines;
mod geometry;
mod mesh;
mod picking;
pub mod scene;

pub use camera::{Camera, Viewport};
pub use color::Color;
pub use config::{ConfigError, HighlightMode, PickingConfig};
pub use debug_lines::{DebugLines, LinePass, LineVertex};
pub use geometry::{GeometryError, MeshGeometry, load_stl, parse_stl_bytes};
pub use mesh::{IndexData, Mesh, SubMesh, Transform, Vertex3d, VertexLayout};
pub use picking::{ClosestHitPicker, FaceSide, PickResult, Ray, TriangleHit, pick, pick_all};
pub use scene::{MeshId, MeshInstance, NodeKind, PickingScene, SceneNode};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
