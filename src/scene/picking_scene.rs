//! Mouse picking over a loaded static hierarchy.

use glam::{Mat4, Vec2};
use tracing::{debug, info, trace, warn};

use crate::camera::{Camera, Viewport};
use crate::config::{HighlightMode, PickingConfig};
use crate::debug_lines::DebugLines;
use crate::geometry::MeshGeometry;
use crate::mesh::Mesh;
use crate::picking::{ClosestHitPicker, PickResult, TriangleHit};
use crate::scene::node::{MeshId, MeshInstance, SceneNode};

/// Casts a ray through the cursor every frame and outlines the triangle under it.
///
/// Geometry arrives in two steps, matching how assets stream in:
///
/// 1. [`on_hierarchy_loaded`](Self::on_hierarchy_loaded) records where each mesh
///    node sits in the world.
/// 2. [`on_mesh_loaded`](Self::on_mesh_loaded) fires once per mesh asset when
///    its data is ready, turning every submesh of every instance into a
///    world-space [`MeshGeometry`].
///
/// [`frame`](Self::frame) can run at any point; before any mesh has loaded it
/// simply finds nothing.
///
/// # Example
///
/// ```
/// use raypick::*;
///
/// let mut scene = PickingScene::new(Camera::new(), PickingConfig::default());
/// let root = SceneNode::group("root").with_child(SceneNode::mesh("box", MeshId(0)));
///
/// scene.on_hierarchy_loaded(&root);
/// scene.on_mesh_loaded(MeshId(0), &Mesh::cube());
///
/// let viewport = Viewport::sized(800.0, 600.0);
/// let mut lines = DebugLines::new();
/// let hit = scene.frame(Vec2::new(420.0, 290.0), viewport, &mut lines);
///
/// assert!(hit.is_some());
/// assert_eq!(lines.segment_count(), 4); // marker + triangle outline
/// ```
pub struct PickingScene {
    camera: Camera,
    config: PickingConfig,
    pending: Vec<MeshInstance>,
    geometry: Vec<MeshGeometry>,
    last_hit: PickResult,
}

impl PickingScene {
    pub fn new(camera: Camera, config: PickingConfig) -> Self {
        Self {
            camera,
            config,
            pending: Vec::new(),
            geometry: Vec::new(),
            last_hit: None,
        }
    }

    /// Record the mesh instances of a freshly loaded hierarchy.
    pub fn on_hierarchy_loaded(&mut self, root: &SceneNode) {
        let before = self.pending.len();
        root.visit_meshes(Mat4::IDENTITY, &mut |instance| self.pending.push(instance));
        info!(
            root = %root.name,
            nodes = root.node_count(),
            mesh_instances = self.pending.len() - before,
            "hierarchy loaded"
        );
    }

    /// Build world-space geometry for every pending instance of `id`.
    ///
    /// Submeshes that cannot be read are skipped with a warning; the rest of the
    /// mesh is still picked. Returns how many geometries were added.
    pub fn on_mesh_loaded(&mut self, id: MeshId, mesh: &Mesh) -> usize {
        let (ready, still_pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|instance| instance.mesh == id);
        self.pending = still_pending;

        if ready.is_empty() {
            debug!(mesh = %id, "mesh loaded with no pending instances");
            return 0;
        }

        let before = self.geometry.len();
        for instance in &ready {
            for (index, submesh) in mesh.submeshes.iter().enumerate() {
                match MeshGeometry::from_submesh(submesh, instance.world) {
                    Ok(geometry) => {
                        debug!(
                            mesh = %id,
                            submesh = index,
                            triangles = geometry.triangle_count(),
                            "extracted submesh geometry"
                        );
                        self.geometry.push(geometry);
                    }
                    Err(e) => warn!(mesh = %id, submesh = index, "skipping submesh: {e}"),
                }
            }
        }

        let added = self.geometry.len() - before;
        info!(
            mesh = %id,
            instances = ready.len(),
            geometries = added,
            "mesh loaded"
        );
        added
    }

    /// Pick under the cursor and record this frame's debug lines.
    ///
    /// The ray-origin marker is always drawn. The triangle outline follows
    /// [`HighlightMode`]. An empty viewport picks nothing and records no lines.
    pub fn frame(
        &mut self,
        cursor: Vec2,
        viewport: Viewport,
        lines: &mut DebugLines,
    ) -> PickResult {
        let mut pass = lines.begin(self.camera.projection_view(viewport.aspect()));
        let Some(ray) = self.camera.viewport_point_to_ray(cursor, viewport) else {
            trace!(width = viewport.width, height = viewport.height, "empty viewport");
            pass.end();
            return None;
        };

        let hit = self.picker().pick(&ray, &self.geometry);
        trace!(
            x = cursor.x,
            y = cursor.y,
            distance = ?hit.map(|h| h.distance),
            "pick"
        );

        if hit.is_some() {
            self.last_hit = hit;
        }
        let highlight = match self.config.highlight_mode {
            HighlightMode::CurrentHit => hit,
            HighlightMode::LastKnownHit => self.last_hit,
        };

        pass.line(
            ray.origin,
            self.config.marker_color,
            self.config.marker_target,
            self.config.marker_color,
        );
        if let Some(TriangleHit { vertices, .. }) = highlight {
            pass.triangle(vertices, self.config.highlight_color);
        }
        pass.end();

        hit
    }

    /// The picker configured for this scene.
    ///
    /// Without a configured `max_distance` every triangle along the ray is a
    /// candidate, however far away.
    pub fn picker(&self) -> ClosestHitPicker {
        let picker = ClosestHitPicker::new().face_side(self.config.face_side);
        match self.config.max_distance {
            Some(distance) => picker.max_distance(distance),
            None => picker,
        }
    }

    /// World-space geometry loaded so far, one entry per submesh instance.
    pub fn geometry(&self) -> &[MeshGeometry] {
        &self.geometry
    }

    /// Mesh instances still waiting for their mesh data.
    pub fn pending_instances(&self) -> &[MeshInstance] {
        &self.pending
    }

    /// Most recent hit of any frame.
    pub fn last_hit(&self) -> PickResult {
        self.last_hit
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &PickingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::mesh::{SubMesh, Transform, VertexLayout};
    use glam::Vec3;

    const VIEWPORT: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        width: 400.0,
        height: 400.0,
    };

    /// Camera on +Z looking at a unit cube at the origin.
    fn scene_with(config: PickingConfig) -> PickingScene {
        PickingScene::new(Camera::new().at(0.0, 0.0, 3.0), config)
    }

    fn cube_hierarchy() -> SceneNode {
        SceneNode::group("root").with_child(SceneNode::mesh("cube", MeshId(0)))
    }

    fn center() -> Vec2 {
        VIEWPORT.center()
    }

    /// Off-center point that lands inside the cube's front face, away from its diagonal.
    fn probe() -> Vec2 {
        Vec2::new(220.0, 190.0)
    }

    fn corner() -> Vec2 {
        Vec2::new(1.0, 1.0)
    }

    #[test]
    fn nothing_is_picked_before_load() {
        let mut scene = scene_with(PickingConfig::default());
        let mut lines = DebugLines::new();

        assert!(scene.frame(center(), VIEWPORT, &mut lines).is_none());
        // Marker only
        assert_eq!(lines.segment_count(), 1);

        scene.on_hierarchy_loaded(&cube_hierarchy());
        assert_eq!(scene.pending_instances().len(), 1);
        assert!(scene.frame(center(), VIEWPORT, &mut lines).is_none());
    }

    #[test]
    fn cube_front_face_is_picked_after_load() {
        let mut scene = scene_with(PickingConfig::default());
        let mut lines = DebugLines::new();

        scene.on_hierarchy_loaded(&cube_hierarchy());
        assert_eq!(scene.on_mesh_loaded(MeshId(0), &Mesh::cube()), 1);
        assert!(scene.pending_instances().is_empty());

        let hit = scene.frame(probe(), VIEWPORT, &mut lines).unwrap();
        // Ray through ndc (0.1, 0.05) from z = 3 meets the front face at z = 0.5.
        assert!(hit.point.distance(Vec3::new(0.25, 0.125, 0.5)) < 1e-3);
        assert!((hit.distance - 2.4 * 1.0125f32.sqrt()).abs() < 1e-3);
        assert!(hit.vertices.iter().all(|v| v.z == 0.5));
        assert_eq!(lines.segment_count(), 4);
        assert_eq!(lines.vertices()[2].color, Color::RED.to_array());
    }

    #[test]
    fn instance_transforms_are_applied() {
        let mut scene = scene_with(PickingConfig::default());
        let root = SceneNode::group("root")
            .with_transform(Transform::new().uniform_scale(2.0))
            .with_child(SceneNode::mesh("cube", MeshId(3)));

        scene.on_hierarchy_loaded(&root);
        scene.on_mesh_loaded(MeshId(3), &Mesh::cube());

        let (min, max) = scene.geometry()[0].bounds();
        assert_eq!(min, Vec3::splat(-1.0));
        assert_eq!(max, Vec3::splat(1.0));
    }

    #[test]
    fn bad_submesh_is_skipped_but_others_load() {
        let mut scene = scene_with(PickingConfig::default());
        let mut mesh = Mesh::cube();
        mesh.submeshes.push(SubMesh::new(
            vec![0.0; 9],
            VertexLayout::new(6, 0),
            vec![0u16, 1, 2],
        ));
        mesh.submeshes.push(SubMesh::new(
            Vec::new(),
            VertexLayout::POSITIONS,
            vec![0u16, 1, 2],
        ));

        scene.on_hierarchy_loaded(&cube_hierarchy());
        assert_eq!(scene.on_mesh_loaded(MeshId(0), &mesh), 1);

        let mut lines = DebugLines::new();
        assert!(scene.frame(probe(), VIEWPORT, &mut lines).is_some());
    }

    #[test]
    fn unknown_mesh_load_is_ignored() {
        let mut scene = scene_with(PickingConfig::default());
        scene.on_hierarchy_loaded(&cube_hierarchy());

        assert_eq!(scene.on_mesh_loaded(MeshId(9), &Mesh::cube()), 0);
        assert_eq!(scene.pending_instances().len(), 1);
        assert!(scene.geometry().is_empty());
    }

    #[test]
    fn shared_mesh_builds_one_geometry_per_instance() {
        let mut scene = scene_with(PickingConfig::default());
        let root = SceneNode::group("root")
            .with_child(SceneNode::mesh("a", MeshId(0)))
            .with_child(
                SceneNode::mesh("b", MeshId(0))
                    .with_transform(Transform::from_position(Vec3::new(5.0, 0.0, 0.0))),
            );

        scene.on_hierarchy_loaded(&root);
        assert_eq!(scene.on_mesh_loaded(MeshId(0), &Mesh::cube()), 2);
        // One-shot: a second notification finds nothing pending.
        assert_eq!(scene.on_mesh_loaded(MeshId(0), &Mesh::cube()), 0);
    }

    #[test]
    fn current_hit_mode_drops_highlight_on_miss() {
        let mut scene = scene_with(PickingConfig::default());
        scene.on_hierarchy_loaded(&cube_hierarchy());
        scene.on_mesh_loaded(MeshId(0), &Mesh::cube());
        let mut lines = DebugLines::new();

        assert!(scene.frame(probe(), VIEWPORT, &mut lines).is_some());
        assert!(scene.frame(corner(), VIEWPORT, &mut lines).is_none());
        assert_eq!(lines.segment_count(), 1);
        assert!(scene.last_hit().is_some());
    }

    #[test]
    fn last_known_hit_mode_keeps_highlight_on_miss() {
        let config = PickingConfig::new()
            .highlight_mode(HighlightMode::LastKnownHit)
            .highlight_color(Color::GREEN);
        let mut scene = scene_with(config);
        scene.on_hierarchy_loaded(&cube_hierarchy());
        scene.on_mesh_loaded(MeshId(0), &Mesh::cube());
        let mut lines = DebugLines::new();

        let first = scene.frame(probe(), VIEWPORT, &mut lines).unwrap();
        assert!(scene.frame(corner(), VIEWPORT, &mut lines).is_none());

        assert_eq!(lines.segment_count(), 4);
        assert_eq!(lines.vertices()[2].position, first.vertices[0].to_array());
        assert_eq!(lines.vertices()[2].color, Color::GREEN.to_array());
    }

    #[test]
    fn marker_runs_from_ray_origin_to_target() {
        let config = PickingConfig::new()
            .marker_target(Vec3::new(0.0, -1.0, 0.0))
            .marker_color(Color::YELLOW);
        let mut scene = scene_with(config);
        let mut lines = DebugLines::new();

        scene.frame(center(), VIEWPORT, &mut lines);

        let marker = &lines.vertices()[..2];
        assert!((Vec3::from(marker[0].position) - Vec3::new(0.0, 0.0, 2.9)).length() < 1e-3);
        assert_eq!(marker[1].position, [0.0, -1.0, 0.0]);
        assert_eq!(marker[0].color, Color::YELLOW.to_array());
        assert_eq!(lines.proj_view(), scene.camera().projection_view(1.0));
    }

    #[test]
    fn visible_geometry_beyond_far_plane_ray_length_is_picked() {
        // 200x200 wall at z = -90, camera at the origin with far = 100.
        let mut scene = PickingScene::new(
            Camera::new().at(0.0, 0.0, 0.0).clip_planes(0.1, 100.0),
            PickingConfig::default(),
        );
        let wall = SceneNode::mesh("wall", MeshId(0)).with_transform(
            Transform::from_position(Vec3::new(0.0, 0.0, -90.0))
                .rotation(glam::Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
        );
        scene.on_hierarchy_loaded(&wall);
        scene.on_mesh_loaded(MeshId(0), &Mesh::plane(200.0));
        let mut lines = DebugLines::new();

        let near_center = scene.frame(probe(), VIEWPORT, &mut lines).unwrap();
        assert!((near_center.distance - 89.9 * 1.0125f32.sqrt()).abs() < 0.05);

        // Ray length past the near plane is about 131, but the hit is in view.
        let corner = scene.frame(Vec2::new(40.0, 60.0), VIEWPORT, &mut lines).unwrap();
        assert!(corner.point.distance(Vec3::new(-72.0, 63.0, -90.0)) < 0.05);
        assert!(corner.distance > 100.0);
        assert_eq!(scene.picker().max_distance, f32::INFINITY);
    }

    #[test]
    fn configured_max_distance_limits_picks() {
        let mut scene = scene_with(PickingConfig::new().max_distance(2.0));
        scene.on_hierarchy_loaded(&cube_hierarchy());
        scene.on_mesh_loaded(MeshId(0), &Mesh::cube());
        let mut lines = DebugLines::new();

        assert!(scene.frame(probe(), VIEWPORT, &mut lines).is_none());
        assert_eq!(scene.picker().max_distance, 2.0);
    }

    #[test]
    fn empty_viewport_picks_nothing_and_draws_nothing() {
        let mut scene = scene_with(PickingConfig::default());
        scene.on_hierarchy_loaded(&cube_hierarchy());
        scene.on_mesh_loaded(MeshId(0), &Mesh::cube());
        let mut lines = DebugLines::new();
        scene.frame(probe(), VIEWPORT, &mut lines);
        assert!(!lines.is_empty());

        let empty = Viewport::sized(0.0, 400.0);
        assert!(scene.frame(probe(), empty, &mut lines).is_none());
        assert!(lines.is_empty());
        assert!(lines.vertices().iter().all(|v| v.position.iter().all(|c| c.is_finite())));
    }
}
