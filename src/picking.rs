//! Closest-hit ray picking against world-space triangle soups.
//!
//! This module answers "which triangle is under the mouse?". It includes:
//!
//! - [`Ray`] — A 3D ray with origin and direction for raycasting
//! - [`ClosestHitPicker`] — Linear scan over [`MeshGeometry`] returning the nearest triangle
//! - [`TriangleHit`] — Information about a ray-triangle intersection
//!
//! There is no acceleration structure: every triangle of every mesh is tested
//! once per pick. That is fine for small static scenes picked once per frame.
//!
//! # Example
//!
//! ```
//! use raypick::{MeshGeometry, Ray, Vec3, pick};
//!
//! let floor = MeshGeometry::new(
//!     vec![Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0)],
//!     vec![0, 1, 2],
//! )
//! .unwrap();
//!
//! let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y);
//! let hit = pick(&ray, &[floor]).expect("ray points at the floor");
//! assert!((hit.distance - 2.0).abs() < 1e-5);
//! ```

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::geometry::MeshGeometry;

/// Rays whose direction makes a cosine below this with the triangle's plane
/// are treated as parallel to it.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A ray in 3D space, used for raycasting and picking.
///
/// A ray has an origin point and a normalized direction. It represents
/// an infinite half-line starting at the origin and extending in the direction.
///
/// # Example
///
/// ```
/// use raypick::{Ray, Vec3};
///
/// // Create a ray from the camera
/// let ray = Ray::new(
///     Vec3::new(0.0, 1.0, 5.0),   // origin (camera position)
///     Vec3::new(0.0, 0.0, -1.0),  // direction (forward)
/// );
///
/// // Get a point along the ray
/// let point_at_10_units = ray.point_at(10.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of the ray.
    pub origin: Vec3,
    /// The normalized direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with the given origin and direction.
    ///
    /// The direction will be normalized automatically. A zero direction stays
    /// zero, and such a ray never hits anything.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from screen coordinates using camera matrices.
    ///
    /// # Arguments
    ///
    /// * `screen_x` - X position in pixels, from the left edge
    /// * `screen_y` - Y position in pixels, from the top edge
    /// * `screen_width` - Total width in pixels
    /// * `screen_height` - Total height in pixels
    /// * `view_matrix` - Camera view matrix
    /// * `projection_matrix` - Camera projection matrix (depth range 0..1)
    ///
    /// The origin lies on the near plane, so it is the point a viewer would
    /// see under the cursor.
    pub fn from_screen(
        screen_x: f32,
        screen_y: f32,
        screen_width: f32,
        screen_height: f32,
        view_matrix: Mat4,
        projection_matrix: Mat4,
    ) -> Self {
        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = (2.0 * screen_x / screen_width) - 1.0;
        let ndc_y = 1.0 - (2.0 * screen_y / screen_height); // Y is flipped

        let near_clip = Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far_clip = Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

        let inv_view_proj = (projection_matrix * view_matrix).inverse();

        let near_world = inv_view_proj * near_clip;
        let far_world = inv_view_proj * far_clip;

        // Perspective divide
        let near_point = near_world.truncate() / near_world.w;
        let far_point = far_world.truncate() / far_world.w;

        Self::new(near_point, far_point - near_point)
    }

    /// Get a point along the ray at the given distance from the origin.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Test intersection with a single triangle, accepting hits from either side.
    ///
    /// Returns the distance along the ray to the hit point, or `None` if the
    /// ray misses, runs parallel to the triangle's plane, the triangle is
    /// degenerate, or the hit lies behind the origin.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        self.intersect_triangle_facing(v0, v1, v2, FaceSide::Double)
    }

    /// Möller–Trumbore intersection with face-side filtering.
    ///
    /// A triangle is front-facing when its vertices wind counter-clockwise as
    /// seen from the ray origin.
    pub fn intersect_triangle_facing(
        &self,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        side: FaceSide,
    ) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);

        // |det| is |normal| * |cos|, so compare against the normal's length to
        // stay independent of triangle size. Zero-area triangles give 0 <= 0.
        let normal_length = edge1.cross(edge2).length();
        if !det.is_finite() || det.abs() <= PARALLEL_EPSILON * normal_length {
            return None;
        }
        match side {
            FaceSide::Double => {}
            FaceSide::Front if det < 0.0 => return None,
            FaceSide::Back if det > 0.0 => return None,
            FaceSide::Front | FaceSide::Back => {}
        }

        let inv_det = 1.0 / det;
        let s = self.origin - v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

/// Which side of a triangle a ray may hit it from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceSide {
    /// Both sides register hits.
    #[default]
    Double,
    /// Only counter-clockwise (front) faces.
    Front,
    /// Only clockwise (back) faces.
    Back,
}

/// Information about a ray-triangle intersection.
///
/// Returned by picking methods when a ray hits a triangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleHit {
    /// Distance from ray origin to the hit point.
    pub distance: f32,
    /// World-space position of the hit point.
    pub point: Vec3,
    /// The three world-space vertices of the hit triangle, in index order.
    pub vertices: [Vec3; 3],
    /// Position of the hit geometry in the list passed to the picker.
    pub mesh: usize,
    /// Triangle number within that geometry (index offset / 3).
    pub triangle: usize,
}

/// Result of a pick against a set of geometries.
///
/// Contains the closest hit, if any.
pub type PickResult = Option<TriangleHit>;

/// Linear-scan closest-hit picker.
///
/// Stateless apart from its filtering options, so one instance can be shared
/// freely and reused every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosestHitPicker {
    /// Which triangle faces count as hits.
    pub face_side: FaceSide,
    /// Hits farther than this are ignored.
    pub max_distance: f32,
}

impl Default for ClosestHitPicker {
    fn default() -> Self {
        Self {
            face_side: FaceSide::Double,
            max_distance: f32::INFINITY,
        }
    }
}

impl ClosestHitPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn face_side(mut self, side: FaceSide) -> Self {
        self.face_side = side;
        self
    }

    pub fn max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    /// Cast a ray and return the closest hit.
    ///
    /// Meshes are scanned in order, and triangles within each mesh in index
    /// order. A later triangle replaces the current best only when it is
    /// strictly closer, so the first one found wins an exact tie.
    pub fn pick(&self, ray: &Ray, meshes: &[MeshGeometry]) -> PickResult {
        let mut closest = f32::INFINITY;
        let mut best = None;

        self.for_each_hit(ray, meshes, |hit| {
            if hit.distance < closest {
                closest = hit.distance;
                best = Some(hit);
            }
        });

        best
    }

    /// Cast a ray and return every hit.
    ///
    /// The result is sorted by distance (closest first). Equal distances keep
    /// scan order.
    pub fn pick_all(&self, ray: &Ray, meshes: &[MeshGeometry]) -> Vec<TriangleHit> {
        let mut hits = Vec::new();
        self.for_each_hit(ray, meshes, |hit| hits.push(hit));

        // sort_by is stable
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn for_each_hit(
        &self,
        ray: &Ray,
        meshes: &[MeshGeometry],
        mut visit: impl FnMut(TriangleHit),
    ) {
        for (mesh, geometry) in meshes.iter().enumerate() {
            for (triangle, vertices) in geometry.triangles().enumerate() {
                let [v0, v1, v2] = vertices;
                let Some(distance) = ray.intersect_triangle_facing(v0, v1, v2, self.face_side)
                else {
                    continue;
                };
                if distance > self.max_distance {
                    continue;
                }
                visit(TriangleHit {
                    distance,
                    point: ray.point_at(distance),
                    vertices,
                    mesh,
                    triangle,
                });
            }
        }
    }
}

/// Cast a ray against all geometries with default settings and return the closest hit.
///
/// # Returns
///
/// The closest hit, or `None` if nothing was hit (including when `meshes` is empty).
pub fn pick(ray: &Ray, meshes: &[MeshGeometry]) -> PickResult {
    ClosestHitPicker::default().pick(ray, meshes)
}

/// Cast a ray against all geometries with default settings and return every hit.
pub fn pick_all(ray: &Ray, meshes: &[MeshGeometry]) -> Vec<TriangleHit> {
    ClosestHitPicker::default().pick_all(ray, meshes)
}
