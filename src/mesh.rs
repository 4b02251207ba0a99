//! CPU-side mesh data as the engine hands it over after loading.
//!
//! - [`Vertex3d`] — The default interleaved vertex format (position, normal, uv)
//! - [`VertexLayout`] — Byte stride and position offset of a vertex buffer
//! - [`IndexData`] — 16- or 32-bit triangle indices
//! - [`SubMesh`] / [`Mesh`] — One vertex/index buffer pair per material slot
//! - [`Transform`] — Position, rotation, and scale for placing nodes in 3D space
//!
//! Vertex buffers are kept as flat `f32` data with an explicit [`VertexLayout`].
//! Nothing here assumes a fixed stride, so meshes with extra attributes (tangents,
//! colors, skinning weights) can be picked as long as the position is three
//! consecutive floats.
//!
//! # Vertex Layout
//!
//! [`Vertex3d`] is 32 bytes per vertex:
//!
//! | Attribute | Format    | Offset |
//! |-----------|-----------|--------|
//! | position  | Float32x3 | 0      |
//! | normal    | Float32x3 | 12     |
//! | uv        | Float32x2 | 24     |

use glam::{Mat4, Quat, Vec3};

/// A vertex with position, normal, and texture coordinates.
///
/// `#[repr(C)]` plus [`bytemuck::Pod`] lets a slice of these be viewed as the
/// flat `f32` buffer a [`SubMesh`] stores.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates, typically in the range [0, 1].
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// Layout of a tightly packed `Vertex3d` buffer.
    pub const LAYOUT: VertexLayout = VertexLayout {
        stride: std::mem::size_of::<Vertex3d>(),
        position_offset: 0,
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Where positions live inside an interleaved vertex buffer.
///
/// Both fields are in bytes, mirroring how GPU vertex declarations describe
/// attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    /// Distance in bytes between the starts of consecutive vertices.
    pub stride: usize,
    /// Byte offset of the `Float32x3` position inside each vertex.
    pub position_offset: usize,
}

impl VertexLayout {
    /// Layout of a buffer holding nothing but packed positions.
    pub const POSITIONS: VertexLayout = VertexLayout {
        stride: 12,
        position_offset: 0,
    };

    pub const fn new(stride: usize, position_offset: usize) -> Self {
        Self {
            stride,
            position_offset,
        }
    }

    /// Whether positions can be read from an `f32` buffer with this layout.
    pub fn is_valid(&self) -> bool {
        self.stride > 0
            && self.stride % 4 == 0
            && self.position_offset % 4 == 0
            && self.position_offset + 12 <= self.stride
    }

    /// Number of `f32` values per vertex.
    #[inline]
    pub fn floats_per_vertex(&self) -> usize {
        self.stride / 4
    }

    #[inline]
    pub(crate) fn position_float_offset(&self) -> usize {
        self.position_offset / 4
    }
}

/// Triangle indices in whichever width the asset was stored with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(indices) => indices.len(),
            IndexData::U32(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate indices widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let (narrow, wide): (&[u16], &[u32]) = match self {
            IndexData::U16(indices) => (indices.as_slice(), &[][..]),
            IndexData::U32(indices) => (&[][..], indices.as_slice()),
        };
        narrow
            .iter()
            .map(|&i| u32::from(i))
            .chain(wide.iter().copied())
    }
}

impl From<Vec<u16>> for IndexData {
    fn from(indices: Vec<u16>) -> Self {
        IndexData::U16(indices)
    }
}

impl From<Vec<u32>> for IndexData {
    fn from(indices: Vec<u32>) -> Self {
        IndexData::U32(indices)
    }
}

/// One vertex/index buffer pair of a mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
    /// Interleaved vertex data, read through `layout`.
    pub vertices: Vec<f32>,
    pub layout: VertexLayout,
    pub indices: IndexData,
}

impl SubMesh {
    pub fn new(vertices: Vec<f32>, layout: VertexLayout, indices: impl Into<IndexData>) -> Self {
        Self {
            vertices,
            layout,
            indices: indices.into(),
        }
    }

    /// Build a submesh from [`Vertex3d`] values.
    pub fn from_vertices(vertices: &[Vertex3d], indices: impl Into<IndexData>) -> Self {
        Self::new(
            bytemuck::cast_slice::<Vertex3d, f32>(vertices).to_vec(),
            Vertex3d::LAYOUT,
            indices,
        )
    }

    /// Vertex count implied by the buffer length and stride, if the layout is valid.
    pub fn vertex_count(&self) -> Option<usize> {
        self.layout
            .is_valid()
            .then(|| self.vertices.len() / self.layout.floats_per_vertex())
    }
}

/// Mesh asset data: a list of submeshes.
///
/// Each submesh becomes one independent triangle soup once it is moved into
/// world space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    pub fn new(submeshes: Vec<SubMesh>) -> Self {
        Self { submeshes }
    }

    /// A mesh with a single submesh.
    pub fn single(submesh: SubMesh) -> Self {
        Self {
            submeshes: vec![submesh],
        }
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Unit cube centered at the origin (side length 1), 16-bit indices.
    pub fn cube() -> Self {
        // Each face has its own vertices for correct normals
        #[rustfmt::skip]
        let vertices = [
            // Front face (Z+)
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  0.0,  1.0], [0.0, 1.0]),
            // Back face (Z-)
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 0.0]),
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  0.0, -1.0], [0.0, 1.0]),
            // Top face (Y+)
            Vertex3d::new([-0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 0.0,  1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [ 0.0,  1.0,  0.0], [0.0, 1.0]),
            // Bottom face (Y-)
            Vertex3d::new([-0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 0.0, -1.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [ 0.0, -1.0,  0.0], [0.0, 1.0]),
            // Right face (X+)
            Vertex3d::new([ 0.5, -0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([ 0.5, -0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([ 0.5,  0.5, -0.5], [ 1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([ 0.5,  0.5,  0.5], [ 1.0,  0.0,  0.0], [0.0, 1.0]),
            // Left face (X-)
            Vertex3d::new([-0.5, -0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 0.0]),
            Vertex3d::new([-0.5, -0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 0.0]),
            Vertex3d::new([-0.5,  0.5,  0.5], [-1.0,  0.0,  0.0], [1.0, 1.0]),
            Vertex3d::new([-0.5,  0.5, -0.5], [-1.0,  0.0,  0.0], [0.0, 1.0]),
        ];

        #[rustfmt::skip]
        let indices: Vec<u16> = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        Self::single(SubMesh::from_vertices(&vertices, indices))
    }

    /// Square plane of `size` × `size` on the XZ axis, facing +Y.
    pub fn plane(size: f32) -> Self {
        let half = size * 0.5;
        let vertices = [
            Vertex3d::new([-half, 0.0, -half], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([-half, 0.0, half], [0.0, 1.0, 0.0], [0.0, 1.0]),
            Vertex3d::new([half, 0.0, half], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex3d::new([half, 0.0, -half], [0.0, 1.0, 0.0], [1.0, 0.0]),
        ];
        let indices: Vec<u16> = vec![0, 1, 2, 2, 3, 0];

        Self::single(SubMesh::from_vertices(&vertices, indices))
    }

    /// UV sphere of radius 0.5 centered at the origin, 32-bit indices.
    ///
    /// `segments` divides the equator, `rings` divides pole to pole.
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * seg as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                vertices.push(Vertex3d::new(
                    [x * 0.5, y * 0.5, z * 0.5],
                    [x, y, z],
                    [seg as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, next, current + 1]);
                indices.extend_from_slice(&[current + 1, next, next + 1]);
            }
        }

        Self::single(SubMesh::from_vertices(&vertices, indices))
    }
}

/// Position, rotation, and scale of a scene node relative to its parent.
///
/// Converted to a matrix in **Scale → Rotate → Translate** order.
///
/// ```
/// use raypick::{Quat, Transform, Vec3};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 5.0, -10.0))
///     .rotation(Quat::from_rotation_y(std::f32::consts::PI / 4.0))
///     .uniform_scale(2.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex3d_layout_matches_struct() {
        assert_eq!(Vertex3d::LAYOUT.stride, 32);
        assert_eq!(Vertex3d::LAYOUT.floats_per_vertex(), 8);
        assert!(Vertex3d::LAYOUT.is_valid());
    }

    #[test]
    fn layout_validation() {
        assert!(VertexLayout::POSITIONS.is_valid());
        assert!(VertexLayout::new(24, 12).is_valid());
        assert!(!VertexLayout::new(0, 0).is_valid());
        assert!(!VertexLayout::new(10, 0).is_valid());
        assert!(!VertexLayout::new(16, 2).is_valid());
        assert!(!VertexLayout::new(16, 8).is_valid());
    }

    #[test]
    fn index_data_widens_u16() {
        let narrow = IndexData::from(vec![0u16, 1, 65535]);
        let wide = IndexData::from(vec![7u32, 8]);

        assert_eq!(narrow.iter().collect::<Vec<_>>(), vec![0, 1, 65535]);
        assert_eq!(wide.iter().collect::<Vec<_>>(), vec![7, 8]);
        assert_eq!(narrow.len(), 3);
        assert!(IndexData::U16(Vec::new()).is_empty());
    }

    #[test]
    fn from_vertices_flattens_interleaved_data() {
        let vertices = [
            Vertex3d::new([1.0, 2.0, 3.0], [0.0, 1.0, 0.0], [0.5, 0.5]),
            Vertex3d::new([4.0, 5.0, 6.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
        ];
        let sub = SubMesh::from_vertices(&vertices, vec![0u16, 1, 0]);

        assert_eq!(sub.vertices.len(), 16);
        assert_eq!(&sub.vertices[8..11], &[4.0, 5.0, 6.0]);
        assert_eq!(sub.vertex_count(), Some(2));
    }

    #[test]
    fn primitives_have_whole_triangles() {
        for mesh in [Mesh::cube(), Mesh::plane(2.0), Mesh::sphere(8, 4)] {
            assert_eq!(mesh.submesh_count(), 1);
            let sub = &mesh.submeshes[0];
            assert_eq!(sub.indices.len() % 3, 0);
            let count = sub.vertex_count().unwrap() as u32;
            assert!(sub.indices.iter().all(|i| i < count));
        }
        assert_eq!(Mesh::cube().submeshes[0].indices.len(), 36);
    }

    #[test]
    fn transform_matrix_is_srt() {
        let transform = Transform::new()
            .position(Vec3::new(1.0, 0.0, 0.0))
            .rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
            .uniform_scale(2.0);

        // (1,0,0) scaled to (2,0,0), rotated 90° about Y to (0,0,-2), then moved.
        let p = transform.matrix().transform_point3(Vec3::X);
        assert!(p.distance(Vec3::new(1.0, 0.0, -2.0)) < 1e-5);
    }
}
