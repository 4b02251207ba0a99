//! World-space triangle soups extracted from loaded meshes.
//!
//! A [`MeshGeometry`] is what the picker scans: positions already moved into
//! world space plus the index list that groups them into triangles. One is built
//! per submesh, once, when the owning mesh finishes loading.
//!
//! ```
//! use raypick::{Mat4, Mesh, MeshGeometry, Vec3};
//!
//! let cube = Mesh::cube();
//! let world = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
//! let geometry = MeshGeometry::from_submesh(&cube.submeshes[0], world).unwrap();
//!
//! assert_eq!(geometry.triangle_count(), 12);
//! ```
//!
//! # Demo assets
//!
//! [`load_stl`] and [`parse_stl_bytes`] turn STL files into a single-submesh
//! [`Mesh`] so the demo binary has something real to pick against.

use std::io::{Read, Seek};
use std::path::Path;

use glam::{Mat4, Vec3};

use crate::mesh::{Mesh, SubMesh, Vertex3d};

/// Errors that can occur when building geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("invalid vertex layout: stride {stride} bytes, position offset {position_offset} bytes")]
    InvalidLayout {
        stride: usize,
        position_offset: usize,
    },

    #[error("submesh has no vertices")]
    EmptyVertices,

    #[error("vertex buffer of {floats} floats is not a whole number of {per_vertex}-float vertices")]
    TruncatedVertexBuffer { floats: usize, per_vertex: usize },

    #[error("submesh has no indices")]
    EmptyIndices,

    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("STL parse error: {0}")]
    Stl(String),
}

/// A world-space triangle soup.
///
/// Construction checks that the index count is a multiple of 3 and that every
/// index points at a vertex, so iterating triangles never goes out of bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGeometry {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl MeshGeometry {
    /// Wraps positions that are already in world space.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, GeometryError> {
        validate_indices(&indices, positions.len())?;
        Ok(Self { positions, indices })
    }

    /// Reads positions out of a strided submesh and moves them into world space.
    ///
    /// Positions are read at the stride and offset reported by the submesh's
    /// [`VertexLayout`](crate::VertexLayout); nothing assumes a packed buffer.
    pub fn from_submesh(submesh: &SubMesh, world: Mat4) -> Result<Self, GeometryError> {
        let layout = submesh.layout;
        if !layout.is_valid() {
            return Err(GeometryError::InvalidLayout {
                stride: layout.stride,
                position_offset: layout.position_offset,
            });
        }
        if submesh.vertices.is_empty() {
            return Err(GeometryError::EmptyVertices);
        }

        let per_vertex = layout.floats_per_vertex();
        if submesh.vertices.len() % per_vertex != 0 {
            return Err(GeometryError::TruncatedVertexBuffer {
                floats: submesh.vertices.len(),
                per_vertex,
            });
        }

        let offset = layout.position_float_offset();
        let positions: Vec<Vec3> = submesh
            .vertices
            .chunks_exact(per_vertex)
            .map(|vertex| world.transform_point3(Vec3::from_slice(&vertex[offset..offset + 3])))
            .collect();

        let indices: Vec<u32> = submesh.indices.iter().collect();
        Self::new(positions, indices)
    }

    /// World-space vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The three vertices of triangle `index`, if it exists.
    pub fn triangle(&self, index: usize) -> Option<[Vec3; 3]> {
        let start = index.checked_mul(3)?;
        let tri = self.indices.get(start..start.checked_add(3)?)?;
        Some(self.corners(tri))
    }

    /// Triangles in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| self.corners(tri))
    }

    /// Axis-aligned bounds as `(min, max)`.
    ///
    /// An empty geometry reports inverted infinite bounds.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), &p| (min.min(p), max.max(p)),
        )
    }

    #[inline]
    fn corners(&self, tri: &[u32]) -> [Vec3; 3] {
        [
            self.positions[tri[0] as usize],
            self.positions[tri[1] as usize],
            self.positions[tri[2] as usize],
        ]
    }
}

fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), GeometryError> {
    if indices.is_empty() {
        return Err(GeometryError::EmptyIndices);
    }
    if indices.len() % 3 != 0 {
        return Err(GeometryError::IndexCountNotTriangles(indices.len()));
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(GeometryError::IndexOutOfBounds {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Load an STL file (binary or ASCII) as a single-submesh [`Mesh`].
pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh, GeometryError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    parse_stl(&mut reader)
}

/// Parse STL data held in memory.
pub fn parse_stl_bytes(bytes: &[u8]) -> Result<Mesh, GeometryError> {
    let mut cursor = std::io::Cursor::new(bytes);
    parse_stl(&mut cursor)
}

fn parse_stl<R: Read + Seek>(reader: &mut R) -> Result<Mesh, GeometryError> {
    let stl = stl_io::read_stl(reader).map_err(|e| GeometryError::Stl(e.to_string()))?;

    // stl_io shares vertices between faces; keep that sharing in the index list
    let vertices: Vec<Vertex3d> = stl
        .vertices
        .iter()
        .map(|&v| Vertex3d::new(v.into(), [0.0, 0.0, 0.0], [0.0, 0.0]))
        .collect();

    let indices: Vec<u32> = stl
        .faces
        .iter()
        .flat_map(|face| face.vertices.iter().map(|&i| i as u32))
        .collect();

    Ok(Mesh::single(SubMesh::from_vertices(&vertices, indices)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexLayout;

    /// Three vertices laid out as [pad, x, y, z, pad, pad] (24 bytes each).
    fn padded_submesh(indices: Vec<u16>) -> SubMesh {
        #[rustfmt::skip]
        let vertices = vec![
            9.0, 0.0, 0.0, 0.0, 9.0, 9.0,
            9.0, 1.0, 0.0, 0.0, 9.0, 9.0,
            9.0, 0.0, 1.0, 0.0, 9.0, 9.0,
        ];
        SubMesh::new(vertices, VertexLayout::new(24, 4), indices)
    }

    #[test]
    fn extraction_honours_stride_and_offset() {
        let geometry =
            MeshGeometry::from_submesh(&padded_submesh(vec![0, 1, 2]), Mat4::IDENTITY).unwrap();

        assert_eq!(geometry.positions(), &[Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn extraction_applies_world_matrix() {
        let world = Mat4::from_scale_rotation_translation(
            Vec3::splat(10.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, 0.0, -5.0),
        );
        let geometry =
            MeshGeometry::from_submesh(&padded_submesh(vec![0, 1, 2]), world).unwrap();

        assert_eq!(
            geometry.triangle(0).unwrap(),
            [
                Vec3::new(0.0, 0.0, -5.0),
                Vec3::new(10.0, 0.0, -5.0),
                Vec3::new(0.0, 10.0, -5.0),
            ]
        );
    }

    #[test]
    fn malformed_submeshes_are_rejected() {
        let bad_layout = SubMesh::new(vec![0.0; 6], VertexLayout::new(8, 0), vec![0u16, 1, 0]);
        assert!(matches!(
            MeshGeometry::from_submesh(&bad_layout, Mat4::IDENTITY),
            Err(GeometryError::InvalidLayout { stride: 8, .. })
        ));

        let empty = SubMesh::new(Vec::new(), VertexLayout::POSITIONS, vec![0u16, 1, 2]);
        assert!(matches!(
            MeshGeometry::from_submesh(&empty, Mat4::IDENTITY),
            Err(GeometryError::EmptyVertices)
        ));

        let truncated = SubMesh::new(vec![0.0; 7], VertexLayout::POSITIONS, vec![0u16, 1, 0]);
        assert!(matches!(
            MeshGeometry::from_submesh(&truncated, Mat4::IDENTITY),
            Err(GeometryError::TruncatedVertexBuffer { floats: 7, per_vertex: 3 })
        ));

        assert!(matches!(
            MeshGeometry::from_submesh(&padded_submesh(Vec::new()), Mat4::IDENTITY),
            Err(GeometryError::EmptyIndices)
        ));
        assert!(matches!(
            MeshGeometry::from_submesh(&padded_submesh(vec![0, 1]), Mat4::IDENTITY),
            Err(GeometryError::IndexCountNotTriangles(2))
        ));
        assert!(matches!(
            MeshGeometry::from_submesh(&padded_submesh(vec![0, 1, 3]), Mat4::IDENTITY),
            Err(GeometryError::IndexOutOfBounds { index: 3, vertex_count: 3 })
        ));
    }

    #[test]
    fn triangle_lookup_out_of_range_is_none() {
        let geometry =
            MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]).unwrap();
        assert!(geometry.triangle(0).is_some());
        assert!(geometry.triangle(1).is_none());
        assert!(geometry.triangle(usize::MAX).is_none());
        assert!(geometry.triangle(usize::MAX / 3).is_none());
        assert_eq!(geometry.triangles().count(), 1);
    }

    #[test]
    fn bounds_cover_all_positions() {
        let geometry = MeshGeometry::from_submesh(
            &Mesh::cube().submeshes[0],
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
        )
        .unwrap();

        let (min, max) = geometry.bounds();
        assert_eq!(min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(max, Vec3::new(1.5, 2.5, 3.5));
    }

    #[test]
    fn ascii_stl_becomes_single_submesh() {
        let stl = b"solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
endsolid tri
";
        let mesh = parse_stl_bytes(stl).unwrap();
        assert_eq!(mesh.submesh_count(), 1);

        let geometry = MeshGeometry::from_submesh(&mesh.submeshes[0], Mat4::IDENTITY).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        let [a, b, c] = geometry.triangle(0).unwrap();
        assert!(a.length() + b.length() + c.length() > 1.9);
    }

    #[test]
    fn garbage_stl_is_an_error() {
        assert!(matches!(
            parse_stl_bytes(b"not an stl file"),
            Err(GeometryError::Stl(_))
        ));
    }
}
