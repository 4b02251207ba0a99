use glam::{Mat4, Vec3};

use crate::color::Color;

/// Vertex for world-space debug lines.
///
/// Two consecutive vertices form one independent segment (line-list topology).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// Immediate-mode batch of world-space line segments.
///
/// Lines are recorded inside a [`LinePass`] opened with [`DebugLines::begin`].
/// Opening a pass drops the previous pass's lines but keeps the allocation, so
/// one `DebugLines` is reused every frame. The renderer uploads
/// [`as_bytes`](Self::as_bytes) and draws it with [`proj_view`](Self::proj_view).
#[derive(Debug)]
pub struct DebugLines {
    vertices: Vec<LineVertex>,
    proj_view: Mat4,
}

impl Default for DebugLines {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugLines {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Reserve room for `segments` line segments.
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(segments * 2),
            proj_view: Mat4::IDENTITY,
        }
    }

    /// Start this frame's pass, drawn with the given projection-view matrix.
    pub fn begin(&mut self, proj_view: Mat4) -> LinePass<'_> {
        self.vertices.clear();
        self.proj_view = proj_view;
        LinePass { lines: self }
    }

    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Vertex data ready for a GPU buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn proj_view(&self) -> Mat4 {
        self.proj_view
    }
}

/// An open line pass. Segments recorded here belong to the current frame.
pub struct LinePass<'a> {
    lines: &'a mut DebugLines,
}

impl LinePass<'_> {
    /// Add a segment from `a` to `b`, with a color per endpoint.
    pub fn line(&mut self, a: Vec3, color_a: Color, b: Vec3, color_b: Color) -> &mut Self {
        self.lines.vertices.push(LineVertex::new(a, color_a));
        self.lines.vertices.push(LineVertex::new(b, color_b));
        self
    }

    /// Outline a triangle with three segments: v0→v1, v1→v2, v2→v0.
    pub fn triangle(&mut self, vertices: [Vec3; 3], color: Color) -> &mut Self {
        let [v0, v1, v2] = vertices;
        self.line(v0, color, v1, color)
            .line(v1, color, v2, color)
            .line(v2, color, v0, color)
    }

    /// Close the pass and return how many segments it holds.
    pub fn end(self) -> usize {
        self.lines.segment_count()
    }
}
