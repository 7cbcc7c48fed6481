//! GPU-side vertex and uniform layouts for 2D drawing.
//!
//! Coordinate convention:
//! - Vertex positions are canvas pixels (y down).
//! - `Uniforms2D::mvp` maps pixels to clip space (see `scene::Canvas::clip_from_pixel`).

use std::mem;

use crate::scene::{Mesh2D, Rgba};

/// A 2D vertex with a per-vertex color, so a whole frame can go out in one draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex2D {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex2D {
    pub const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    #[inline]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex2D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Standard 2D uniforms: a single MVP matrix, column-major for WGSL `mat4x4<f32>`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms2D {
    pub mvp: [[f32; 4]; 4],
}

impl Uniforms2D {
    #[inline]
    pub fn from_mat4(mvp: glam::Mat4) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
        }
    }
}

/// CPU-side batch of colored triangles with u32 indices.
#[derive(Clone, Debug, Default)]
pub struct Batch2D {
    pub vertices: Vec<Vertex2D>,
    pub indices: Vec<u32>,
}

impl Batch2D {
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append `mesh` with a solid `fill`, offsetting every vertex by `translation`.
    ///
    /// Draw order is append order. Fully transparent meshes are skipped.
    pub fn push_mesh(&mut self, mesh: &Mesh2D, fill: Rgba, translation: [f32; 2]) {
        if mesh.is_empty() || fill.a <= 0.0 {
            return;
        }
        let color = fill.to_array();
        let base = self.vertices.len() as u32;

        self.vertices.extend(mesh.positions.iter().map(|p| Vertex2D {
            position: [p[0] + translation[0], p[1] + translation[1]],
            color,
        }));
        self.indices
            .extend(mesh.indices.iter().map(|&i| base + i as u32));
    }
}

/// The color a cleared frame starts from, as a wgpu value.
#[inline]
pub fn clear_color(c: Rgba) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Mesh2D {
        Mesh2D {
            positions: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn meshes_keep_append_order_and_offset_indices() {
        let red = Rgba {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        };
        let mut batch = Batch2D::default();
        batch.push_mesh(&tri(), Rgba::WHITE, [0.0, 0.0]);
        batch.push_mesh(&tri(), red, [0.0, 0.0]);

        assert_eq!(batch.vertices.len(), 6);
        assert_eq!(batch.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(batch.vertices[0].color, Rgba::WHITE.to_array());
        assert_eq!(batch.vertices[3].color, red.to_array());
    }

    #[test]
    fn transparent_and_empty_meshes_are_skipped() {
        let mut batch = Batch2D::default();
        batch.push_mesh(&tri(), Rgba::WHITE.with_alpha(0.0), [0.0, 0.0]);
        batch.push_mesh(&Mesh2D::default(), Rgba::WHITE, [0.0, 0.0]);
        assert!(batch.is_empty());
    }

    #[test]
    fn push_mesh_translates() {
        let mut batch = Batch2D::default();
        batch.push_mesh(&tri(), Rgba::WHITE, [10.0, 20.0]);
        assert_eq!(batch.vertices[1].position, [11.0, 20.0]);

        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.vertices.is_empty());
    }

    #[test]
    fn vertex_layout_stride() {
        assert_eq!(Vertex2D::layout().array_stride, 24);
    }
}
