//! Glyph/path tessellation helpers.
//!
//! Converts vector outlines (`lyon::path::Path`) into triangle meshes
//! (`crate::scene::Mesh2D`) with `lyon::tessellation::FillTessellator`.
//!
//! Notes:
//! - Fill tessellation with the non-zero rule, which is what fonts are authored for.
//! - `tolerance` is expressed in **output** units (pixels) and converted to path units
//!   using the transform's scale, so curve quality does not depend on units-per-em.

use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, FillVertexConstructor,
    VertexBuffers,
};

use crate::font::FontError;
use crate::scene::Mesh2D;

/// Tessellation options for glyph outlines.
#[derive(Debug, Copy, Clone)]
pub struct TessellateOptions {
    /// Max deviation from the true curve, in output units.
    pub tolerance: f32,
    pub fill_rule: FillRule,
}

impl Default for TessellateOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            fill_rule: FillRule::NonZero,
        }
    }
}

/// Minimal 2D affine transform for points (column-vector convention).
///
/// ```text
/// [ a c tx ]
/// [ b d ty ]
/// [ 0 0  1 ]
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine2x3 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for Affine2x3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2x3 {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Font units (y up) to pixels (y down), with the glyph origin at `(pen_x, baseline_y)`.
    #[inline]
    pub fn font_to_pixels(scale: f32, pen_x: f32, baseline_y: f32) -> Self {
        Self {
            a: scale,
            b: 0.0,
            c: 0.0,
            d: -scale,
            tx: pen_x,
            ty: baseline_y,
        }
    }

    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = self.a * x + self.c * y + self.tx;
        let ny = self.b * x + self.d * y + self.ty;
        (nx, ny)
    }

    /// Largest axis scale factor (used to convert tolerances between spaces).
    #[inline]
    pub fn max_scale(&self) -> f32 {
        let sx = (self.a * self.a + self.b * self.b).sqrt();
        let sy = (self.c * self.c + self.d * self.d).sqrt();
        sx.max(sy)
    }
}

/// Tessellation output vertex (2D position only).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TessVertex {
    pub position: [f32; 2],
}

struct TessVertexCtor {
    xf: Affine2x3,
}

impl FillVertexConstructor<TessVertex> for TessVertexCtor {
    fn new_vertex(&mut self, v: FillVertex) -> TessVertex {
        let p = v.position();
        let (x, y) = self.xf.transform_point(p.x, p.y);
        TessVertex { position: [x, y] }
    }
}

/// Tessellate a single outline path into a mesh, applying `transform` to every vertex.
pub fn tessellate_path_to_mesh(
    path: &Path,
    transform: Affine2x3,
    opts: TessellateOptions,
) -> Result<Mesh2D, FontError> {
    let mut tess = FillTessellator::new();
    let mut buffers: VertexBuffers<TessVertex, u16> = VertexBuffers::new();

    let scale = transform.max_scale().max(f32::EPSILON);
    let path_tolerance = (opts.tolerance / scale).max(1e-4);
    let fill = FillOptions::tolerance(path_tolerance).with_fill_rule(opts.fill_rule);

    let ctor = TessVertexCtor { xf: transform };
    tess.tessellate_path(path, &fill, &mut BuffersBuilder::new(&mut buffers, ctor))
        .map_err(|e| FontError::Tessellation(format!("{e:?}")))?;

    Ok(mesh_from_buffers(&buffers))
}

#[inline]
pub fn mesh_from_buffers(buffers: &VertexBuffers<TessVertex, u16>) -> Mesh2D {
    Mesh2D {
        positions: buffers.vertices.iter().map(|v| v.position).collect(),
        indices: buffers.indices.clone(),
    }
}

/// Append `src` into `dst` with index offset (u16 indices).
///
/// Panics if the vertex count exceeds `u16::MAX`.
pub fn append_mesh(dst: &mut Mesh2D, src: &Mesh2D) {
    let base = dst.positions.len();
    assert!(
        base + src.positions.len() <= u16::MAX as usize,
        "append_mesh: vertex count overflow for u16 indices"
    );

    dst.positions.extend_from_slice(&src.positions);

    let base_u16 = base as u16;
    dst.indices
        .extend(src.indices.iter().copied().map(|i| base_u16 + i));
}
