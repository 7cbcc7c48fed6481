//! Renderer-agnostic 2D scene types.
//!
//! Everything here works in **pixel** coordinates of the drawing canvas:
//! - origin at the top-left corner
//! - +x to the right, +y down
//!
//! A [`Canvas`] maps pixels to clip space (via `glam`). Geometry is plain triangle
//! meshes ([`Mesh2D`]); color is attached when a renderer batches them.
//!
//! This module intentionally does not depend on wgpu.

pub mod spiral;

/// RGBA color in linear space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Opaque color from 8-bit sRGB channels (the way colors are usually written down).
    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
            a: 1.0,
        }
    }

    #[inline]
    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// An owned CPU triangle mesh (positions only, u16 indices).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh2D {
    pub positions: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl Mesh2D {
    #[inline]
    pub fn with_capacity(v: usize, i: usize) -> Self {
        Self {
            positions: Vec::with_capacity(v),
            indices: Vec::with_capacity(i),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Append an axis-aligned square of side `size` centered at `center` (two CCW triangles).
    ///
    /// Panics if the vertex count would exceed `u16::MAX`.
    pub fn push_square(&mut self, center: [f32; 2], size: f32) {
        let base = self.positions.len();
        assert!(
            base + 4 <= u16::MAX as usize,
            "Mesh2D::push_square: vertex count overflow for u16 indices"
        );

        let h = size * 0.5;
        let [cx, cy] = center;
        self.positions.extend_from_slice(&[
            [cx - h, cy - h],
            [cx + h, cy - h],
            [cx + h, cy + h],
            [cx - h, cy + h],
        ]);

        let b = base as u16;
        self.indices
            .extend_from_slice(&[b, b + 1, b + 2, b, b + 2, b + 3]);
    }
}

/// The drawable area, in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    #[inline]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn from_px(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn center(&self) -> [f32; 2] {
        [self.width * 0.5, self.height * 0.5]
    }

    /// True when nothing can be drawn (e.g. a minimized window).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }

    /// Map canvas pixels (y down) to clip space (-1..1, y up).
    pub fn clip_from_pixel(&self) -> glam::Mat4 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        glam::Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn clip_from_pixel_maps_corners() {
        let canvas = Canvas::new(1024.0, 600.0);
        let xf = canvas.clip_from_pixel();
        let clip = |x: f32, y: f32| {
            let p = xf.transform_point3(glam::Vec3::new(x, y, 0.0));
            (p.x, p.y)
        };

        let (x, y) = clip(0.0, 0.0);
        assert_abs_diff_eq!(x, -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y, 1.0, epsilon = 1e-5);

        let (x, y) = clip(1024.0, 600.0);
        assert_abs_diff_eq!(x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y, -1.0, epsilon = 1e-5);

        let [cx, cy] = canvas.center();
        let (x, y) = clip(cx, cy);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn push_square_offsets_indices() {
        let mut mesh = Mesh2D::default();
        mesh.push_square([10.0, 10.0], 2.0);
        mesh.push_square([20.0, 20.0], 2.0);

        assert_eq!(mesh.positions.len(), 8);
        assert_eq!(mesh.indices.len(), 12);
        assert_eq!(&mesh.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.positions[4], [19.0, 19.0]);
    }

    #[test]
    fn srgb_endpoints_are_exact() {
        assert_eq!(Rgba::from_srgb8(0, 0, 0), Rgba::BLACK);
        assert_eq!(Rgba::from_srgb8(255, 255, 255), Rgba::WHITE);
        let mid = Rgba::from_srgb8(128, 128, 128);
        assert!(mid.r > 0.2 && mid.r < 0.23);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Rgba::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Rgba::WHITE.with_alpha(-1.0).a, 0.0);
    }
}
