//! Archimedean spiral point generation.
//!
//! The spiral is `r = k * theta`, swept over `theta in [0, sweep)` in fixed steps and
//! rotated by the current animation angle. Only points with `r` below a cutoff
//! (`canvas.height / cutoff_divisor`) are emitted, so the visible spiral is a fixed-size
//! disc that appears to rotate rather than grow.
//!
//! Points are recomputed from scratch every frame; the generator is a pure function of
//! the angle, the canvas and the parameters.

use std::f32::consts::PI;

use glam::Vec2;

use crate::scene::{Canvas, Mesh2D};

/// Spiral shape constants.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpiralParams {
    /// Radius growth per radian (`r = k * theta`), in pixels.
    pub k: f32,
    /// Angular sampling step in radians.
    pub step: f32,
    /// Total swept angle; samples cover `[0, sweep)`.
    pub sweep: f32,
    /// Visible radius is `canvas.height / cutoff_divisor`.
    pub cutoff_divisor: f32,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            k: 10.0,
            step: 0.05,
            sweep: 20.0 * PI,
            cutoff_divisor: 2.5,
        }
    }
}

impl SpiralParams {
    /// Number of samples in the sweep (before the visibility cutoff).
    #[inline]
    pub fn sample_count(&self) -> usize {
        if self.step <= 0.0 || self.sweep <= 0.0 {
            return 0;
        }
        (self.sweep / self.step).ceil() as usize
    }

    /// Radius below which points are visible for `canvas`.
    #[inline]
    pub fn visible_radius(&self, canvas: Canvas) -> f32 {
        canvas.height / self.cutoff_divisor
    }
}

/// Lazily generate the visible spiral points (canvas pixels) for a rotation `angle`.
///
/// The iterator is finite and can be recreated at any time with the same inputs to get
/// the same points.
pub fn spiral_points(
    angle: f32,
    canvas: Canvas,
    params: SpiralParams,
) -> impl Iterator<Item = Vec2> + Clone {
    let center = Vec2::from(canvas.center());
    let cutoff = params.visible_radius(canvas);

    (0..params.sample_count())
        .map(move |i| i as f32 * params.step)
        .take_while(move |&theta| theta < params.sweep)
        .filter_map(move |theta| {
            let r = params.k * theta;
            if r < cutoff {
                Some(center + Vec2::from_angle(theta + angle) * r)
            } else {
                None
            }
        })
}

/// Build a mesh with one small square per point.
///
/// Panics if `points` needs more than `u16::MAX` vertices (4 per point).
pub fn points_to_mesh(points: &[Vec2], point_size: f32) -> Mesh2D {
    let mut mesh = Mesh2D::with_capacity(points.len() * 4, points.len() * 6);
    for p in points {
        mesh.push_square(p.to_array(), point_size);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const CANVAS: Canvas = Canvas {
        width: 1024.0,
        height: 600.0,
    };

    #[test]
    fn sweep_sample_count() {
        // 20*pi / 0.05 = 1256.6 -> 1257 samples (0.0 ..= 62.80)
        assert_eq!(SpiralParams::default().sample_count(), 1257);
    }

    #[test]
    fn only_points_inside_cutoff_are_emitted() {
        let params = SpiralParams::default();
        let cutoff = params.visible_radius(CANVAS);
        assert_abs_diff_eq!(cutoff, 240.0);

        let center = Vec2::from(CANVAS.center());
        let points: Vec<_> = spiral_points(0.7, CANVAS, params).collect();

        // r = 10 * theta < 240 -> theta < 24 -> samples 0..480
        assert_eq!(points.len(), 480);
        for p in &points {
            assert!(p.distance(center) < cutoff + 1e-3);
        }
    }

    #[test]
    fn first_point_is_the_center() {
        let points: Vec<_> = spiral_points(1.234, CANVAS, SpiralParams::default()).collect();
        assert_eq!(points[0], Vec2::new(512.0, 300.0));
    }

    #[test]
    fn same_angle_gives_identical_points() {
        let params = SpiralParams::default();
        let a: Vec<_> = spiral_points(3.3, CANVAS, params).collect();
        let b: Vec<_> = spiral_points(3.3, CANVAS, params).collect();
        assert_eq!(a, b);

        let iter = spiral_points(3.3, CANVAS, params);
        let c: Vec<_> = iter.clone().collect();
        let d: Vec<_> = iter.collect();
        assert_eq!(c, d);
    }

    #[test]
    fn rotation_moves_points_around_the_center() {
        let params = SpiralParams::default();
        let center = Vec2::from(CANVAS.center());
        let still: Vec<_> = spiral_points(0.0, CANVAS, params).collect();
        let turned: Vec<_> = spiral_points(PI, CANVAS, params).collect();

        assert_eq!(still.len(), turned.len());
        for (a, b) in still.iter().zip(&turned) {
            // Half a turn mirrors each point through the center.
            let mirrored = center * 2.0 - *a;
            assert_abs_diff_eq!(b.x, mirrored.x, epsilon = 1e-2);
            assert_abs_diff_eq!(b.y, mirrored.y, epsilon = 1e-2);
        }
    }

    #[test]
    fn smaller_canvas_shows_fewer_points() {
        let params = SpiralParams::default();
        let big = spiral_points(0.0, CANVAS, params).count();
        let small = spiral_points(0.0, Canvas::new(400.0, 200.0), params).count();
        assert!(small < big);
        assert_eq!(spiral_points(0.0, Canvas::new(0.0, 0.0), params).count(), 0);
    }

    #[test]
    fn mesh_has_one_quad_per_point() {
        let points: Vec<_> = spiral_points(0.0, CANVAS, SpiralParams::default()).collect();
        let mesh = points_to_mesh(&points, 2.0);
        assert_eq!(mesh.positions.len(), points.len() * 4);
        assert_eq!(mesh.indices.len(), points.len() * 6);
    }
}
