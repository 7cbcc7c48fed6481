//! Continuous rotation driven by frame deltas.

/// Radians per second.
pub const ROTATION_SPEED: f32 = 0.5;

/// Accumulates a rotation angle from elapsed time.
///
/// The angle is never normalized; trigonometric periodicity does the wrapping.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationModel {
    angle: f32,
    speed: f32,
}

impl Default for RotationModel {
    fn default() -> Self {
        Self::new(ROTATION_SPEED)
    }
}

impl RotationModel {
    #[inline]
    pub fn new(speed: f32) -> Self {
        Self { angle: 0.0, speed }
    }

    /// Add `dt * speed` to the angle and return the new angle (radians).
    ///
    /// A negative `dt` rotates backward; callers feed clamped deltas.
    #[inline]
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.angle += dt * self.speed;
        self.angle
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(RotationModel::default().angle(), 0.0);
    }

    #[test]
    fn advances_at_half_radian_per_second() {
        let mut rot = RotationModel::default();
        assert_relative_eq!(rot.advance(2.0), 1.0);
        assert_relative_eq!(rot.advance(1.0), 1.5);
        assert_relative_eq!(rot.angle(), 1.5);
    }

    #[test]
    fn split_frames_match_one_large_frame() {
        let pairs = [(0.016, 0.017), (0.25, 1.75), (3.0, 0.0), (0.1, 0.2)];
        for (a, b) in pairs {
            let mut split = RotationModel::default();
            split.advance(a);
            split.advance(b);

            let mut whole = RotationModel::default();
            whole.advance(a + b);

            assert_relative_eq!(split.angle(), whole.angle(), max_relative = 1e-5);
        }
    }

    #[test]
    fn negative_dt_rotates_backward() {
        let mut rot = RotationModel::default();
        rot.advance(1.0);
        rot.advance(-0.5);
        assert_relative_eq!(rot.angle(), 0.25);
    }

    #[test]
    fn angle_is_not_wrapped() {
        let mut rot = RotationModel::new(std::f32::consts::TAU);
        rot.advance(3.0);
        assert_relative_eq!(rot.angle(), 3.0 * std::f32::consts::TAU);
    }
}
