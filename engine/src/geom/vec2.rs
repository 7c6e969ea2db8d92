use glam::Vec2;

/// Vector operations the engine uses beyond what [`glam::Vec2`] provides.
pub trait Vec2Ext {
    /// Add `value` to both components.
    fn add_value(self, value: f32) -> Vec2;

    /// Subtract `value` from both components.
    fn sub_value(self, value: f32) -> Vec2;

    /// Rotate counter-clockwise by `angle` radians: `(x cos - y sin, x sin + y cos)`.
    fn rotated(self, angle: f32) -> Vec2;

    /// Reflect off a surface with unit `normal`.
    fn reflected(self, normal: Vec2) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn add_value(self, value: f32) -> Vec2 {
        self + Vec2::splat(value)
    }

    #[inline]
    fn sub_value(self, value: f32) -> Vec2 {
        self - Vec2::splat(value)
    }

    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        let (s, c) = angle.sin_cos();
        Vec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    #[inline]
    fn reflected(self, normal: Vec2) -> Vec2 {
        self - normal * (2.0 * self.dot(normal))
    }
}

/// Sign of `value`: `1`, `-1`, or `0` for zero (unlike [`f32::signum`]).
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
