use crate::Vec3;

/// A ray in 3D space with origin, direction, and a minimum parameter offset.
///
/// `t_min` is the smallest parameter value at which an intersection is
/// accepted. Secondary rays (reflections) carry a small positive offset so
/// they do not re-intersect the surface they were spawned from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub t_min: f32,
}

impl Ray {
    /// Create a new ray with no minimum parameter offset.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            t_min: 0.0,
        }
    }

    /// Create a ray whose intersections start at parameter `t_min`.
    pub fn with_offset(origin: Vec3, direction: Vec3, t_min: f32) -> Self {
        Self {
            origin,
            direction,
            t_min,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            t_min: 0.0,
        }
    }
}
