// Transform utilities for Mat4
//
// Extends glam::Mat4 with the transforms ray tracing needs beyond
// transform_point3(): direction vectors (w=0) and bounding boxes.

use crate::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a direction vector (applies rotation and scale, but NOT
    /// translation). Vectors have an implicit w=0 component.
    fn transform_vector3(&self, vector: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_vector3(&self, vector: Vec3) -> Vec3 {
        let v = *self * Vec4::new(vector.x, vector.y, vector.z, 0.0);
        Vec3::new(v.x, v.y, v.z)
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        let corners = [
            Vec3::new(aabb.x.min, aabb.y.min, aabb.z.min),
            Vec3::new(aabb.x.max, aabb.y.min, aabb.z.min),
            Vec3::new(aabb.x.min, aabb.y.max, aabb.z.min),
            Vec3::new(aabb.x.max, aabb.y.max, aabb.z.min),
            Vec3::new(aabb.x.min, aabb.y.min, aabb.z.max),
            Vec3::new(aabb.x.max, aabb.y.min, aabb.z.max),
            Vec3::new(aabb.x.min, aabb.y.max, aabb.z.max),
            Vec3::new(aabb.x.max, aabb.y.max, aabb.z.max),
        ];

        let mut min = self.transform_point3(corners[0]);
        let mut max = min;
        for &corner in &corners[1..] {
            let p = self.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }

        Aabb::from_points(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_vector3_ignores_translation() {
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let v = m.transform_vector3(Vec3::Y);
        assert_eq!(v, Vec3::Y);
    }

    #[test]
    fn test_transform_vector3_rotation() {
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let v = m.transform_vector3(Vec3::X);
        assert!((v - Vec3::Y).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_translation() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let m = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let moved = m.transform_aabb(&aabb);

        assert!((moved.x.min - 2.0).abs() < 0.001);
        assert!((moved.x.max - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_stays_tight_enough() {
        // Rotating a unit box by 45 degrees around Z widens X and Y to sqrt(2)
        let aabb = Aabb::from_points(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5));
        let m = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_4);
        let rotated = m.transform_aabb(&aabb);

        let half_diag = std::f32::consts::SQRT_2 / 2.0;
        assert!((rotated.x.max - half_diag).abs() < 0.001);
        assert!((rotated.y.max - half_diag).abs() < 0.001);
        assert!((rotated.z.max - 0.5).abs() < 0.001);
    }
}
