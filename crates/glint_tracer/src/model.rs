//! Model trait and Intersection record for ray-geometry queries.

use glint_core::{Material, TriangleMesh};
use glint_math::{Aabb, Interval, Ray, Vec3};

/// Record of the nearest ray-model intersection found so far.
///
/// Produced by a single `intersect` call and consumed immediately by the
/// shader; it is never retained across rays.
#[derive(Clone)]
pub struct Intersection<'a> {
    /// Point of intersection in world space
    pub p: Vec3,
    /// Ray parameter at the intersection
    pub t: f32,
    /// Shading normal, oriented against the ray direction
    pub normal: Vec3,
    /// Barycentric coordinates on the hit triangle
    pub u: f32,
    pub v: f32,
    /// Material at the intersection point
    pub material: &'a Material,
}

impl<'a> Default for Intersection<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            t: f32::INFINITY,
            normal: Vec3::ZERO,
            u: 0.0,
            v: 0.0,
            material: &Material::DEFAULT,
        }
    }
}

/// Anything a ray can be traced against: leaf shapes, instances, and
/// aggregates (the BVH itself).
pub trait Model: Send + Sync {
    /// Test the ray against this model within the parameter interval.
    ///
    /// Returns true and fills `hit` if an intersection nearer than `hit.t`
    /// exists within `ray_t`; otherwise leaves `hit` untouched. A miss is
    /// an expected result, never an error.
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Intersection<'a>) -> bool;

    /// Axis-aligned bounding box of this model in its own space.
    fn bounding_box(&self) -> Aabb;

    /// The triangle mesh backing this model, if any.
    ///
    /// Capability query used during engine construction to share one
    /// per-mesh BVH across instances; aggregates return `None`.
    fn as_triangle_mesh(&self) -> Option<&TriangleMesh> {
        None
    }
}
