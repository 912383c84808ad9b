//! Instanced geometry: a shared BVH placed in the world by a transform.
//!
//! Each actor in the scene becomes one `ModelInstance`. Actors that share a
//! mesh share the same `Arc<Bvh>`, so the acceleration structure is built
//! once per distinct mesh no matter how many times it appears.

use std::sync::Arc;

use glint_core::{Material, TriangleMesh};
use glint_math::{Aabb, Interval, Mat4, Mat4Ext, Ray};

use crate::bvh::Bvh;
use crate::model::{Intersection, Model};

/// One placement of a mesh BVH in the world.
pub struct ModelInstance {
    /// Per-mesh acceleration structure, shared between instances.
    aggregate: Arc<Bvh>,
    mesh: Arc<TriangleMesh>,
    local_to_world: Mat4,
    world_to_local: Mat4,
    material: Arc<Material>,
    /// Bounds of the instanced geometry in world space.
    world_bounds: Aabb,
}

impl ModelInstance {
    pub fn new(
        aggregate: Arc<Bvh>,
        mesh: Arc<TriangleMesh>,
        local_to_world: Mat4,
        material: Arc<Material>,
    ) -> Self {
        let world_to_local = local_to_world.inverse();
        let world_bounds = local_to_world.transform_aabb(&aggregate.bounding_box());
        Self {
            aggregate,
            mesh,
            local_to_world,
            world_to_local,
            material,
            world_bounds,
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

impl Model for ModelInstance {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Intersection<'a>) -> bool {
        if !self.world_bounds.hit(ray, ray_t) {
            return false;
        }

        // The local direction is deliberately NOT normalized so that t values
        // measured in local space are valid world-space distances as well.
        let local_ray = Ray::with_offset(
            self.world_to_local.transform_point3(ray.origin),
            self.world_to_local.transform_vector3(ray.direction),
            ray.t_min,
        );

        let mut local_hit = Intersection::default();
        if !self.aggregate.intersect(&local_ray, ray_t, &mut local_hit) {
            return false;
        }

        hit.t = local_hit.t;
        hit.p = self.local_to_world.transform_point3(local_hit.p);
        // Normals transform by the inverse transpose, which is the transpose
        // of world_to_local.
        hit.normal = self
            .world_to_local
            .transpose()
            .transform_vector3(local_hit.normal)
            .normalize();
        hit.u = local_hit.u;
        hit.v = local_hit.v;
        hit.material = self.material.as_ref();
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.world_bounds
    }

    fn as_triangle_mesh(&self) -> Option<&TriangleMesh> {
        Some(&self.mesh)
    }
}
