//! Per-triangle primitive over a shared mesh.
//!
//! Refining a mesh produces one `MeshTriangle` per face; all of them share
//! the mesh through an `Arc`, so the BVH stores no duplicated geometry.
//! Intersection uses the Möller-Trumbore algorithm.

use std::sync::Arc;

use glint_core::TriangleMesh;
use glint_math::{Aabb, Interval, Ray};

use crate::model::{Intersection, Model};

/// One face of a triangle mesh, addressable by the BVH.
pub struct MeshTriangle {
    mesh: Arc<TriangleMesh>,
    face: usize,
    bbox: Aabb,
}

impl MeshTriangle {
    /// Create the primitive for face `face` of `mesh`.
    ///
    /// A face with invalid indices gets an empty bounding box and never
    /// reports a hit.
    pub fn new(mesh: Arc<TriangleMesh>, face: usize) -> Self {
        let bbox = match mesh.triangle(face) {
            Some([v0, v1, v2]) => {
                let mut bbox = Aabb::from_points(v0, v1);
                bbox.grow(v2);
                bbox
            }
            None => Aabb::EMPTY,
        };
        Self { mesh, face, bbox }
    }

    /// The face index within the backing mesh.
    pub fn face(&self) -> usize {
        self.face
    }
}

impl Model for MeshTriangle {
    /// Möller-Trumbore ray-triangle intersection.
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Intersection<'a>) -> bool {
        let Some([v0, v1, v2]) = self.mesh.triangle(self.face) else {
            return false;
        };

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to the triangle plane
        if det.abs() < 1e-8 {
            return false;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = inv_det * edge2.dot(q);
        if !ray_t.contains(t) {
            return false;
        }

        let Some(normal) = self.mesh.shading_normal(self.face, u, v) else {
            return false;
        };

        hit.t = t;
        hit.p = ray.at(t);
        // Orient against the ray so hit-point offsets push outward
        hit.normal = if normal.dot(ray.direction) > 0.0 {
            -normal
        } else {
            normal
        };
        hit.u = u;
        hit.v = v;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn as_triangle_mesh(&self) -> Option<&TriangleMesh> {
        Some(&self.mesh)
    }
}
