//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree of axis-aligned boxes over a set of models. Built once at
//! scene-load time, read-only afterwards, so concurrent traversal from
//! multiple tracing threads is safe.

use glint_math::{Aabb, Interval, Ray};

use crate::model::{Intersection, Model};

/// Maximum primitives per leaf node before splitting.
///
/// Also the recursion terminator when primitives share a centroid: a set
/// that cannot be partitioned spatially still bottoms out by size.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with models.
pub enum Bvh {
    /// Internal node with two children.
    Branch {
        left: Box<Bvh>,
        right: Box<Bvh>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of models.
    Leaf { models: Vec<Box<dyn Model>>, bbox: Aabb },
    /// Aggregate over nothing; reports no hits.
    Empty,
}

impl Bvh {
    /// Build a BVH over a set of models, consuming them.
    ///
    /// An empty input produces `Bvh::Empty`, which is valid and never hits.
    pub fn build(models: Vec<Box<dyn Model>>) -> Self {
        if models.is_empty() {
            return Bvh::Empty;
        }
        Self::split(models)
    }

    /// Recursive top-down construction: median split on the axis with the
    /// widest centroid spread.
    fn split(mut models: Vec<Box<dyn Model>>) -> Self {
        let bounds = models
            .iter()
            .fold(Aabb::EMPTY, |acc, m| Aabb::union(&acc, &m.bounding_box()));

        if models.len() <= LEAF_MAX_SIZE {
            return Bvh::Leaf {
                models,
                bbox: bounds,
            };
        }

        let centroid_bounds = models.iter().fold(Aabb::EMPTY, |mut acc, m| {
            acc.grow(m.bounding_box().centroid());
            acc
        });
        let axis = centroid_bounds.longest_axis();

        models.sort_unstable_by(|a, b| {
            let a_val = a.bounding_box().centroid()[axis];
            let b_val = b.bounding_box().centroid()[axis];
            a_val
                .partial_cmp(&b_val)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let right_models = models.split_off(models.len() / 2);
        let left = Self::split(models);
        let right = Self::split(right_models);

        Bvh::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }

    /// Number of nodes in the tree; diagnostics only.
    pub fn node_count(&self) -> usize {
        match self {
            Bvh::Empty => 0,
            Bvh::Leaf { .. } => 1,
            Bvh::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }
}

impl Model for Bvh {
    /// Depth-first traversal, nearer child first.
    ///
    /// Child boxes are tested with the slab entry distance; the farther
    /// subtree is skipped entirely once the nearer one produced a hit in
    /// front of its box.
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, hit: &mut Intersection<'a>) -> bool {
        match self {
            Bvh::Empty => false,

            Bvh::Leaf { models, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let mut hit_anything = false;
                let mut closest = ray_t.max;

                for model in models {
                    if model.intersect(ray, Interval::new(ray_t.min, closest), hit) {
                        hit_anything = true;
                        closest = hit.t;
                    }
                }
                hit_anything
            }

            Bvh::Branch { left, right, .. } => {
                let t_left = left.bounding_box().entry_distance(ray, ray_t);
                let t_right = right.bounding_box().entry_distance(ray, ray_t);

                let (first, second) = match (t_left, t_right) {
                    (None, None) => return false,
                    (Some(_), None) => (left, None),
                    (None, Some(_)) => (right, None),
                    (Some(tl), Some(tr)) => {
                        if tl <= tr {
                            (left, Some((right, tr)))
                        } else {
                            (right, Some((left, tl)))
                        }
                    }
                };

                let mut hit_anything = first.intersect(ray, ray_t, hit);

                if let Some((second, t_entry)) = second {
                    let closest = if hit_anything { hit.t } else { ray_t.max };
                    // Prune the farther child behind the current best hit
                    if t_entry < closest {
                        hit_anything |=
                            second.intersect(ray, Interval::new(ray_t.min, closest), hit);
                    }
                }

                hit_anything
            }
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Bvh::Empty => Aabb::EMPTY,
            Bvh::Leaf { bbox, .. } => *bbox,
            Bvh::Branch { bbox, .. } => *bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::MeshTriangle;
    use glint_core::TriangleMesh;
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    /// A small square facing +Z at the given center.
    fn quad_at(center: Vec3, half: f32) -> Vec<Box<dyn Model>> {
        let mesh = Arc::new(TriangleMesh::new(
            vec![
                center + Vec3::new(-half, -half, 0.0),
                center + Vec3::new(half, -half, 0.0),
                center + Vec3::new(half, half, 0.0),
                center + Vec3::new(-half, half, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
            None,
        ));
        (0..2)
            .map(|f| Box::new(MeshTriangle::new(mesh.clone(), f)) as Box<dyn Model>)
            .collect()
    }

    /// A soup of random small triangles inside the unit-ish cube.
    fn triangle_soup(seed: u64, count: usize) -> Vec<Arc<TriangleMesh>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut meshes = Vec::with_capacity(count);
        for _ in 0..count {
            let base = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let e1 = Vec3::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5), 0.1);
            let e2 = Vec3::new(0.1, rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
            meshes.push(Arc::new(TriangleMesh::new(
                vec![base, base + e1, base + e2],
                vec![0, 1, 2],
                None,
            )));
        }
        meshes
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(vec![]);
        assert!(matches!(bvh, Bvh::Empty));
        assert_eq!(bvh.node_count(), 0);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut hit = Intersection::default();
        assert!(!bvh.intersect(&ray, Interval::new(0.0, f32::INFINITY), &mut hit));
    }

    #[test]
    fn test_bvh_single_quad_is_leaf() {
        let bvh = Bvh::build(quad_at(Vec3::new(0.0, 0.0, -1.0), 1.0));
        assert!(matches!(bvh, Bvh::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut hit = Intersection::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!((hit.t - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_bvh_nearest_of_many() {
        let mut models = Vec::new();
        for z in 1..=10 {
            models.extend(quad_at(Vec3::new(0.0, 0.0, -(z as f32)), 0.4));
        }
        let bvh = Bvh::build(models);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut hit = Intersection::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!((hit.t - 1.0).abs() < 0.001, "expected nearest quad, got t={}", hit.t);
    }

    #[test]
    fn test_bvh_ray_missing_root_box_misses_everything() {
        let mut models = Vec::new();
        for z in 1..=4 {
            models.extend(quad_at(Vec3::new(0.0, 0.0, -(z as f32)), 0.4));
        }
        let bvh = Bvh::build(models);

        // Far outside the root box, parallel to it
        let ray = Ray::new(Vec3::new(100.0, 0.0, 0.0), Vec3::NEG_Z);
        let mut hit = Intersection::default();
        assert!(!bvh.intersect(&ray, Interval::new(0.0, f32::INFINITY), &mut hit));
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let meshes = triangle_soup(7, 200);
        let models: Vec<Box<dyn Model>> = meshes
            .iter()
            .map(|m| Box::new(MeshTriangle::new(m.clone(), 0)) as Box<dyn Model>)
            .collect();
        let brute: Vec<MeshTriangle> = meshes
            .iter()
            .map(|m| MeshTriangle::new(m.clone(), 0))
            .collect();
        let bvh = Bvh::build(models);

        let mut rng = StdRng::seed_from_u64(99);
        let range = Interval::new(0.001, f32::INFINITY);

        for _ in 0..100 {
            let origin = Vec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
            );
            let direction = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if direction.length_squared() < 1e-6 {
                continue;
            }
            let ray = Ray::new(origin, direction.normalize());

            let mut bvh_hit = Intersection::default();
            let bvh_found = bvh.intersect(&ray, range, &mut bvh_hit);

            let mut brute_hit = Intersection::default();
            let mut brute_found = false;
            let mut closest = range.max;
            for tri in &brute {
                if tri.intersect(&ray, Interval::new(range.min, closest), &mut brute_hit) {
                    brute_found = true;
                    closest = brute_hit.t;
                }
            }

            assert_eq!(bvh_found, brute_found);
            if bvh_found {
                assert!(
                    (bvh_hit.t - brute_hit.t).abs() < 1e-3,
                    "bvh t={} brute t={}",
                    bvh_hit.t,
                    brute_hit.t
                );
            }
        }
    }

    #[test]
    fn test_bvh_identical_centroids_terminate() {
        // Many triangles stacked at the same place: the spatial split cannot
        // separate them, the size cutoff must
        let mut models: Vec<Box<dyn Model>> = Vec::new();
        for _ in 0..64 {
            models.extend(quad_at(Vec3::new(0.0, 0.0, -2.0), 0.5));
        }
        let bvh = Bvh::build(models);
        assert!(bvh.node_count() > 0);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut hit = Intersection::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut hit));
        assert!((hit.t - 2.0).abs() < 0.001);
    }
}
