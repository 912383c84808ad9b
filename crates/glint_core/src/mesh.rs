//! Triangle mesh geometry consumed by the ray tracing engine.
//!
//! The engine refines a mesh into one primitive per triangle and builds a
//! BVH over them, so meshes stay immutable after scene construction.

use std::sync::atomic::{AtomicU64, Ordering};

use glint_math::{Aabb, Vec3};

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// An indexed triangle mesh with optional per-vertex normals.
///
/// Each mesh carries a process-unique `id`, which the engine uses as the
/// key of its per-mesh BVH registry: actors sharing a mesh share one
/// acceleration structure.
#[derive(Debug)]
pub struct TriangleMesh {
    /// Process-unique mesh identifier
    pub id: u64,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional, same length as positions when present)
    pub normals: Option<Vec<Vec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of all vertices
    pub bounds: Aabb,
}

impl TriangleMesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// Normals are NOT computed automatically; call `compute_normals()` if
    /// smooth shading is wanted.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            id: NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed),
            positions,
            normals,
            indices,
            bounds,
        }
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for &p in positions {
            bounds.grow(p);
        }
        bounds
    }

    /// Number of complete triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of triangle `face`, or `None` if the face is out of
    /// range or references a missing vertex.
    ///
    /// Malformed index data is treated as absent geometry, never a panic.
    pub fn face_indices(&self, face: usize) -> Option<[usize; 3]> {
        let chunk = self.indices.get(face * 3..face * 3 + 3)?;
        let idx = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
        if idx.iter().any(|&i| i >= self.positions.len()) {
            log::warn!(
                "mesh {}: triangle {} references invalid vertices {:?} (vertex count {})",
                self.id,
                face,
                idx,
                self.positions.len()
            );
            return None;
        }
        Some(idx)
    }

    /// Vertex positions of triangle `face`.
    pub fn triangle(&self, face: usize) -> Option<[Vec3; 3]> {
        let [i0, i1, i2] = self.face_indices(face)?;
        Some([self.positions[i0], self.positions[i1], self.positions[i2]])
    }

    /// Geometric (face) normal of triangle `face`, unit length.
    pub fn face_normal(&self, face: usize) -> Option<Vec3> {
        let [v0, v1, v2] = self.triangle(face)?;
        Some((v1 - v0).cross(v2 - v0).normalize_or_zero())
    }

    /// Shading normal at barycentric coordinates (u, v) of triangle `face`.
    ///
    /// Interpolates vertex normals when the mesh has them, otherwise falls
    /// back to the face normal.
    pub fn shading_normal(&self, face: usize, u: f32, v: f32) -> Option<Vec3> {
        let [i0, i1, i2] = self.face_indices(face)?;
        if let Some(normals) = &self.normals {
            if normals.len() == self.positions.len() {
                let n = normals[i0] * (1.0 - u - v) + normals[i1] * u + normals[i2] * v;
                let n = n.normalize_or_zero();
                if n != Vec3::ZERO {
                    return Some(n);
                }
            }
        }
        self.face_normal(face)
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Replaces any existing normals. Each vertex normal is the normalized
    /// sum of the (area-weighted) normals of all faces sharing the vertex.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for face in 0..self.triangle_count() {
            let Some([i0, i1, i2]) = self.face_indices(face) else {
                continue;
            };
            let p0 = self.positions[i0];
            let face_normal = (self.positions[i1] - p0).cross(self.positions[i2] - p0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            let n = normal.normalize_or_zero();
            // Default up normal for vertices with no valid faces
            *normal = if n == Vec3::ZERO { Vec3::Y } else { n };
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has per-vertex normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> TriangleMesh {
        TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            None,
        )
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_triangle();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_normals());
    }

    #[test]
    fn test_mesh_ids_are_unique() {
        let a = unit_triangle();
        let b = unit_triangle();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_face_normal() {
        let mesh = unit_triangle();
        let n = mesh.face_normal(0).unwrap();
        // CCW winding in the XY plane points +Z
        assert!((n - Vec3::Z).length() < 0.001);
    }

    #[test]
    fn test_invalid_faces_are_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();

        // Second triangle references vertex 9, which does not exist
        let mesh = TriangleMesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2, 0, 1, 9],
            None,
        );

        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.triangle(0).is_some());
        assert!(mesh.triangle(1).is_none());
        assert!(mesh.triangle(5).is_none());
    }

    #[test]
    fn test_compute_normals() {
        let mut mesh = unit_triangle();
        mesh.compute_normals();

        assert!(mesh.has_normals());
        for normal in mesh.normals.as_ref().unwrap() {
            assert!((*normal - Vec3::Z).length() < 0.001);
        }
    }

    #[test]
    fn test_shading_normal_interpolates() {
        // Two normals tilted opposite ways around Y; the centroid normal
        // should fall in between
        let mut mesh = unit_triangle();
        mesh.normals = Some(vec![
            Vec3::new(-1.0, 0.0, 1.0).normalize(),
            Vec3::new(1.0, 0.0, 1.0).normalize(),
            Vec3::Z,
        ]);

        let n = mesh.shading_normal(0, 1.0 / 3.0, 1.0 / 3.0).unwrap();
        assert!(n.z > 0.9);
        assert!(n.x.abs() < 0.1);
    }

    #[test]
    fn test_bounds() {
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(-1.0, -2.0, -3.0),
                Vec3::new(4.0, 5.0, 6.0),
                Vec3::ZERO,
            ],
            vec![0, 1, 2],
            None,
        );

        assert!((mesh.bounds.x.min - (-1.0)).abs() < 0.001);
        assert!((mesh.bounds.y.max - 5.0).abs() < 0.001);
        assert!((mesh.bounds.z.max - 6.0).abs() < 0.001);
    }
}
