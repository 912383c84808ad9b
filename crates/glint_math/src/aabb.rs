use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box, the bounding volume of the BVH.
///
/// Stored as one interval per axis. Flat boxes (e.g. around an axis-aligned
/// triangle) are padded to a minimum width so the slab test stays robust.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

const MIN_EXTENT: f32 = 0.0001;

impl Aabb {
    /// Create an AABB from two corner points (any opposite pair).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            x: Interval::new(a.x.min(b.x), a.x.max(b.x)),
            y: Interval::new(a.y.min(b.y), a.y.max(b.y)),
            z: Interval::new(a.z.min(b.z), a.z.max(b.z)),
        };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create the smallest AABB containing both boxes.
    pub fn union(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::union(&a.x, &b.x),
            y: Interval::union(&a.y, &b.y),
            z: Interval::union(&a.z, &b.z),
        }
    }

    /// Extend the box to contain a point.
    pub fn grow(&mut self, p: Vec3) {
        self.x = Interval::union(&self.x, &Interval::new(p.x, p.x));
        self.y = Interval::union(&self.y, &Interval::new(p.y, p.y));
        self.z = Interval::union(&self.z, &Interval::new(p.z, p.z));
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Parameter at which a ray enters this box, or `None` if it misses.
    ///
    /// Slab method: the ray interval is clipped against the three axis
    /// slabs in turn. The returned value is the clipped interval's lower
    /// bound, which the BVH uses to visit the nearer child first and to
    /// prune subtrees beyond the current best hit.
    pub fn entry_distance(&self, r: &Ray, ray_t: Interval) -> Option<f32> {
        let mut t0 = ray_t.min;
        let mut t1 = ray_t.max;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let inv = 1.0 / r.direction[axis];
            let mut near = (slab.min - r.origin[axis]) * inv;
            let mut far = (slab.max - r.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut near, &mut far);
            }
            t0 = near.max(t0);
            t1 = far.min(t1);
            if t1 <= t0 {
                return None;
            }
        }

        Some(t0)
    }

    /// Test if a ray intersects this AABB within the given interval.
    pub fn hit(&self, r: &Ray, ray_t: Interval) -> bool {
        self.entry_distance(r, ray_t).is_some()
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.x.size();
        let y_size = self.y.size();
        let z_size = self.z.size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(
            (self.x.min + self.x.max) * 0.5,
            (self.y.min + self.y.max) * 0.5,
            (self.z.min + self.z.max) * 0.5,
        )
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }

    /// An AABB containing nothing.
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));

        // Ray pointing at the box
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_entry_distance() {
        let near = Aabb::from_points(Vec3::new(-1.0, -1.0, -3.0), Vec3::new(1.0, 1.0, -2.0));
        let far = Aabb::from_points(Vec3::new(-1.0, -1.0, -8.0), Vec3::new(1.0, 1.0, -6.0));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let range = Interval::new(0.0, f32::INFINITY);

        let t_near = near.entry_distance(&ray, range).unwrap();
        let t_far = far.entry_distance(&ray, range).unwrap();

        assert!((t_near - 2.0).abs() < 0.001);
        assert!((t_far - 6.0).abs() < 0.001);
        assert!(t_near < t_far);
    }

    #[test]
    fn test_aabb_entry_distance_origin_inside() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        // Slabs start behind the origin; the entry clamps to the interval min
        let t = aabb.entry_distance(&ray, Interval::new(0.0, 100.0)).unwrap();
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_aabb_pruned_by_interval() {
        let aabb = Aabb::from_points(Vec3::new(-1.0, -1.0, -8.0), Vec3::new(1.0, 1.0, -6.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        // A best-hit distance of 3 prunes a box entered at 6
        assert!(aabb.entry_distance(&ray, Interval::new(0.0, 3.0)).is_none());
    }

    #[test]
    fn test_aabb_flat_box_padded() {
        // A box around an axis-aligned triangle has zero extent in Z
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 1.0, -1.0));
        assert!(aabb.z.size() > 0.0);

        let ray = Ray::new(Vec3::new(0.5, 0.5, 0.0), Vec3::NEG_Z);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));
    }

    #[test]
    fn test_aabb_union_and_grow() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let b = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let u = Aabb::union(&a, &b);

        assert_eq!(u.x.min, 0.0);
        assert_eq!(u.x.max, 10.0);

        let mut g = Aabb::EMPTY;
        g.grow(Vec3::new(1.0, 2.0, 3.0));
        g.grow(Vec3::new(-1.0, 0.0, 7.0));
        assert_eq!(g.x.min, -1.0);
        assert_eq!(g.z.max, 7.0);
    }

    #[test]
    fn test_aabb_centroid_and_longest_axis() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 4.0, 2.0));
        assert_eq!(aabb.centroid(), Vec3::new(5.0, 2.0, 1.0));
        assert_eq!(aabb.longest_axis(), 0);

        let aabb_y = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);
    }
}
