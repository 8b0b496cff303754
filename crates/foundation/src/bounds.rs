use crate::math::Vec3;

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Smallest box enclosing `points`, or `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = points.first()?;
        let mut min = first.as_array();
        let mut max = min;
        for p in &points[1..] {
            let a = p.as_array();
            for axis in 0..3 {
                min[axis] = min[axis].min(a[axis]);
                max[axis] = max[axis].max(a[axis]);
            }
        }
        Some(Aabb3 { min, max })
    }

    /// Slab test. Returns the entry distance along `dir` clamped to `t_min`,
    /// or `None` when the ray misses the box inside `[t_min, t_max]`.
    pub fn ray_entry(&self, origin: Vec3, dir: Vec3, mut t_min: f64, mut t_max: f64) -> Option<f64> {
        let o = origin.as_array();
        let d = dir.as_array();
        for axis in 0..3 {
            if d[axis].abs() < 1e-12 {
                if o[axis] < self.min[axis] || o[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[axis];
            let mut t1 = (self.min[axis] - o[axis]) * inv;
            let mut t2 = (self.max[axis] - o[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_max < t_min {
                return None;
            }
        }

        Some(t_min)
    }
}
