use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Vec3, lon_lat_from_point};

use crate::World;
use crate::components::Triangle;
use crate::entity::ObjectId;

/// Pick ray. Built fresh for every pointer event and never stored.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub object: ObjectId,
    /// Distance from the ray origin along the normalized direction.
    pub distance: f64,
    pub point: Vec3,
    /// `(lon_deg, lat_deg)` under the hit point.
    pub lon_lat: Option<(f64, f64)>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

const TRI_EPSILON: f64 = 1e-12;

/// Double-sided Möller–Trumbore test. Returns the hit distance `t > 0`.
pub fn intersect_triangle(origin: Vec3, dir: Vec3, tri: &Triangle) -> Option<f64> {
    let [v0, v1, v2] = *tri;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < TRI_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t > TRI_EPSILON { Some(t) } else { None }
}

/// Every visible object hit by `ray`, nearest first.
///
/// Each object contributes its closest triangle hit. Equal distances are
/// broken by ascending `ObjectId::index()`. Objects are culled by their
/// bounds before any triangle is tested.
pub fn pick_all(world: &World, ray: Ray, opts: PickOptions) -> Vec<PickHit> {
    let Some(dir) = ray.dir.normalized() else {
        return Vec::new();
    };

    let mut hits: Vec<PickHit> = Vec::new();
    for (object, obj) in world.visible() {
        let Some(bounds) = obj.bounds else {
            continue;
        };
        if bounds
            .ray_entry(ray.origin, dir, 0.0, opts.max_distance)
            .is_none()
        {
            continue;
        }

        let nearest = obj
            .mesh
            .triangles()
            .filter_map(|tri| intersect_triangle(ray.origin, dir, &tri))
            .filter(|t| *t <= opts.max_distance)
            .min_by(|a, b| stable_total_cmp_f64(*a, *b));

        if let Some(t) = nearest {
            let point = ray.origin + dir * t;
            hits.push(PickHit {
                object,
                distance: t,
                point,
                lon_lat: lon_lat_from_point(point),
            });
        }
    }

    hits.sort_by(|a, b| {
        stable_total_cmp_f64(a.distance, b.distance)
            .then_with(|| a.object.index().cmp(&b.object.index()))
    });
    hits
}

/// Nearest hit whose object carries a non-empty tag.
///
/// Untagged helper geometry can occlude nothing: it is skipped, not treated
/// as a blocker.
pub fn pick_nearest_tagged(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    pick_all(world, ray, opts).into_iter().find(|hit| {
        world
            .object(hit.object)
            .is_some_and(|obj| obj.is_tagged())
    })
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, intersect_triangle, pick_all, pick_nearest_tagged};
    use crate::World;
    use crate::components::{MeshPatch, Rgb};
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    /// Unit square in the plane `x = at`, facing the origin.
    fn wall(tag: &str, at: f64) -> MeshPatch {
        let a = Vec3::new(at, -1.0, -1.0);
        let b = Vec3::new(at, 1.0, -1.0);
        let c = Vec3::new(at, 1.0, 1.0);
        let d = Vec3::new(at, -1.0, 1.0);
        MeshPatch::from_triangles(tag, Rgb::from_hex(0xff0000), 0, [[a, b, c], [a, c, d]])
    }

    fn x_ray() -> Ray {
        Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0))
    }

    #[test]
    fn triangle_hits_from_both_sides() {
        let tri = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let front = intersect_triangle(Vec3::new(0.2, 0.2, 1.0), Vec3::new(0.0, 0.0, -1.0), &tri);
        let back = intersect_triangle(Vec3::new(0.2, 0.2, -2.0), Vec3::new(0.0, 0.0, 1.0), &tri);
        assert_close(front.expect("front"), 1.0, 1e-12);
        assert_close(back.expect("back"), 2.0, 1e-12);

        // Outside the triangle, behind the origin, and parallel rays miss.
        assert!(intersect_triangle(Vec3::new(0.8, 0.8, 1.0), Vec3::new(0.0, 0.0, -1.0), &tri).is_none());
        assert!(intersect_triangle(Vec3::new(0.2, 0.2, 1.0), Vec3::new(0.0, 0.0, 1.0), &tri).is_none());
        assert!(intersect_triangle(Vec3::new(0.2, 0.2, 1.0), Vec3::new(1.0, 0.0, 0.0), &tri).is_none());
    }

    #[test]
    fn hits_are_sorted_by_distance() {
        let mut world = World::new();
        let far = world.spawn(wall("far", 10.0));
        let near = world.spawn(wall("near", 5.0));

        let hits = pick_all(&world, x_ray(), PickOptions::default());
        let order: Vec<_> = hits.iter().map(|h| h.object).collect();
        assert_eq!(order, vec![near, far]);
        assert_close(hits[0].distance, 5.0, 1e-12);
        assert_eq!(hits[0].point, Vec3::new(5.0, 0.0, 0.0));

        let (lon, lat) = hits[0].lon_lat.expect("lon/lat");
        assert_close(lon, 0.0, 1e-12);
        assert_close(lat, 0.0, 1e-12);
    }

    #[test]
    fn untagged_helpers_are_not_candidates() {
        let mut world = World::new();
        world.spawn_helper(wall("indicator", 2.0));
        let target = world.spawn(wall("region", 4.0));

        assert_eq!(pick_all(&world, x_ray(), PickOptions::default()).len(), 2);
        let hit = pick_nearest_tagged(&world, x_ray(), PickOptions::default()).expect("hit");
        assert_eq!(hit.object, target);
    }

    #[test]
    fn hidden_and_distant_objects_are_ignored() {
        let mut world = World::new();
        let hidden = world.spawn(wall("hidden", 2.0));
        world.set_visible(hidden, false);
        world.spawn(wall("distant", 50.0));

        let opts = PickOptions { max_distance: 20.0 };
        assert!(pick_all(&world, x_ray(), opts).is_empty());
    }

    #[test]
    fn empty_world_and_zero_ray_yield_nothing() {
        let mut world = World::new();
        assert!(pick_nearest_tagged(&world, x_ray(), PickOptions::default()).is_none());

        world.spawn(wall("a", 3.0));
        let zero = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(pick_all(&world, zero, PickOptions::default()).is_empty());
    }
}
