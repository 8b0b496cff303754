//! Ear-clipping triangulation of planar `(lon, lat)` rings.
//!
//! Rings are triangulated in 2D before anything is projected onto the
//! sphere; triangulating projected points would have to deal with spherical
//! degeneracies that the planar case does not have.

use earcutr::earcut;
use foundation::math::Vec2;
use tracing::trace;

/// Signed area of the triangle `abc`; positive when counter-clockwise.
pub fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    0.5 * (b - a).perp_dot(c - a)
}

/// Shoelace area of a ring; positive when counter-clockwise.
pub fn ring_signed_area(ring: &[Vec2]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        twice += p.perp_dot(q);
    }
    0.5 * twice
}

/// Triangulate a simple polygon ring.
///
/// Returned indices reference positions in `ring`. A closing point equal to
/// the first one is tolerated. Rings with fewer than three distinct points,
/// zero area, or non-finite coordinates yield no triangles.
pub fn triangulate(ring: &[Vec2]) -> Vec<[usize; 3]> {
    let len = open_len(ring);
    if len < 3 {
        return Vec::new();
    }
    let ring = &ring[..len];

    if ring.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        trace!(len, "ring has non-finite coordinates");
        return Vec::new();
    }
    if ring_signed_area(ring) == 0.0 {
        trace!(len, "ring is degenerate");
        return Vec::new();
    }

    let coords: Vec<f64> = ring.iter().flat_map(|p| [p.x, p.y]).collect();
    let holes: Vec<usize> = Vec::new();
    let indices = match earcut(&coords, &holes, 2) {
        Ok(ix) => ix,
        Err(e) => {
            trace!(len, error = ?e, "earcut failed");
            return Vec::new();
        }
    };

    indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect()
}

/// [`triangulate`] with every triple reordered counter-clockwise.
///
/// Clockwise triangles get their second and third index swapped. Zero-area
/// triangles are left as they are.
pub fn triangulate_ccw(ring: &[Vec2]) -> Vec<[usize; 3]> {
    let mut tris = triangulate(ring);
    for t in &mut tris {
        if signed_area(ring[t[0]], ring[t[1]], ring[t[2]]) < 0.0 {
            t.swap(1, 2);
        }
    }
    tris
}

/// Length of `ring` without a closing duplicate of the first point.
fn open_len(ring: &[Vec2]) -> usize {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() >= 2 && first == last => ring.len() - 1,
        _ => ring.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ring_signed_area, signed_area, triangulate, triangulate_ccw};
    use foundation::math::Vec2;

    fn ring(points: &[(f64, f64)]) -> Vec<Vec2> {
        points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    fn total_area(r: &[Vec2], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| signed_area(r[t[0]], r[t[1]], r[t[2]]).abs())
            .sum()
    }

    #[test]
    fn square_yields_two_triangles() {
        let r = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let tris = triangulate(&r);
        assert_eq!(tris.len(), 2);
        assert!((total_area(&r, &tris) - 1.0).abs() < 1e-12);
        assert!(tris.iter().flatten().all(|&i| i < r.len()));
    }

    #[test]
    fn closing_duplicate_is_ignored() {
        let r = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        let tris = triangulate(&r);
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().flatten().all(|&i| i < 4));
    }

    #[test]
    fn concave_ring_covers_its_area() {
        // L shape, area 3.
        let r = ring(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]);
        let tris = triangulate(&r);
        assert_eq!(tris.len(), 4);
        assert!((total_area(&r, &tris) - ring_signed_area(&r)).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rings_are_empty() {
        assert!(triangulate(&[]).is_empty());
        assert!(triangulate(&ring(&[(0.0, 0.0), (1.0, 1.0)])).is_empty());
        assert!(triangulate(&ring(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)])).is_empty());
        assert!(triangulate(&ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)])).is_empty());
        assert!(triangulate(&ring(&[(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)])).is_empty());
    }

    #[test]
    fn ccw_triples_have_non_negative_area() {
        let ccw = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (2.0, 1.0), (0.0, 3.0)]);
        let cw: Vec<Vec2> = ccw.iter().rev().copied().collect();
        assert!(ring_signed_area(&cw) < 0.0);

        for r in [&ccw, &cw] {
            let tris = triangulate_ccw(r);
            assert!(!tris.is_empty());
            for t in tris {
                assert!(signed_area(r[t[0]], r[t[1]], r[t[2]]) >= 0.0);
            }
        }
    }
}
