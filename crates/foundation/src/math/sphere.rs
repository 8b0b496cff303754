//! Longitude/latitude to sphere mapping used for draping geographic data.
//!
//! Convention (y-up, right-handed viewer space):
//! - `x = r·cos(lat)·cos(−lon)`
//! - `y = r·sin(lat)`
//! - `z = r·cos(lat)·sin(−lon)`
//!
//! Longitude is negated before conversion. Dropping the sign mirrors every
//! polygon east/west.

use super::Vec3;

/// A point on a sphere of some radius, in viewer-space Cartesian coordinates.
pub type SpherePoint = Vec3;

/// Project `(lon_deg, lat_deg)` onto the sphere of `radius`.
///
/// Total for finite inputs; no range checks are applied.
#[inline]
pub fn project_lon_lat(lon_deg: f64, lat_deg: f64, radius: f64) -> SpherePoint {
    let lat_rad = lat_deg.to_radians();
    let lon_rad = -lon_deg.to_radians();
    let cos_lat = lat_rad.cos();
    Vec3::new(
        radius * cos_lat * lon_rad.cos(),
        radius * lat_rad.sin(),
        radius * cos_lat * lon_rad.sin(),
    )
}

/// Inverse of [`project_lon_lat`]: `(lon_deg, lat_deg)` of the direction of `p`.
///
/// The radius of `p` is ignored. Returns `None` for the origin.
pub fn lon_lat_from_point(p: SpherePoint) -> Option<(f64, f64)> {
    let r = p.length();
    if r <= 0.0 || !r.is_finite() {
        return None;
    }
    let lat = (p.y / r).clamp(-1.0, 1.0).asin();
    let lon = -p.z.atan2(p.x);
    Some((lon.to_degrees(), lat.to_degrees()))
}

/// Rescale `p` so it lies on the sphere of `radius` (same direction).
///
/// Returns `None` for the origin, which has no direction.
#[inline]
pub fn onto_sphere(p: Vec3, radius: f64) -> Option<SpherePoint> {
    p.normalized().map(|n| n * radius)
}
