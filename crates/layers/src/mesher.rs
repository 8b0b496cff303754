//! Geo polygons to sphere-draped triangle patches.
//!
//! Per areal feature:
//! 1. triangulate the outer ring of every polygon in planar `(lon, lat)`,
//! 2. orient each triangle counter-clockwise in that plane,
//! 3. project the corners onto the sphere of `radius`,
//! 4. quadrisect adaptively, lifting every new midpoint to `radius + rise`.
//!
//! Every top-level triangle becomes one [`MeshPatch`]. Root corners stay on
//! the base sphere while all subdivision vertices sit on the raised one.

use foundation::math::{Vec2, onto_sphere, project_lon_lat};
use formats::{FeatureCollection, GeoFeature, GeometryKind};
use scene::components::{MeshPatch, Rgb, Triangle};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::triangulate::triangulate_ccw;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesherConfig {
    /// Base sphere radius; polygon corners are projected here.
    pub radius: f64,
    /// Altitude of subdivision midpoints above the base sphere.
    pub rise: f64,
    pub color: Rgb,
    pub max_subdivision_depth: u32,
    /// Triangles whose longest edge is shorter than this are not split.
    pub min_edge_length: f64,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            rise: 0.0,
            color: Rgb::from_hex(0xff0000),
            max_subdivision_depth: 3,
            min_edge_length: 0.05,
        }
    }
}

impl MesherConfig {
    pub fn validate(&self) -> Result<(), MesherError> {
        let fields = [
            ("radius", self.radius),
            ("rise", self.rise),
            ("min_edge_length", self.min_edge_length),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(MesherError::NonFinite { field: name });
            }
        }
        if self.radius <= 0.0 {
            return Err(MesherError::NonPositiveRadius(self.radius));
        }
        if self.rise < 0.0 {
            return Err(MesherError::NegativeRise(self.rise));
        }
        if self.min_edge_length <= 0.0 {
            return Err(MesherError::NonPositiveMinEdgeLength(self.min_edge_length));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MesherError {
    NonPositiveRadius(f64),
    NegativeRise(f64),
    NonPositiveMinEdgeLength(f64),
    NonFinite { field: &'static str },
}

impl std::fmt::Display for MesherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MesherError::NonPositiveRadius(r) => write!(f, "radius must be > 0, got {r}"),
            MesherError::NegativeRise(r) => write!(f, "rise must be >= 0, got {r}"),
            MesherError::NonPositiveMinEdgeLength(l) => {
                write!(f, "min_edge_length must be > 0, got {l}")
            }
            MesherError::NonFinite { field } => write!(f, "{field} must be finite"),
        }
    }
}

impl std::error::Error for MesherError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MeshStats {
    pub features: usize,
    /// Features whose geometry is neither `Polygon` nor `MultiPolygon`.
    pub skipped_features: usize,
    /// Outer rings that produced no triangles.
    pub degenerate_rings: usize,
    pub patches: usize,
    pub triangles: usize,
}

/// Stateless generator; a validated [`MesherConfig`] is all it holds.
#[derive(Debug, Clone)]
pub struct GeoSphereMesher {
    config: MesherConfig,
}

impl GeoSphereMesher {
    pub fn new(config: MesherConfig) -> Result<Self, MesherError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    pub fn generate_collection(&self, collection: &FeatureCollection) -> Vec<MeshPatch> {
        self.generate(&collection.features)
    }

    pub fn generate(&self, features: &[GeoFeature]) -> Vec<MeshPatch> {
        self.generate_with_stats(features).0
    }

    pub fn generate_with_stats(&self, features: &[GeoFeature]) -> (Vec<MeshPatch>, MeshStats) {
        let mut patches = Vec::new();
        let mut stats = MeshStats {
            features: features.len(),
            ..MeshStats::default()
        };

        for (index, feature) in features.iter().enumerate() {
            let kind = feature.geometry.kind();
            if kind == GeometryKind::Other {
                stats.skipped_features += 1;
                continue;
            }

            let tag = feature
                .tag()
                .unwrap_or_else(|| format!("feature-{index}"));

            for ring in feature.geometry.outer_rings() {
                let planar: Vec<Vec2> = ring.iter().map(|p| p.as_vec2()).collect();
                let tris = triangulate_ccw(&planar);
                if tris.is_empty() {
                    trace!(index, %tag, points = ring.len(), "ring produced no triangles");
                    stats.degenerate_rings += 1;
                    continue;
                }

                for [i0, i1, i2] in tris {
                    let root = [ring[i0], ring[i1], ring[i2]]
                        .map(|p| project_lon_lat(p.lon_deg, p.lat_deg, self.config.radius));
                    let patch = self.build_patch(&tag, root);
                    stats.triangles += patch.triangle_count();
                    patches.push(patch);
                }
            }
        }

        stats.patches = patches.len();
        debug!(
            features = stats.features,
            skipped = stats.skipped_features,
            degenerate_rings = stats.degenerate_rings,
            patches = stats.patches,
            triangles = stats.triangles,
            "generated sphere mesh"
        );
        (patches, stats)
    }

    fn build_patch(&self, tag: &str, root: Triangle) -> MeshPatch {
        let depth = self.config.max_subdivision_depth;
        let mut patch = MeshPatch::new(tag, self.config.color, depth);
        subdivide(
            root,
            depth,
            self.config.radius + self.config.rise,
            self.config.min_edge_length,
            |tri| patch.push_triangle(tri),
        );
        patch
    }
}

/// Adaptive quadrisection of a counter-clockwise sphere triangle.
///
/// A triangle is emitted as-is when `depth` reaches zero or its longest edge
/// is below `min_edge_length`. Otherwise edge midpoints are pushed onto the
/// sphere of `surface_radius` and the four children are processed with
/// `depth - 1`. Emission order matches a depth-first recursion: the three
/// corner children (at `a`, `b`, `c`), then the centre one.
pub fn subdivide(
    root: Triangle,
    depth: u32,
    surface_radius: f64,
    min_edge_length: f64,
    mut emit: impl FnMut(Triangle),
) {
    let mut stack: Vec<(Triangle, u32)> = vec![(root, depth)];

    while let Some((tri, depth)) = stack.pop() {
        let [a, b, c] = tri;
        let longest = a.distance(b).max(b.distance(c)).max(c.distance(a));
        if depth == 0 || longest < min_edge_length {
            emit(tri);
            continue;
        }

        let mids = (
            onto_sphere(a.midpoint(b), surface_radius),
            onto_sphere(b.midpoint(c), surface_radius),
            onto_sphere(c.midpoint(a), surface_radius),
        );
        // A midpoint at the centre has no direction (antipodal corners).
        let (Some(ab), Some(bc), Some(ca)) = mids else {
            emit(tri);
            continue;
        };

        let next = depth - 1;
        stack.push(([ca, ab, bc], next));
        stack.push(([bc, c, ca], next));
        stack.push(([ab, b, bc], next));
        stack.push(([a, ab, ca], next));
    }
}
