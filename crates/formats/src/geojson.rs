use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::Vec2;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Planar `(lon, lat)` view used for 2D triangulation and winding tests.
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.lon_deg, self.lat_deg)
    }
}

/// Ordered polygon boundary; first and last point are implicitly connected.
pub type Ring = Vec<GeoPoint>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Polygon,
    MultiPolygon,
    Other,
}

/// Feature geometry, resolved once at load time.
///
/// Only areal geometry keeps its coordinates; every other GeoJSON type is
/// carried as `Other` so callers can filter it without re-reading the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    Other { type_name: String },
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::Other { .. } => GeometryKind::Other,
        }
    }

    /// Outer boundary ring of every polygon, in source order.
    ///
    /// Hole rings are not returned.
    pub fn outer_rings(&self) -> Vec<&Ring> {
        match self {
            Geometry::Polygon(rings) => rings.first().into_iter().collect(),
            Geometry::MultiPolygon(polys) => polys.iter().filter_map(|p| p.first()).collect(),
            Geometry::Other { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

/// Property keys tried, in order, for a feature's display tag.
const TAG_PROPERTY_KEYS: [&str; 3] = ["name", "NAME", "ADMIN"];

impl GeoFeature {
    /// Identifying tag: first non-empty name property, else the feature id.
    pub fn tag(&self) -> Option<String> {
        TAG_PROPERTY_KEYS
            .iter()
            .filter_map(|key| self.properties.get(*key).and_then(|v| v.as_str()))
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.id.clone().filter(|id| !id.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<GeoFeature>,
    /// Features dropped because their geometry could not be parsed.
    pub skipped: usize,
    /// blake3 hex digest of the source payload.
    pub content_hash: String,
}

#[derive(Debug)]
pub enum GeoJsonError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    NotAFeatureCollection,
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            GeoJsonError::Json(e) => write!(f, "JSON parse error: {e}"),
            GeoJsonError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
        }
    }
}

impl std::error::Error for GeoJsonError {}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            features: Vec::new(),
            skipped: 0,
            content_hash: blake3::hash(b"").to_hex().to_string(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GeoJsonError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|e| GeoJsonError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_geojson_str(&payload)
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoJsonError> {
        let value: Value = serde_json::from_str(payload).map_err(GeoJsonError::Json)?;
        let hash = blake3::hash(payload.as_bytes()).to_hex().to_string();
        Self::from_value_with_hash(&value, hash)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, GeoJsonError> {
        let bytes = serde_json::to_vec(value).map_err(GeoJsonError::Json)?;
        let hash = blake3::hash(&bytes).to_hex().to_string();
        Self::from_value_with_hash(value, hash)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn from_value_with_hash(value: &Value, content_hash: String) -> Result<Self, GeoJsonError> {
        let obj = value
            .as_object()
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(GeoJsonError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(GeoJsonError::NotAFeatureCollection)?;

        let mut features = Vec::with_capacity(features_val.len());
        let mut skipped = 0;
        for (index, feat_val) in features_val.iter().enumerate() {
            match parse_feature(feat_val) {
                Ok(feature) => features.push(feature),
                Err(reason) => {
                    warn!(index, %reason, "skipping malformed feature");
                    skipped += 1;
                }
            }
        }

        debug!(
            features = features.len(),
            skipped,
            hash = %content_hash,
            "parsed feature collection"
        );

        Ok(Self {
            features,
            skipped,
            content_hash,
        })
    }
}

fn parse_feature(value: &Value) -> Result<GeoFeature, String> {
    let feat_obj = value
        .as_object()
        .ok_or("feature must be an object".to_string())?;

    let feat_type = feat_obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("feature missing type".to_string())?;
    if feat_type != "Feature" {
        return Err(format!("unexpected feature type: {feat_type}"));
    }

    let id = match feat_obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = feat_obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry_val = feat_obj
        .get("geometry")
        .ok_or("feature missing geometry".to_string())?;
    let geometry = parse_geometry(geometry_val)?;

    Ok(GeoFeature {
        id,
        properties,
        geometry,
    })
}

fn parse_geometry(value: &Value) -> Result<Geometry, String> {
    // GeoJSON allows an unlocated feature with a null geometry.
    if value.is_null() {
        return Ok(Geometry::Other {
            type_name: "null".to_string(),
        });
    }

    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "Polygon" | "MultiPolygon" => {
            let coords = obj
                .get("coordinates")
                .ok_or("geometry missing coordinates".to_string())?;
            if ty == "Polygon" {
                Ok(Geometry::Polygon(parse_polygon(coords)?))
            } else {
                Ok(Geometry::MultiPolygon(parse_multi_polygon(coords)?))
            }
        }
        other => Ok(Geometry::Other {
            type_name: other.to_string(),
        }),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    arr.iter().map(parse_point).collect()
}

/// Outer ring is parsed strictly; a malformed hole ring is dropped.
fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let Some((outer, holes)) = rings.split_first() else {
        return Ok(Vec::new());
    };

    let mut parsed = vec![parse_ring(outer).map_err(|e| format!("outer ring: {e}"))?];
    for (index, hole) in holes.iter().enumerate() {
        match parse_ring(hole) {
            Ok(ring) => parsed.push(ring),
            Err(reason) => trace!(hole = index, %reason, "dropping malformed hole ring"),
        }
    }
    Ok(parsed)
}

/// Malformed member polygons are dropped; the feature fails only when every
/// member does.
fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Ring>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;

    let mut parsed = Vec::with_capacity(polys.len());
    let mut last_error = None;
    for (index, poly) in polys.iter().enumerate() {
        match parse_polygon(poly) {
            Ok(rings) => parsed.push(rings),
            Err(reason) => {
                warn!(polygon = index, %reason, "dropping malformed member polygon");
                last_error = Some(reason);
            }
        }
    }

    match last_error {
        Some(reason) if parsed.is_empty() => Err(reason),
        _ => Ok(parsed),
    }
}
