use formats::FeatureCollection;
use scene::World;
use scene::components::MeshPatch;
use scene::entity::ObjectId;
use tracing::{debug, info};

use crate::mesher::GeoSphereMesher;

/// Region overlay on the globe.
///
/// Remembers the content hash of the last collection it meshed so an
/// unchanged source is not meshed twice.
#[derive(Debug, Clone)]
pub struct GlobeLayer {
    mesher: GeoSphereMesher,
    source_hash: Option<String>,
    spawned: Vec<ObjectId>,
}

impl GlobeLayer {
    pub fn new(mesher: GeoSphereMesher) -> Self {
        Self {
            mesher,
            source_hash: None,
            spawned: Vec::new(),
        }
    }

    pub fn mesher(&self) -> &GeoSphereMesher {
        &self.mesher
    }

    pub fn source_hash(&self) -> Option<&str> {
        self.source_hash.as_deref()
    }

    /// Mesh `collection` unless it matches the last one meshed.
    pub fn reload(&mut self, collection: &FeatureCollection) -> Option<Vec<MeshPatch>> {
        if self.source_hash.as_deref() == Some(collection.content_hash.as_str()) {
            debug!(hash = %collection.content_hash, "globe source unchanged");
            return None;
        }

        let patches = self.mesher.generate_collection(collection);
        info!(
            hash = %collection.content_hash,
            features = collection.len(),
            skipped = collection.skipped,
            patches = patches.len(),
            "globe layer reloaded"
        );
        self.source_hash = Some(collection.content_hash.clone());
        Some(patches)
    }

    /// Objects spawned by the last [`GlobeLayer::load_into`].
    pub fn objects(&self) -> &[ObjectId] {
        &self.spawned
    }

    /// Mesh `collection` and spawn every patch into `world`, despawning the
    /// patches of the previous source first.
    ///
    /// Returns the new object ids, or an empty list when the source is
    /// unchanged.
    pub fn load_into(&mut self, collection: &FeatureCollection, world: &mut World) -> Vec<ObjectId> {
        let Some(patches) = self.reload(collection) else {
            return Vec::new();
        };
        let removed = self
            .spawned
            .drain(..)
            .filter(|id| world.despawn(*id).is_some())
            .count();
        if removed > 0 {
            debug!(removed, "despawned previous globe patches");
        }
        self.spawned = world.spawn_all(patches);
        self.spawned.clone()
    }

    /// Forget the cached hash so the next reload always meshes.
    pub fn invalidate(&mut self) {
        self.source_hash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::GlobeLayer;
    use crate::mesher::{GeoSphereMesher, MesherConfig};
    use formats::FeatureCollection;
    use scene::World;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "name": "Square" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [30, 0], [30, 30], [0, 30], [0, 0]]]
            }
        }]
    }"#;

    fn layer() -> GlobeLayer {
        let config = MesherConfig {
            max_subdivision_depth: 1,
            ..MesherConfig::default()
        };
        GlobeLayer::new(GeoSphereMesher::new(config).expect("valid config"))
    }

    #[test]
    fn unchanged_source_is_not_remeshed() {
        let fc = FeatureCollection::from_geojson_str(SQUARE).expect("parse");
        let mut layer = layer();

        let first = layer.reload(&fc).expect("first load meshes");
        assert_eq!(first.len(), 2);
        assert_eq!(layer.source_hash(), Some(fc.content_hash.as_str()));
        assert!(layer.reload(&fc).is_none());

        layer.invalidate();
        assert!(layer.reload(&fc).is_some());
    }

    #[test]
    fn changed_source_is_remeshed() {
        let fc = FeatureCollection::from_geojson_str(SQUARE).expect("parse");
        let other = FeatureCollection::from_geojson_str(&SQUARE.replace("30, 30", "25, 30"))
            .expect("parse");
        assert_ne!(fc.content_hash, other.content_hash);

        let mut layer = layer();
        assert!(layer.reload(&fc).is_some());
        assert!(layer.reload(&other).is_some());
    }

    #[test]
    fn load_into_spawns_tagged_objects() {
        let fc = FeatureCollection::from_geojson_str(SQUARE).expect("parse");
        let mut world = World::new();
        let mut layer = layer();

        let ids = layer.load_into(&fc, &mut world);
        assert_eq!(ids.len(), 2);
        assert_eq!(world.len(), 2);
        for id in ids {
            let obj = world.object(id).expect("spawned");
            assert_eq!(obj.tag, "Square");
            assert_eq!(obj.mesh.triangle_count(), 4);
            assert!(obj.bounds.is_some());
        }

        assert!(layer.load_into(&fc, &mut world).is_empty());
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn changed_source_replaces_previous_objects() {
        let fc = FeatureCollection::from_geojson_str(SQUARE).expect("parse");
        let renamed = FeatureCollection::from_geojson_str(&SQUARE.replace("\"Square\"", "\"Plaza\""))
            .expect("parse");
        let mut world = World::new();
        let mut layer = layer();

        let old = layer.load_into(&fc, &mut world);
        let new = layer.load_into(&renamed, &mut world);

        assert_eq!(new.len(), 2);
        assert_eq!(world.len(), 2);
        assert_eq!(layer.objects(), new.as_slice());
        assert!(old.iter().all(|id| world.object(*id).is_none()));
        assert!(world.iter().all(|(_, o)| o.tag == "Plaza"));
    }
}
