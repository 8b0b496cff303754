use foundation::bounds::Aabb3;
use foundation::handles::Handle;

use crate::components::{MeshPatch, Rgb};
use crate::entity::ObjectId;

/// One renderable object owned by the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Identifying tag. Empty for helper geometry, which is never picked.
    pub tag: String,
    pub mesh: MeshPatch,
    /// Current material colour; starts as the patch colour.
    pub color: Rgb,
    pub visible: bool,
    pub bounds: Option<Aabb3>,
}

impl SceneObject {
    pub fn is_tagged(&self) -> bool {
        !self.tag.is_empty()
    }
}

/// Scene container: a generational arena of objects addressed by [`ObjectId`].
///
/// Patches are moved in on spawn and owned here until despawned; pickers only
/// hold ids. A despawned slot is reused with a bumped generation, so ids
/// issued before the despawn stop resolving.
#[derive(Debug, Default)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<SceneObject>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `patch`; the object is tagged with `patch.tag`.
    pub fn spawn(&mut self, patch: MeshPatch) -> ObjectId {
        let tag = patch.tag.clone();
        self.insert(tag, patch)
    }

    /// Spawn untagged helper geometry (debug markers and the like).
    pub fn spawn_helper(&mut self, patch: MeshPatch) -> ObjectId {
        self.insert(String::new(), patch)
    }

    pub fn spawn_all(&mut self, patches: impl IntoIterator<Item = MeshPatch>) -> Vec<ObjectId> {
        patches.into_iter().map(|p| self.spawn(p)).collect()
    }

    /// Remove the object and hand it back. Stale ids return `None`.
    pub fn despawn(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = id.index();
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        Some(object)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.object.as_ref())
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.object.as_mut())
    }

    pub fn color(&self, id: ObjectId) -> Option<Rgb> {
        self.object(id).map(|o| o.color)
    }

    /// Returns `false` if `id` is unknown or stale.
    pub fn set_color(&mut self, id: ObjectId, color: Rgb) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.color = color;
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        match self.object_mut(id) {
            Some(obj) => {
                obj.visible = visible;
                true
            }
            None => false,
        }
    }

    /// All live objects in ascending slot order, hidden ones included.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let obj = slot.object.as_ref()?;
            Some((ObjectId(Handle::new(idx as u32, slot.generation)), obj))
        })
    }

    /// Visible objects in ascending slot order.
    pub fn visible(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        self.iter().filter(|(_, obj)| obj.visible)
    }

    fn insert(&mut self, tag: String, mesh: MeshPatch) -> ObjectId {
        let bounds = mesh.bounds();
        let object = SceneObject {
            tag,
            color: mesh.color,
            mesh,
            visible: true,
            bounds,
        };

        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            return ObjectId(Handle::new(index, slot.generation));
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        ObjectId(Handle::new(index, 0))
    }
}
