use foundation::bounds::Aabb3;
use foundation::math::Vec3;

use super::Rgb;

/// Three sphere points, counter-clockwise relative to their 2D source polygon.
pub type Triangle = [Vec3; 3];

/// Renderable unit handed from the mesher to the scene.
///
/// Positions are unindexed triangle corners (three per triangle); `indices`
/// is the matching `0..n` index list expected by indexed draw calls.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPatch {
    pub tag: String,
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub color: Rgb,
    /// Subdivision depth the patch was generated with.
    pub depth: u32,
}

impl MeshPatch {
    pub fn new(tag: impl Into<String>, color: Rgb, depth: u32) -> Self {
        Self {
            tag: tag.into(),
            positions: Vec::new(),
            indices: Vec::new(),
            color,
            depth,
        }
    }

    pub fn from_triangles(
        tag: impl Into<String>,
        color: Rgb,
        depth: u32,
        triangles: impl IntoIterator<Item = Triangle>,
    ) -> Self {
        let mut patch = Self::new(tag, color, depth);
        for tri in triangles {
            patch.push_triangle(tri);
        }
        patch
    }

    pub fn push_triangle(&mut self, tri: Triangle) {
        for v in tri {
            self.indices.push(self.positions.len() as u32);
            self.positions.push(v);
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(|ix| {
            [
                self.positions[ix[0] as usize],
                self.positions[ix[1] as usize],
                self.positions[ix[2] as usize],
            ]
        })
    }

    pub fn bounds(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.positions)
    }

    /// Positions narrowed to `f32` for vertex buffers.
    pub fn positions_f32(&self) -> Vec<[f32; 3]> {
        self.positions
            .iter()
            .map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }
}
