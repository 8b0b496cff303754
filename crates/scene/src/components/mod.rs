pub mod material;
pub mod mesh_patch;

pub use material::*;
pub use mesh_patch::*;
