pub mod camera;
pub mod components;
pub mod entity;
pub mod highlight;
pub mod picking;
pub mod world;

pub use world::*;
