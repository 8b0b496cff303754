pub mod config;
pub mod globe;
pub mod mesher;
pub mod triangulate;

pub use config::*;
pub use globe::*;
pub use mesher::*;
