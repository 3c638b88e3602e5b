//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into one alpha-blended triangle list.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::{MeshSet, build_scene};
pub use vertex::Vertex;
