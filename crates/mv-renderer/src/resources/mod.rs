//! GPU resource management.
//!
//! Handle-based managers for the buffers a model group owns. The handles are
//! backend-neutral; only the managers touch wgpu.

mod material;
mod mesh;

pub use material::*;
pub use mesh::*;
