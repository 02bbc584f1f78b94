//! Model Viewer Renderer
//!
//! Scene ownership, render scheduling and viewport lifecycle on top of wgpu.
//!
//! # Architecture
//!
//! - [`traits::RenderBackend`] - Output surface abstraction (GPU or headless)
//! - [`scene::SceneState`] - Camera, controls, lights and the loaded model
//! - [`render_loop::RenderLoop`] - Cancellable per-frame scheduler
//! - [`viewport::ViewportController`] - Mount, config change and unmount
//! - [`resources::MeshManager`] - GPU mesh resource management
//!
//! # Example
//!
//! ```ignore
//! use mv_renderer::{HeadlessBackend, RendererConfig, ThreadedLoader, ViewportController};
//!
//! let mut viewport = ViewportController::new(ThreadedLoader::new(), RendererConfig::default());
//! viewport.on_mount(HeadlessBackend::default(), config);
//!
//! // Once per display refresh
//! viewport.poll();
//! viewport.frame();
//! ```

// Core abstractions
pub mod context;
pub mod resources;
pub mod scene;
pub mod traits;

pub mod camera;
pub mod config;
pub mod constants;
pub mod headless;
pub mod light;
pub mod orbit;
pub mod render_loop;
pub mod renderer;
pub mod vertex;
pub mod viewport;

// Re-exports for convenience
pub use camera::*;
pub use config::RendererConfig;
pub use context::RenderContext;
pub use headless::HeadlessBackend;
pub use light::*;
pub use orbit::{OrbitConstraints, OrbitControls, Spherical};
pub use render_loop::{LoopError, LoopState, RenderLoop, RenderLoopHandle};
pub use renderer::*;
pub use resources::{GpuMesh, MaterialData, MaterialHandle, MeshData, MeshHandle, MeshManager};
pub use scene::{ModelGroup, ModelPart, SceneState};
pub use traits::{DrawItem, FrameData, RenderBackend, RenderError};
pub use vertex::MeshVertex;
pub use viewport::{
    LoadCompletion, LoadRequest, ModelLoader, ThreadedLoader, ViewportController, ViewportEvent,
    ViewportStatus,
};

#[cfg(test)]
mod tests {
    #[test]
    fn test_mesh_shader_parses() {
        let module = naga::front::wgsl::parse_str(include_str!("shaders/mesh.wgsl"))
            .expect("mesh.wgsl should parse");
        let entry_points: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }
}
