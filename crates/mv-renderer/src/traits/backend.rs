//! RenderBackend trait definition.

use mv_core::Color;

use crate::camera::CameraUniform;
use crate::light::LightUniform;
use crate::resources::{MaterialData, MaterialHandle, MeshData, MeshHandle};

/// One draw call: a mesh drawn with a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameData<'a> {
    pub camera: CameraUniform,
    pub lights: LightUniform,
    pub background: Color,
    pub draws: &'a [DrawItem],
}

/// Output surface errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(String),
    #[error("surface already released")]
    Released,
}

/// An output surface that owns GPU (or simulated) resources.
///
/// Releasing a handle twice is a no-op that returns `false`. After
/// [`RenderBackend::release`] every drawing call fails with
/// [`RenderError::Released`] and all resources are gone.
pub trait RenderBackend {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Uploads vertex/index data.
    fn upload_mesh(&mut self, data: &MeshData) -> Result<MeshHandle, RenderError>;

    /// Frees a mesh. Returns false if the handle was not live.
    fn release_mesh(&mut self, handle: MeshHandle) -> bool;

    /// Uploads a material.
    fn upload_material(&mut self, data: &MaterialData) -> Result<MaterialHandle, RenderError>;

    /// Frees a material. Returns false if the handle was not live.
    fn release_material(&mut self, handle: MaterialHandle) -> bool;

    /// Fills the whole surface with `color`.
    fn clear(&mut self, color: Color) -> Result<(), RenderError>;

    /// Draws one frame.
    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError>;

    /// Resizes the surface (zero sizes are clamped to 1).
    fn resize(&mut self, width: u32, height: u32);

    /// Current surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Frees everything, including the surface itself. Idempotent.
    fn release(&mut self);

    fn is_released(&self) -> bool;

    /// Number of live meshes plus materials.
    fn live_resources(&self) -> usize;

    /// Width over height.
    fn aspect(&self) -> f32 {
        let (width, height) = self.size();
        width.max(1) as f32 / height.max(1) as f32
    }
}
