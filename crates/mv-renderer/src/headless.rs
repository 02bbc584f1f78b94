//! CPU-only render backend
//!
//! Keeps the same resource bookkeeping as the GPU renderer without touching
//! a device, which makes it suitable for tests and headless runs.

use std::collections::HashMap;

use mv_core::Color;

use crate::resources::{MaterialData, MaterialHandle, MeshData, MeshHandle};
use crate::traits::{FrameData, RenderBackend, RenderError};

/// Headless backend that records what it was asked to do.
#[derive(Debug)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    meshes: HashMap<MeshHandle, usize>,
    materials: HashMap<MaterialHandle, MaterialData>,
    next_handle: u64,
    frames: u64,
    clears: Vec<Color>,
    last_draw_count: usize,
    last_background: Option<Color>,
    meshes_uploaded: u64,
    meshes_released: u64,
    released: bool,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            meshes: HashMap::new(),
            materials: HashMap::new(),
            next_handle: 1,
            frames: 0,
            clears: Vec::new(),
            last_draw_count: 0,
            last_background: None,
            meshes_uploaded: 0,
            meshes_released: 0,
            released: false,
        }
    }

    fn next_raw(&mut self) -> u64 {
        let raw = self.next_handle;
        self.next_handle += 1;
        raw
    }

    /// Number of frames rendered (clears excluded).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Colors passed to [`RenderBackend::clear`], in order.
    pub fn clears(&self) -> &[Color] {
        &self.clears
    }

    pub fn last_draw_count(&self) -> usize {
        self.last_draw_count
    }

    /// Background of the last rendered frame.
    pub fn last_background(&self) -> Option<Color> {
        self.last_background
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    /// Bytes of mesh data currently held.
    pub fn live_bytes(&self) -> usize {
        self.meshes.values().sum()
    }

    pub fn meshes_uploaded(&self) -> u64 {
        self.meshes_uploaded
    }

    pub fn meshes_released(&self) -> u64 {
        self.meshes_released
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialData> {
        self.materials.get(&handle)
    }

    pub fn has_mesh(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl RenderBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn upload_mesh(&mut self, data: &MeshData) -> Result<MeshHandle, RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let handle = MeshHandle::from_raw(self.next_raw());
        self.meshes.insert(handle, data.byte_size());
        self.meshes_uploaded += 1;
        Ok(handle)
    }

    fn release_mesh(&mut self, handle: MeshHandle) -> bool {
        let removed = self.meshes.remove(&handle).is_some();
        if removed {
            self.meshes_released += 1;
        }
        removed
    }

    fn upload_material(&mut self, data: &MaterialData) -> Result<MaterialHandle, RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        let handle = MaterialHandle::from_raw(self.next_raw());
        self.materials.insert(handle, *data);
        Ok(handle)
    }

    fn release_material(&mut self, handle: MaterialHandle) -> bool {
        self.materials.remove(&handle).is_some()
    }

    fn clear(&mut self, color: Color) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        self.clears.push(color);
        Ok(())
    }

    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if let Some(missing) = frame
            .draws
            .iter()
            .find(|d| !self.meshes.contains_key(&d.mesh) || !self.materials.contains_key(&d.material))
        {
            return Err(RenderError::Surface(format!(
                "draw references released resources (mesh {}, material {})",
                missing.mesh.raw(),
                missing.material.raw()
            )));
        }
        self.frames += 1;
        self.last_draw_count = frame.draws.len();
        self.last_background = Some(frame.background);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.meshes_released += self.meshes.len() as u64;
        self.meshes.clear();
        self.materials.clear();
        self.released = true;
        tracing::debug!("Headless backend released");
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn live_resources(&self) -> usize {
        self.meshes.len() + self.materials.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;
    use crate::camera::CameraUniform;
    use crate::light::LightUniform;
    use crate::traits::DrawItem;
    use crate::vertex::MeshVertex;

    fn triangle() -> MeshData {
        MeshData::indexed(
            vec![
                MeshVertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
                MeshVertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
                MeshVertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut backend = HeadlessBackend::default();
        let mesh = backend.upload_mesh(&triangle()).unwrap();
        let material = backend
            .upload_material(&MaterialData::new(Mat4::IDENTITY, [1.0; 4]))
            .unwrap();
        assert_eq!(backend.live_resources(), 2);

        assert!(backend.release_mesh(mesh));
        assert!(!backend.release_mesh(mesh));
        assert!(backend.release_material(material));
        assert!(!backend.release_material(material));
        assert_eq!(backend.live_resources(), 0);
    }

    #[test]
    fn test_render_rejects_dangling_draws() {
        let mut backend = HeadlessBackend::default();
        let mesh = backend.upload_mesh(&triangle()).unwrap();
        let material = backend
            .upload_material(&MaterialData::new(Mat4::IDENTITY, [1.0; 4]))
            .unwrap();
        let draws = [DrawItem { mesh, material }];
        let frame = FrameData {
            camera: CameraUniform::default(),
            lights: LightUniform::default(),
            background: Color::WHITE,
            draws: &draws,
        };
        backend.render(&frame).unwrap();
        assert_eq!(backend.frames(), 1);

        backend.release_mesh(mesh);
        assert!(matches!(backend.render(&frame), Err(RenderError::Surface(_))));
        assert_eq!(backend.frames(), 1);
    }

    #[test]
    fn test_released_backend_refuses_work() {
        let mut backend = HeadlessBackend::new(0, 0);
        assert_eq!(backend.size(), (1, 1));
        backend.upload_mesh(&triangle()).unwrap();
        backend.release();
        backend.release();
        assert!(backend.is_released());
        assert_eq!(backend.live_resources(), 0);
        assert_eq!(backend.clear(Color::BLACK), Err(RenderError::Released));
        assert!(backend.upload_mesh(&triangle()).is_err());
    }
}
