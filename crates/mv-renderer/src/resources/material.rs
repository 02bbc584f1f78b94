//! Material resource management.
//!
//! A material here is the per-draw uniform block: the node's world matrix,
//! its normal matrix and the diffuse color.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::context::RenderContext;

/// Handle to a material owned by a render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialHandle(u64);

impl MaterialHandle {
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// Material uniform buffer data sent to GPU (144 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Linear RGBA
    pub color: [f32; 4],
}

/// CPU description of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialData {
    /// World transform of the mesh drawn with this material
    pub model: Mat4,
    /// Diffuse color (linear RGBA)
    pub color: [f32; 4],
}

impl MaterialData {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self { model, color }
    }

    pub fn uniform(&self) -> MaterialUniform {
        let normal = if self.model.determinant().abs() > f32::EPSILON {
            self.model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        MaterialUniform {
            model: self.model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            color: self.color,
        }
    }
}

/// GPU material data.
pub struct GpuMaterial {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// Manager for GPU material resources.
pub struct MaterialManager {
    materials: HashMap<MaterialHandle, GpuMaterial>,
    next_handle: AtomicU64,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Uploads a material uniform and creates its bind group.
    pub fn create(&mut self, ctx: &RenderContext, data: &MaterialData) -> MaterialHandle {
        let handle = MaterialHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let buffer = ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: bytemuck::cast_slice(&[data.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = ctx.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: ctx.material_bind_group_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        self.materials.insert(handle, GpuMaterial { buffer, bind_group });
        handle
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&GpuMaterial> {
        self.materials.get(&handle)
    }

    /// Destroys a material's buffer. Returns false if the handle is unknown.
    pub fn release(&mut self, handle: MaterialHandle) -> bool {
        match self.materials.remove(&handle) {
            Some(material) => {
                material.buffer.destroy();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn clear(&mut self) {
        for (_, material) in self.materials.drain() {
            material.buffer.destroy();
        }
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn test_normal_matrix_ignores_translation() {
        let data = MaterialData::new(Mat4::from_translation(Vec3::new(-5.0, -5.0, -5.0)), [1.0; 4]);
        let u = data.uniform();
        let normal = Mat4::from_cols_array_2d(&u.normal);
        let n = normal.transform_vector3(Vec3::Y);
        assert!((n - Vec3::Y).length() < 1e-6);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 144);
    }

    #[test]
    fn test_singular_model_uses_identity_normal() {
        let data = MaterialData::new(Mat4::ZERO, [1.0; 4]);
        assert_eq!(data.uniform().normal, Mat4::IDENTITY.to_cols_array_2d());
    }
}
