//! Mesh resource management.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use mv_core::{BoundingBox, MeshNode};

use crate::context::RenderContext;
use crate::vertex::MeshVertex;

/// Handle to a mesh owned by a render backend.
///
/// Handles are lightweight and can be copied freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(u64);

impl MeshHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Creates a handle from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// GPU mesh data.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer (optional, for indexed drawing).
    pub index_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    /// Number of indices (0 if not indexed).
    pub index_count: u32,
    pub bounds: BoundingBox,
}

impl GpuMesh {
    /// Returns true if this mesh uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some() && self.index_count > 0
    }

    /// Frees the GPU buffers now instead of waiting for the drop.
    fn destroy(&self) {
        self.vertex_buffer.destroy();
        if let Some(index_buffer) = &self.index_buffer {
            index_buffer.destroy();
        }
    }
}

/// CPU mesh data for uploading to GPU.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Option<Vec<u32>>,
    pub bounds: BoundingBox,
}

impl MeshData {
    /// Creates non-indexed mesh data.
    pub fn new(vertices: Vec<MeshVertex>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: None,
            bounds,
        }
    }

    /// Creates indexed mesh data.
    pub fn indexed(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: Some(indices),
            bounds,
        }
    }

    /// Interleaves a parsed mesh node into vertex data.
    ///
    /// Missing normals default to +Y.
    pub fn from_node(node: &MeshNode) -> Self {
        let vertices = node
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| MeshVertex::new(*p, node.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0])))
            .collect();

        if node.indices.is_empty() {
            Self::new(vertices)
        } else {
            Self::indexed(vertices, node.indices.clone())
        }
    }

    /// Returns true if there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.indices {
            Some(indices) => indices.is_empty(),
            None => self.vertices.is_empty(),
        }
    }

    /// Size of the vertex and index data in bytes.
    pub fn byte_size(&self) -> usize {
        self.vertices.len() * std::mem::size_of::<MeshVertex>()
            + self.indices.as_ref().map_or(0, |i| i.len() * 4)
    }

    fn compute_bounds(vertices: &[MeshVertex]) -> BoundingBox {
        BoundingBox::from_points(vertices.iter().map(|v| &v.position))
    }
}

/// Manager for GPU mesh resources.
pub struct MeshManager {
    meshes: HashMap<MeshHandle, GpuMesh>,
    next_handle: AtomicU64,
}

impl MeshManager {
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Uploads mesh data to the GPU and returns a handle.
    pub fn create(&mut self, ctx: &RenderContext, data: &MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let vertex_buffer = ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = data.indices.as_ref().filter(|i| !i.is_empty()).map(|indices| {
            ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let gpu_mesh = GpuMesh {
            vertex_buffer,
            index_buffer,
            vertex_count: data.vertices.len() as u32,
            index_count: data.indices.as_ref().map(|i| i.len() as u32).unwrap_or(0),
            bounds: data.bounds,
        };

        self.meshes.insert(handle, gpu_mesh);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }

    /// Destroys a mesh's buffers. Returns false if the handle is unknown.
    pub fn release(&mut self, handle: MeshHandle) -> bool {
        match self.meshes.remove(&handle) {
            Some(mesh) => {
                mesh.destroy();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Destroys every mesh.
    pub fn clear(&mut self) {
        for (_, mesh) in self.meshes.drain() {
            mesh.destroy();
        }
    }
}

impl Default for MeshManager {
    fn default() -> Self {
        Self::new()
    }
}
