//! The loaded model as a set of backend resources.

use mv_core::{BoundingBox, Color, GeometryTree};
use uuid::Uuid;

use crate::resources::{MaterialData, MaterialHandle, MeshData, MeshHandle};
use crate::traits::{DrawItem, RenderBackend, RenderError};

/// One uploaded mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPart {
    pub name: String,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

/// Backend resources of one loaded model.
///
/// A group is never cloned. It must be released with
/// [`ModelGroup::dispose`] before it is dropped; dropping a live group only
/// logs a warning because the backend is not reachable from `Drop`.
#[derive(Debug)]
pub struct ModelGroup {
    id: Uuid,
    generation: u64,
    name: String,
    parts: Vec<ModelPart>,
    bounds: BoundingBox,
    triangle_count: usize,
    disposed: bool,
}

impl ModelGroup {
    /// Uploads every non-empty node of `tree`.
    ///
    /// If an upload fails, everything uploaded so far is released again
    /// before the error is returned.
    pub fn upload(
        backend: &mut dyn RenderBackend,
        tree: &GeometryTree,
        generation: u64,
    ) -> Result<Self, RenderError> {
        let mut group = Self {
            id: Uuid::new_v4(),
            generation,
            name: tree.name.clone(),
            parts: Vec::with_capacity(tree.nodes.len()),
            bounds: tree.bounds(),
            triangle_count: tree.triangle_count(),
            disposed: false,
        };

        for node in &tree.nodes {
            let data = MeshData::from_node(node);
            if data.is_empty() {
                continue;
            }

            let [r, g, b, a] = tree.node_color(node);
            let color = Color::new(r, g, b, a).to_linear().to_array();
            let material_data = MaterialData::new(tree.node_world_transform(node), color);

            let uploaded = backend.upload_mesh(&data).and_then(|mesh| {
                match backend.upload_material(&material_data) {
                    Ok(material) => Ok((mesh, material)),
                    Err(e) => {
                        backend.release_mesh(mesh);
                        Err(e)
                    }
                }
            });

            match uploaded {
                Ok((mesh, material)) => group.parts.push(ModelPart {
                    name: node.name.clone(),
                    mesh,
                    material,
                }),
                Err(e) => {
                    group.dispose(backend);
                    return Err(e);
                }
            }
        }

        Ok(group)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Viewport generation that created this group.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &[ModelPart] {
        &self.parts
    }

    /// Bounds in scene space.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn draw_items(&self) -> impl Iterator<Item = DrawItem> + '_ {
        self.parts.iter().map(|p| DrawItem {
            mesh: p.mesh,
            material: p.material,
        })
    }

    /// Releases every mesh and material. Returns how many were released.
    ///
    /// Calling it again does nothing.
    pub fn dispose(&mut self, backend: &mut dyn RenderBackend) -> usize {
        if self.disposed {
            return 0;
        }
        let mut released = 0;
        for part in self.parts.drain(..) {
            released += backend.release_mesh(part.mesh) as usize;
            released += backend.release_material(part.material) as usize;
        }
        self.disposed = true;
        tracing::debug!(
            "Disposed model group '{}' (generation {}, {} resources)",
            self.name,
            self.generation,
            released
        );
        released
    }
}

impl Drop for ModelGroup {
    fn drop(&mut self) {
        if !self.disposed && !self.parts.is_empty() {
            tracing::warn!(
                "Model group '{}' dropped with {} live parts",
                self.name,
                self.parts.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use mv_core::MeshNode;

    use super::*;
    use crate::headless::HeadlessBackend;

    fn tree_with_nodes(count: usize) -> GeometryTree {
        let mut tree = GeometryTree::new("parts");
        for i in 0..count {
            let mut node = MeshNode::new(format!("n{i}"));
            let x = i as f32;
            node.positions = vec![[x, 0.0, 0.0], [x + 1.0, 0.0, 0.0], [x, 1.0, 0.0]];
            node.normals = vec![[0.0, 0.0, 1.0]; 3];
            node.indices = vec![0, 1, 2];
            tree.nodes.push(node);
        }
        // Empty node is skipped
        tree.nodes.push(MeshNode::new("empty"));
        tree
    }

    #[test]
    fn test_upload_and_dispose() {
        let mut backend = HeadlessBackend::default();
        let mut group = ModelGroup::upload(&mut backend, &tree_with_nodes(3), 7).unwrap();
        assert_eq!(group.parts().len(), 3);
        assert_eq!(group.generation(), 7);
        assert_eq!(backend.live_resources(), 6);
        assert_eq!(group.bounds().max, Vec3::new(3.0, 1.0, 0.0));

        assert_eq!(group.dispose(&mut backend), 6);
        assert_eq!(group.dispose(&mut backend), 0);
        assert!(group.is_disposed());
        assert_eq!(backend.live_resources(), 0);
    }

    #[test]
    fn test_failed_upload_leaves_nothing_behind() {
        let mut backend = HeadlessBackend::default();
        backend.release();
        let err = ModelGroup::upload(&mut backend, &tree_with_nodes(2), 1).unwrap_err();
        assert_eq!(err, RenderError::Released);
        assert_eq!(backend.live_resources(), 0);
    }

    #[test]
    fn test_material_color_is_linear() {
        let mut backend = HeadlessBackend::default();
        let mut group = ModelGroup::upload(&mut backend, &tree_with_nodes(1), 1).unwrap();
        let material = backend.material(group.parts()[0].material).unwrap();
        // Default gray 0.8 in linear light
        assert!(material.color[0] > 0.6 && material.color[0] < 0.61);
        group.dispose(&mut backend);
    }
}
