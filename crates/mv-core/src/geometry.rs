//! Parsed model geometry and bounding boxes

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from its corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty bounding box that absorbs the first point added to it.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Creates a box centered at `center` with the given size.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    /// Computes the bounds of a set of points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand(Vec3::from(*p));
        }
        bounds
    }

    /// Returns true if no point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grows the box to contain `point`.
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns the smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        BoundingBox::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Center of the box (origin for an empty box).
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Size along each axis (zero for an empty box).
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    /// Largest of the three axis sizes.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Radius of the sphere enclosing the box.
    pub fn radius(&self) -> f32 {
        self.size().length() * 0.5
    }

    /// Transforms all eight corners and returns their bounds.
    pub fn transform(&self, matrix: &Mat4) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        let mut result = BoundingBox::empty();
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            result.expand(matrix.transform_point3(corner));
        }
        result
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Material description read from the asset.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    /// Diffuse color (RGBA)
    pub diffuse: [f32; 4],
}

impl MaterialDesc {
    /// Gray used for meshes without a resolved material.
    pub const DEFAULT_DIFFUSE: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

    pub fn new(name: impl Into<String>, diffuse: [f32; 4]) -> Self {
        Self {
            name: name.into(),
            diffuse,
        }
    }
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self::new("default", Self::DEFAULT_DIFFUSE)
    }
}

/// A single mesh loaded from the asset.
#[derive(Debug, Clone, Default)]
pub struct MeshNode {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals, same length as `positions`
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices
    pub indices: Vec<u32>,
    /// Index into [`GeometryTree::materials`]
    pub material: Option<usize>,
    /// Transform relative to the tree root
    pub transform: Mat4,
}

impl MeshNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            ..Default::default()
        }
    }

    /// Bounds of the vertices in node space.
    pub fn local_bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.positions)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Parsed model: a root transform and the meshes beneath it.
#[derive(Debug, Clone)]
pub struct GeometryTree {
    pub name: String,
    /// Root transform (the group transform)
    pub transform: Mat4,
    pub nodes: Vec<MeshNode>,
    pub materials: Vec<MaterialDesc>,
}

impl GeometryTree {
    /// Creates an empty tree.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            nodes: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// World-space bounds of every node under the root transform.
    pub fn bounds(&self) -> BoundingBox {
        self.nodes
            .iter()
            .map(|node| {
                node.local_bounds()
                    .transform(&(self.transform * node.transform))
            })
            .fold(BoundingBox::empty(), |acc, b| acc.union(&b))
    }

    /// Moves the whole tree so that `centroid` ends up at the origin.
    pub fn recenter(&mut self, centroid: Vec3) {
        self.transform = Mat4::from_translation(-centroid) * self.transform;
    }

    /// World transform of a node.
    pub fn node_world_transform(&self, node: &MeshNode) -> Mat4 {
        self.transform * node.transform
    }

    /// Diffuse color for a node, falling back to the default material.
    pub fn node_color(&self, node: &MeshNode) -> [f32; 4] {
        node.material
            .and_then(|i| self.materials.get(i))
            .map(|m| m.diffuse)
            .unwrap_or(MaterialDesc::DEFAULT_DIFFUSE)
    }

    pub fn vertex_count(&self) -> usize {
        self.nodes.iter().map(|n| n.positions.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(|n| n.triangle_count()).sum()
    }

    /// Returns true if no node has any vertex.
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Releases the CPU buffers held by this tree.
    ///
    /// Used when a finished load is no longer wanted.
    pub fn dispose(self) -> usize {
        let released = self.vertex_count();
        tracing::debug!(
            "Disposed geometry '{}' ({} vertices, {} nodes)",
            self.name,
            released,
            self.nodes.len()
        );
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_node(center: Vec3, size: f32) -> MeshNode {
        let h = size * 0.5;
        let mut node = MeshNode::new("cube");
        for i in 0..8 {
            let offset = Vec3::new(
                if i & 1 == 0 { -h } else { h },
                if i & 2 == 0 { -h } else { h },
                if i & 4 == 0 { -h } else { h },
            );
            node.positions.push((center + offset).to_array());
            node.normals.push([0.0, 1.0, 0.0]);
        }
        node.indices = vec![0, 1, 2, 1, 3, 2];
        node
    }

    #[test]
    fn test_empty_bounds() {
        let bounds = BoundingBox::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.center(), Vec3::ZERO);
        assert_eq!(bounds.max_extent(), 0.0);
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(a.union(&BoundingBox::empty()), a);
        assert_eq!(BoundingBox::empty().union(&a), a);
    }

    #[test]
    fn test_transform_translates_bounds() {
        let a = BoundingBox::new(Vec3::ZERO, Vec3::ONE);
        let moved = a.transform(&Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(moved.max, Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_tree_bounds_and_recenter() {
        let mut tree = GeometryTree::new("model");
        tree.nodes.push(cube_node(Vec3::splat(5.0), 2.0));

        let bounds = tree.bounds();
        assert_eq!(bounds.center(), Vec3::splat(5.0));
        assert_eq!(bounds.size(), Vec3::splat(2.0));

        tree.recenter(bounds.center());
        let recentered = tree.bounds();
        assert!(recentered.center().length() < 1e-5);
        assert_eq!(recentered.size(), Vec3::splat(2.0));
    }

    #[test]
    fn test_node_color_fallback() {
        let mut tree = GeometryTree::new("model");
        let mut node = cube_node(Vec3::ZERO, 1.0);
        node.material = Some(3);
        tree.nodes.push(node);
        assert_eq!(
            tree.node_color(&tree.nodes[0]),
            MaterialDesc::DEFAULT_DIFFUSE
        );
    }
}
