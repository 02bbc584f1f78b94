//! Normal generation for meshes that ship without normals

use glam::Vec3;

/// Calculate the unit normal of a triangle (counter-clockwise winding).
pub fn calculate_triangle_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let e1 = Vec3::from(v1) - Vec3::from(v0);
    let e2 = Vec3::from(v2) - Vec3::from(v0);
    e1.cross(e2).normalize_or(Vec3::Z).to_array()
}

/// Calculate smooth per-vertex normals.
///
/// Face normals are accumulated unnormalized, so larger triangles weigh more.
/// Vertices that belong to no triangle get +Y.
pub fn calculate_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let p0 = Vec3::from(positions[a]);
        let face = (Vec3::from(positions[b]) - p0).cross(Vec3::from(positions[c]) - p0);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }

    accum
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}
