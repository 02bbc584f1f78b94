//! Wavefront OBJ loading via tobj

use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use glam::Mat4;

use super::LoadError;
use super::normals::calculate_vertex_normals;
use crate::geometry::{GeometryTree, MaterialDesc, MeshNode};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load an OBJ file from disk.
///
/// Material libraries referenced by the file are resolved next to it.
pub fn load_obj(path: impl AsRef<Path>) -> Result<GeometryTree, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io(e.to_string()))?;
    let mut reader = BufReader::new(file);
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string();

    parse_obj(&name, &mut reader, |mtl_path| {
        tobj::load_mtl(base_dir.join(mtl_path))
    })
}

/// Load an OBJ model from an in-memory byte stream.
///
/// Material libraries cannot be resolved for a bare stream and are ignored.
pub fn load_obj_from_bytes(name: &str, data: &[u8]) -> Result<GeometryTree, LoadError> {
    let mut reader = BufReader::new(Cursor::new(data));
    parse_obj(name, &mut reader, |_| Err(tobj::LoadError::OpenFileFailed))
}

fn parse_obj<B, ML>(name: &str, reader: &mut B, material_loader: ML) -> Result<GeometryTree, LoadError>
where
    B: BufRead,
    ML: Fn(&Path) -> tobj::MTLLoadResult,
{
    let (models, materials) = tobj::load_obj_buf(reader, &load_options(), material_loader)
        .map_err(|e| LoadError::Parse(e.to_string()))?;

    let materials = match materials {
        Ok(materials) => materials
            .into_iter()
            .map(|m| {
                let [r, g, b] = m.diffuse.unwrap_or([0.8, 0.8, 0.8]);
                MaterialDesc::new(m.name, [r, g, b, m.dissolve.unwrap_or(1.0)])
            })
            .collect(),
        Err(e) => {
            tracing::debug!("Material library for '{}' not loaded: {}", name, e);
            Vec::new()
        }
    };

    let mut tree = GeometryTree::new(name);
    tree.materials = materials;

    for (i, model) in models.into_iter().enumerate() {
        let mesh = model.mesh;

        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();

        if let Some(&bad) = mesh.indices.iter().find(|&&idx| idx as usize >= positions.len()) {
            return Err(LoadError::Parse(format!(
                "mesh '{}' references vertex {} but only has {}",
                model.name,
                bad,
                positions.len()
            )));
        }

        let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals
                .chunks_exact(3)
                .map(|n| [n[0], n[1], n[2]])
                .collect()
        } else {
            calculate_vertex_normals(&positions, &mesh.indices)
        };

        let node_name = if model.name.is_empty() {
            format!("mesh_{}", i)
        } else {
            model.name
        };

        tree.nodes.push(MeshNode {
            name: node_name,
            positions,
            normals,
            indices: mesh.indices,
            material: mesh.material_id.filter(|&id| id < tree.materials.len()),
            transform: Mat4::IDENTITY,
        });
    }

    tracing::debug!(
        "Parsed OBJ '{}': {} meshes, {} vertices, {} triangles",
        name,
        tree.nodes.len(),
        tree.vertex_count(),
        tree.triangle_count()
    );

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";

    const TWO_QUADS: &str = "\
o floor
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vn 0.0 1.0 0.0
f 1//1 2//1 3//1 4//1
o wall
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 2.0 -1.0
v -1.0 2.0 -1.0
f 5 6 7 8
";

    #[test]
    fn test_load_triangle() {
        let tree = load_obj_from_bytes("tri", TRIANGLE.as_bytes()).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].name, "tri");
        assert_eq!(tree.vertex_count(), 3);
        assert_eq!(tree.triangle_count(), 1);
        // Normal computed from winding
        let n = tree.nodes[0].normals[0];
        assert!((n[2] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_quads_are_triangulated() {
        let tree = load_obj_from_bytes("room", TWO_QUADS.as_bytes()).unwrap();
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(tree.triangle_count(), 4);
        for node in &tree.nodes {
            assert_eq!(node.normals.len(), node.positions.len());
        }
        let bounds = tree.bounds();
        assert_eq!(bounds.size(), glam::Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_empty_stream_is_degenerate_not_error() {
        let tree = load_obj_from_bytes("empty", b"").unwrap();
        assert!(tree.is_empty());
        assert!(tree.bounds().is_empty());
    }

    #[test]
    fn test_missing_mtllib_is_ignored() {
        let src = format!("mtllib missing.mtl\nusemtl red\n{}", TRIANGLE);
        let tree = load_obj_from_bytes("tri", src.as_bytes()).unwrap();
        assert!(tree.materials.is_empty());
        assert_eq!(tree.nodes[0].material, None);
    }

    #[test]
    fn test_bad_face_index_is_parse_error() {
        let src = "v 0 0 0\nv 1 0 0\nf 1 2 9\n";
        let err = load_obj_from_bytes("broken", src.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
