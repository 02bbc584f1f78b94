//! Model loading
//!
//! The loader turns a [`ModelSource`] into a [`GeometryTree`]. Parsing is
//! synchronous here; callers that must not block wrap it (the viewport
//! controller runs it on a worker thread).

mod normals;
mod obj;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryTree;

pub use normals::{calculate_triangle_normal, calculate_vertex_normals};
pub use obj::{load_obj, load_obj_from_bytes};

/// Reference to a model asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelSource {
    /// File on disk
    Path(PathBuf),
    /// Already fetched bytes; the name carries the file extension
    #[serde(skip)]
    Bytes { name: String, data: Arc<[u8]> },
}

impl ModelSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ModelSource::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        ModelSource::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Display name (file stem for paths).
    pub fn name(&self) -> String {
        match self {
            ModelSource::Path(path) => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unnamed")
                .to_string(),
            ModelSource::Bytes { name, .. } => Path::new(name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(name)
                .to_string(),
        }
    }

    /// Format implied by the file extension.
    ///
    /// Byte streams without an extension are assumed to be OBJ.
    pub fn format(&self) -> MeshFormat {
        match self {
            ModelSource::Path(path) => MeshFormat::from_path(path),
            ModelSource::Bytes { name, .. } => {
                let path = Path::new(name);
                if path.extension().is_none() {
                    MeshFormat::Obj
                } else {
                    MeshFormat::from_path(path)
                }
            }
        }
    }
}

/// Detected mesh format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Unknown,
}

impl MeshFormat {
    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("obj") => MeshFormat::Obj,
            _ => MeshFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, MeshFormat::Obj)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MeshFormat::Obj => "OBJ",
            MeshFormat::Unknown => "Unknown",
        }
    }
}

/// Load any supported model source.
pub fn load_model(source: &ModelSource) -> Result<GeometryTree, LoadError> {
    let format = source.format();
    if !format.is_supported() {
        let ext = match source {
            ModelSource::Path(path) => path.extension(),
            ModelSource::Bytes { name, .. } => Path::new(name).extension(),
        };
        return Err(LoadError::UnsupportedFormat(
            ext.and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        ));
    }

    match source {
        ModelSource::Path(path) => load_obj(path),
        ModelSource::Bytes { data, .. } => load_obj_from_bytes(&source.name(), data),
    }
}

/// Model loading errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unsupported format: {0} (only OBJ is supported)")]
    UnsupportedFormat(String),
}

impl LoadError {
    /// Human-readable reason reported to the host.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(MeshFormat::from_path(Path::new("a/b/model.OBJ")), MeshFormat::Obj);
        assert_eq!(MeshFormat::from_path(Path::new("model.stl")), MeshFormat::Unknown);
        assert_eq!(ModelSource::bytes("blob", Vec::<u8>::new()).format(), MeshFormat::Obj);
        assert_eq!(
            ModelSource::bytes("scene.glb", Vec::<u8>::new()).format(),
            MeshFormat::Unknown
        );
    }

    #[test]
    fn test_unsupported_format_is_load_error() {
        let err = load_model(&ModelSource::path("robot.stl")).unwrap_err();
        assert_eq!(err, LoadError::UnsupportedFormat("stl".to_string()));
        assert!(err.reason().contains("stl"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_model(&ModelSource::path("/definitely/not/here.obj")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_source_name() {
        assert_eq!(ModelSource::path("/tmp/teapot.obj").name(), "teapot");
        assert_eq!(ModelSource::bytes("cube.obj", Vec::<u8>::new()).name(), "cube");
    }
}
