//! Model Viewer Core
//!
//! This crate contains the renderer-independent parts of the viewer:
//! - Geometry: parsed mesh trees and bounding boxes
//! - Loader: Wavefront OBJ parsing into a [`GeometryTree`]
//! - Fit: camera placement that frames a model
//! - Config: the host-supplied viewport configuration

pub mod color;
pub mod config;
pub mod fit;
pub mod geometry;
pub mod loader;

pub use color::{Color, ColorParseError};
pub use config::{ConfigError, ViewportConfig};
pub use fit::{FIT_OFFSET, FitResult, MIN_FIT_DISTANCE, fit_bounds, fit_distance, fit_tree};
pub use geometry::{BoundingBox, GeometryTree, MaterialDesc, MeshNode};
pub use loader::{LoadError, MeshFormat, ModelSource, load_model, load_obj, load_obj_from_bytes};
