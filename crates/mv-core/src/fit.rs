//! Fit-to-view camera placement
//!
//! Given the bounds of a model and a vertical field of view, computes how far
//! the camera has to sit from the model so the whole model is visible. The
//! model is expected to be moved so its centroid is at the origin before the
//! camera is placed, so the look-at target is always the origin.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, GeometryTree};

/// Clearance multiplier applied to the exact fit distance.
pub const FIT_OFFSET: f32 = 1.5;

/// Distance used when the model has no extent.
pub const MIN_FIT_DISTANCE: f32 = 1.0;

/// Camera placement that frames a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Center of the model bounds before re-centering
    pub centroid: Vec3,
    /// Largest axis size of the model bounds
    pub extent: f32,
    /// Distance from target to camera
    pub distance: f32,
    /// Camera position relative to the re-centered model
    pub camera_position: Vec3,
    /// Look-at target (always the origin)
    pub target: Vec3,
    /// True when the fallback distance was used
    pub degenerate: bool,
}

/// Distance at which an object of size `extent` fills a vertical field of
/// view of `fov_degrees`, times [`FIT_OFFSET`].
///
/// Returns [`MIN_FIT_DISTANCE`] whenever the result would not be a positive
/// finite number.
pub fn fit_distance(extent: f32, fov_degrees: f32) -> f32 {
    exact_fit_distance(extent, fov_degrees).unwrap_or(MIN_FIT_DISTANCE)
}

/// Fit distance without the fallback; `None` when it is not a positive
/// finite number.
fn exact_fit_distance(extent: f32, fov_degrees: f32) -> Option<f32> {
    let half_fov = (fov_degrees * 0.5).to_radians();
    let distance = extent / (2.0 * half_fov.tan()) * FIT_OFFSET;
    (extent > 0.0 && distance.is_finite() && distance > 0.0).then_some(distance)
}

/// Fits a camera to `bounds`.
///
/// `view_axis` is the direction from the target toward the camera; the
/// camera keeps that direction and only its distance changes. The camera is
/// placed relative to the origin, not the centroid: callers re-center the
/// model by `centroid` before showing it.
pub fn fit_bounds(bounds: &BoundingBox, fov_degrees: f32, view_axis: Vec3) -> FitResult {
    let centroid = bounds.center();
    let extent = bounds.max_extent();
    let exact = exact_fit_distance(extent, fov_degrees);
    let degenerate = exact.is_none();
    let distance = exact.unwrap_or(MIN_FIT_DISTANCE);

    if degenerate {
        tracing::debug!(
            "Degenerate model bounds (extent {}), using fallback distance {}",
            extent,
            MIN_FIT_DISTANCE
        );
    }

    let axis = view_axis.normalize_or(Vec3::Z);
    let target = Vec3::ZERO;

    FitResult {
        centroid: if centroid.is_finite() { centroid } else { Vec3::ZERO },
        extent,
        distance,
        camera_position: target + axis * distance,
        target,
        degenerate,
    }
}

/// Fits a camera to a whole geometry tree.
pub fn fit_tree(tree: &GeometryTree, fov_degrees: f32, view_axis: Vec3) -> FitResult {
    fit_bounds(&tree.bounds(), fov_degrees, view_axis)
}
