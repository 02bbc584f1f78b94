//! Perspective camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::constants::camera as defaults;

/// Camera uniform buffer data sent to GPU (80 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position (xyz), w unused
    pub view_pos: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view_pos: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Perspective camera looking at a target, Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees, before zoom
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    /// Zoom factor applied to the projection (> 0)
    pub zoom: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: defaults::FOV_DEGREES,
            near: defaults::NEAR,
            far: defaults::FAR,
            aspect: sanitize_aspect(aspect),
            zoom: 1.0,
        }
    }

    /// Points the camera at `target` without moving it.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Unit vector from the target toward the camera.
    ///
    /// Falls back to +Z when camera and target coincide.
    pub fn view_axis(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Z)
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn update_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn set_fov_degrees(&mut self, fov: f32) {
        self.fov_degrees = fov.clamp(1.0, 179.0);
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(1e-4);
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + 1e-3);
    }

    /// Sets the zoom factor; non-positive or non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    /// Vertical field of view with zoom applied, in degrees.
    pub fn effective_fov_degrees(&self) -> f32 {
        let half = (self.fov_degrees * 0.5).to_radians();
        (2.0 * (half.tan() / self.zoom).atan()).to_degrees()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.effective_fov_degrees().to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            view_pos: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}
