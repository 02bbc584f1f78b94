//! Scene ownership
//!
//! [`SceneState`] is the single owner of the camera, the orbit controls, the
//! light rig and the (at most one) loaded model group. Every mutation goes
//! through it so the "one model at a time" rule holds.

mod model_group;

pub use model_group::*;

use glam::Vec3;
use mv_core::{Color, FitResult, GeometryTree, ViewportConfig};

use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::light::LightRig;
use crate::orbit::{OrbitConstraints, OrbitControls};
use crate::traits::{DrawItem, FrameData, RenderBackend, RenderError};

/// Camera, controls, lights and the current model.
pub struct SceneState {
    camera: Camera,
    controls: OrbitControls,
    lights: LightRig,
    model: Option<ModelGroup>,
    draws: Vec<DrawItem>,
    background: Color,
    width: u32,
    height: u32,
    last_fit: Option<FitResult>,
}

impl SceneState {
    /// Builds a scene with the default light rig and the camera at the
    /// configured seed position.
    pub fn new(config: &ViewportConfig, settings: &RendererConfig, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut camera = Camera::new(width as f32 / height as f32);
        camera.position = config.camera_seed;
        camera.look_at(Vec3::ZERO);
        camera.set_zoom(config.zoom);

        let mut controls = OrbitControls::from_config(settings);
        controls.sync_from_camera(&camera);

        let mut scene = Self {
            camera,
            controls,
            lights: LightRig::default(),
            model: None,
            draws: Vec::new(),
            background: config.background,
            width,
            height,
            last_fit: None,
        };
        scene.apply_control_constraints(config);
        scene
    }

    /// Replaces the current model with `tree`.
    ///
    /// The previous group is disposed first. The tree is moved so its
    /// centroid sits at the origin, uploaded, and the camera is placed at
    /// `fit.camera_position` looking at the origin.
    pub fn install_model(
        &mut self,
        backend: &mut dyn RenderBackend,
        mut tree: GeometryTree,
        fit: &FitResult,
        generation: u64,
    ) -> Result<(), RenderError> {
        self.dispose_model(backend);

        tree.recenter(fit.centroid);
        let group = ModelGroup::upload(backend, &tree, generation)?;

        self.camera.position = fit.camera_position;
        self.camera.look_at(fit.target);
        self.controls.sync_from_camera(&self.camera);

        let bounds = group.bounds();
        self.lights
            .directional
            .fit_to_scene(Vec3::ZERO, bounds.radius());

        tracing::info!(
            "Installed model '{}' ({} parts, {} triangles, camera distance {:.3})",
            group.name(),
            group.parts().len(),
            group.triangle_count(),
            fit.distance
        );

        self.draws = group.draw_items().collect();
        self.model = Some(group);
        self.last_fit = Some(*fit);
        Ok(())
    }

    /// Releases the current model group, if any.
    ///
    /// Returns the number of backend resources released.
    pub fn dispose_model(&mut self, backend: &mut dyn RenderBackend) -> usize {
        self.draws.clear();
        match self.model.take() {
            Some(mut group) => group.dispose(backend),
            None => 0,
        }
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Applies the rotation and zoom flags to the orbit controls and snaps
    /// the camera into the new limits.
    pub fn apply_control_constraints(&mut self, config: &ViewportConfig) {
        self.controls
            .apply_constraints(OrbitConstraints::from_config(config));
        self.controls.update(&mut self.camera);
    }

    /// Advances the orbit controls. Returns true if the camera moved.
    pub fn update(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }

    /// Releases the model and detaches everything else.
    pub fn teardown(&mut self, backend: &mut dyn RenderBackend) {
        let released = self.dispose_model(backend);
        self.last_fit = None;
        tracing::debug!("Scene torn down ({} resources released)", released);
    }

    /// Updates the projection aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.camera
            .update_aspect(self.width as f32 / self.height as f32);
    }

    /// Snapshot of what to draw this frame.
    pub fn frame_data(&self) -> FrameData<'_> {
        FrameData {
            camera: self.camera.uniform(),
            lights: self.lights.uniform(),
            background: self.background,
            draws: &self.draws,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn model(&self) -> Option<&ModelGroup> {
        self.model.as_ref()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn last_fit(&self) -> Option<&FitResult> {
        self.last_fit.as_ref()
    }
}
