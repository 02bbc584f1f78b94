//! Orbit camera controls
//!
//! The camera orbits a target on a sphere. Angles follow the usual
//! spherical convention with Y up: azimuth `theta` is measured around +Y
//! starting from +Z, polar `phi` is measured down from +Y.
//!
//! Input only queues deltas; [`OrbitControls::update`] applies them once per
//! frame, clamps against the active [`OrbitConstraints`] and writes the camera
//! position.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use mv_core::ViewportConfig;

use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::constants::orbit as defaults;

/// Spherical coordinates relative to the orbit target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    /// Azimuth around +Y, from +Z
    pub theta: f32,
    /// Polar angle from +Y
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 || !radius.is_finite() {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    /// Keeps the polar angle strictly between the poles.
    fn make_safe(&mut self) {
        self.phi = self
            .phi
            .clamp(defaults::POLAR_EPSILON, PI - defaults::POLAR_EPSILON);
    }
}

/// Limits applied to orbit interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConstraints {
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitConstraints {
    fn default() -> Self {
        Self {
            enable_rotate: true,
            enable_zoom: true,
            enable_pan: false,
            min_azimuth: f32::NEG_INFINITY,
            max_azimuth: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
        }
    }
}

impl OrbitConstraints {
    /// Translates the viewport flags into orbit limits.
    ///
    /// A locked horizontal axis pins the azimuth to the front view (0); a
    /// locked vertical axis pins the polar angle to the horizon (pi/2).
    /// Pan is never available.
    pub fn from_config(config: &ViewportConfig) -> Self {
        let (min_azimuth, max_azimuth) = if config.allow_horizontal_rotate {
            (f32::NEG_INFINITY, f32::INFINITY)
        } else {
            (0.0, 0.0)
        };
        let (min_polar, max_polar) = if config.allow_vertical_rotate {
            (0.0, PI)
        } else {
            (PI / 2.0, PI / 2.0)
        };

        Self {
            enable_rotate: config.rotation_enabled(),
            enable_zoom: config.allow_zoom,
            enable_pan: false,
            min_azimuth,
            max_azimuth,
            min_polar,
            max_polar,
        }
    }

    fn clamp_azimuth(&self, theta: f32) -> f32 {
        let (mut min, mut max) = (self.min_azimuth, self.max_azimuth);
        if !(min.is_finite() && max.is_finite()) {
            return theta;
        }
        if min < -PI {
            min += TAU;
        } else if min > PI {
            min -= TAU;
        }
        if max < -PI {
            max += TAU;
        } else if max > PI {
            max -= TAU;
        }

        if min <= max {
            theta.clamp(min, max)
        } else if theta > (min + max) / 2.0 {
            theta.max(min)
        } else {
            theta.min(max)
        }
    }
}

/// Orbit controls bound to one camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    spherical: Spherical,
    pending_theta: f32,
    pending_phi: f32,
    scale: f32,
    constraints: OrbitConstraints,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            spherical: Spherical::from_offset(Vec3::new(0.0, 1.0, 3.0)),
            pending_theta: 0.0,
            pending_phi: 0.0,
            scale: 1.0,
            constraints: OrbitConstraints::default(),
            min_distance: defaults::MIN_DISTANCE,
            max_distance: defaults::MAX_DISTANCE,
            enable_damping: false,
            damping_factor: defaults::DAMPING_FACTOR,
            rotate_speed: defaults::ROTATE_SPEED,
            zoom_speed: defaults::ZOOM_SPEED,
        }
    }

    pub fn from_config(config: &RendererConfig) -> Self {
        let mut controls = Self::new();
        controls.apply_settings(config);
        controls
    }

    /// Applies damping and speed settings.
    pub fn apply_settings(&mut self, config: &RendererConfig) {
        self.enable_damping = config.enable_damping;
        self.damping_factor = config.damping_factor.clamp(0.001, 1.0);
        self.rotate_speed = config.rotate_speed;
        self.zoom_speed = config.zoom_speed;
    }

    pub fn constraints(&self) -> &OrbitConstraints {
        &self.constraints
    }

    /// Replaces the active limits. Takes effect on the next [`Self::update`].
    pub fn apply_constraints(&mut self, constraints: OrbitConstraints) {
        if !constraints.enable_rotate {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
        if !constraints.enable_zoom {
            self.scale = 1.0;
        }
        self.constraints = constraints;
    }

    /// Current azimuth in radians.
    pub fn azimuth(&self) -> f32 {
        self.spherical.theta
    }

    /// Current polar angle in radians.
    pub fn polar(&self) -> f32 {
        self.spherical.phi
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    /// Queues a rotation. Ignored when rotation is disabled.
    pub fn rotate(&mut self, delta_theta: f32, delta_phi: f32) {
        if !self.constraints.enable_rotate {
            return;
        }
        self.pending_theta += delta_theta;
        self.pending_phi += delta_phi;
    }

    /// Queues a rotation from a pointer drag in pixels.
    ///
    /// Dragging the full viewport height turns the camera once around.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate(
            -TAU * dx / height * self.rotate_speed,
            -TAU * dy / height * self.rotate_speed,
        );
    }

    /// Moves the camera toward the target by `scale` (< 1 moves closer).
    pub fn dolly_in(&mut self, scale: f32) {
        if !self.constraints.enable_zoom || !(scale.is_finite() && scale > 0.0) {
            return;
        }
        self.scale *= scale;
    }

    /// Moves the camera away from the target by `scale` (< 1 moves away).
    pub fn dolly_out(&mut self, scale: f32) {
        if !self.constraints.enable_zoom || !(scale.is_finite() && scale > 0.0) {
            return;
        }
        self.scale /= scale;
    }

    /// Dolly scale of one wheel notch at the configured speed.
    pub fn wheel_scale(&self) -> f32 {
        defaults::WHEEL_DOLLY_SCALE.powf(self.zoom_speed)
    }

    /// Dollies by wheel notches; positive values move closer.
    pub fn wheel(&mut self, notches: f32) {
        if notches == 0.0 || !notches.is_finite() {
            return;
        }
        let scale = self.wheel_scale().powf(notches.abs());
        if notches > 0.0 {
            self.dolly_in(scale);
        } else {
            self.dolly_out(scale);
        }
    }

    /// Returns true while damped motion is still settling.
    pub fn is_settling(&self) -> bool {
        self.pending_theta.abs() > 1e-5 || self.pending_phi.abs() > 1e-5
    }

    /// Re-reads the orbit state from the camera after it was placed directly.
    pub fn sync_from_camera(&mut self, camera: &Camera) {
        self.target = camera.target;
        self.spherical = Spherical::from_offset(camera.position - camera.target);
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.scale = 1.0;
    }

    /// Applies pending input and constraints to `camera`.
    ///
    /// Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let mut s = Spherical::from_offset(camera.position - self.target);

        if self.enable_damping {
            s.theta += self.pending_theta * self.damping_factor;
            s.phi += self.pending_phi * self.damping_factor;
        } else {
            s.theta += self.pending_theta;
            s.phi += self.pending_phi;
        }

        s.theta = self.constraints.clamp_azimuth(s.theta);
        s.phi = s
            .phi
            .clamp(self.constraints.min_polar, self.constraints.max_polar);
        s.make_safe();
        s.radius = (s.radius * self.scale).clamp(self.min_distance, self.max_distance);

        let previous = camera.position;
        camera.position = self.target + s.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            self.pending_theta *= 1.0 - self.damping_factor;
            self.pending_phi *= 1.0 - self.damping_factor;
        } else {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
        }
        self.scale = 1.0;
        self.spherical = s;

        previous.distance_squared(camera.position) > 1e-12
    }
}
