//! Renderer constants

/// Camera defaults
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 45.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;
}

/// Offscreen target settings
pub mod viewport {
    /// Color format of the offscreen target
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    /// No MSAA; the host samples the resolved texture directly
    pub const SAMPLE_COUNT: u32 = 1;
}

/// Default light rig
pub mod light {
    pub const AMBIENT_INTENSITY: f32 = 0.6;
    pub const DIRECTIONAL_INTENSITY: f32 = 0.8;
    pub const DIRECTIONAL_POSITION: [f32; 3] = [5.0, 10.0, 7.5];
    pub const HEMISPHERE_INTENSITY: f32 = 0.4;
    pub const HEMISPHERE_SKY: u32 = 0xffffff;
    pub const HEMISPHERE_GROUND: u32 = 0x444444;
    pub const HEMISPHERE_POSITION: [f32; 3] = [0.0, 20.0, 0.0];
}

/// Shadow volume parameters carried by the directional light
pub mod shadow {
    pub const DEFAULT_BIAS: f32 = 0.002;
    pub const DEFAULT_NORMAL_BIAS: f32 = 0.02;
}

/// Orbit control defaults
pub mod orbit {
    /// Keeps the polar angle away from the poles
    pub const POLAR_EPSILON: f32 = 1e-6;
    pub const DAMPING_FACTOR: f32 = 0.05;
    pub const ROTATE_SPEED: f32 = 1.0;
    pub const ZOOM_SPEED: f32 = 1.0;
    /// Dolly scale of one wheel notch at zoom speed 1
    pub const WHEEL_DOLLY_SCALE: f32 = 0.95;
    pub const MIN_DISTANCE: f32 = 0.0;
    pub const MAX_DISTANCE: f32 = f32::INFINITY;
}
