//! Fixed light rig: ambient, directional and hemisphere lights

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use mv_core::Color;

use crate::constants::{light as defaults, shadow};

/// Light uniform buffer data sent to GPU (176 bytes)
///
/// `light_view_proj` and `shadow_params` are reserved for a shadow pass and
/// are not read by `mesh.wgsl`. They keep the layout stable for it.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// Reserved: directional light view-projection matrix (shadow volume)
    pub light_view_proj: [[f32; 4]; 4],
    /// Direction toward the directional light (xyz), intensity (w)
    pub direction: [f32; 4],
    /// Directional color (rgb), casts shadow (w, 1.0 or 0.0)
    pub directional_color: [f32; 4],
    /// Ambient color (rgb) and intensity (w)
    pub ambient: [f32; 4],
    /// Hemisphere sky color (rgb) and intensity (w)
    pub sky_color: [f32; 4],
    /// Hemisphere ground color (rgb), w unused
    pub ground_color: [f32; 4],
    /// Hemisphere up direction (xyz), w unused
    pub hemisphere_up: [f32; 4],
    /// Reserved: x = bias, y = normal_bias, z = ortho half-size, w = far plane
    pub shadow_params: [f32; 4],
}

impl Default for LightUniform {
    fn default() -> Self {
        LightRig::default().uniform()
    }
}

/// Uniform light from every direction.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            intensity: defaults::AMBIENT_INTENSITY,
        }
    }
}

/// Directional light placed at a position and shining toward a target.
///
/// All rays are parallel to `position - target`. The orthographic shadow
/// volume is sized by [`DirectionalLight::fit_to_scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub cast_shadow: bool,
    /// Shadow depth bias to prevent shadow acne
    pub shadow_bias: f32,
    /// Normal-based shadow bias for surfaces at grazing angles
    pub shadow_normal_bias: f32,
    /// Orthographic projection half-size for the shadow volume (world units)
    pub ortho_size: f32,
    pub ortho_near: f32,
    pub ortho_far: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectionalLight {
    pub fn new() -> Self {
        Self {
            position: Vec3::from(defaults::DIRECTIONAL_POSITION),
            target: Vec3::ZERO,
            color: Color::WHITE,
            intensity: defaults::DIRECTIONAL_INTENSITY,
            cast_shadow: true,
            shadow_bias: shadow::DEFAULT_BIAS,
            shadow_normal_bias: shadow::DEFAULT_NORMAL_BIAS,
            ortho_size: 20.0,
            ortho_near: 0.1,
            ortho_far: 100.0,
        }
    }

    /// Unit direction from the target toward the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }

    /// View matrix looking from the light toward its target.
    pub fn view_matrix(&self) -> Mat4 {
        let dir = self.direction();
        let eye = self.target + dir * self.ortho_far * 0.5;
        let up = if dir.abs_diff_eq(Vec3::Y, 1e-4) || dir.abs_diff_eq(-Vec3::Y, 1e-4) {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(eye, self.target, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            -self.ortho_size,
            self.ortho_size,
            -self.ortho_size,
            self.ortho_size,
            self.ortho_near,
            self.ortho_far,
        )
    }

    /// Fits the shadow volume around a bounding sphere.
    pub fn fit_to_scene(&mut self, center: Vec3, radius: f32) {
        let radius = if radius.is_finite() && radius > 0.0 {
            radius
        } else {
            1.0
        };
        self.target = center;
        self.ortho_size = radius * 1.5;
        self.ortho_far = radius * 4.0;
    }
}

/// Sky/ground gradient light.
#[derive(Debug, Clone, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: Color,
    pub ground_color: Color,
    pub intensity: f32,
    /// Only the direction from the origin matters
    pub position: Vec3,
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self {
            sky_color: Color::from_hex(defaults::HEMISPHERE_SKY),
            ground_color: Color::from_hex(defaults::HEMISPHERE_GROUND),
            intensity: defaults::HEMISPHERE_INTENSITY,
            position: Vec3::from(defaults::HEMISPHERE_POSITION),
        }
    }
}

/// The fixed set of lights every scene gets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub hemisphere: HemisphereLight,
}

impl LightRig {
    /// Packs the rig for the GPU. Colors are converted to linear light.
    pub fn uniform(&self) -> LightUniform {
        let dir = self.directional.direction();
        let light_view_proj = self.directional.projection_matrix() * self.directional.view_matrix();
        let directional = self.directional.color.to_linear();
        let ambient = self.ambient.color.to_linear();
        let sky = self.hemisphere.sky_color.to_linear();
        let ground = self.hemisphere.ground_color.to_linear();
        let up = self.hemisphere.position.normalize_or(Vec3::Y);

        LightUniform {
            light_view_proj: light_view_proj.to_cols_array_2d(),
            direction: [dir.x, dir.y, dir.z, self.directional.intensity],
            directional_color: [
                directional.r,
                directional.g,
                directional.b,
                if self.directional.cast_shadow { 1.0 } else { 0.0 },
            ],
            ambient: [ambient.r, ambient.g, ambient.b, self.ambient.intensity],
            sky_color: [sky.r, sky.g, sky.b, self.hemisphere.intensity],
            ground_color: [ground.r, ground.g, ground.b, 0.0],
            hemisphere_up: [up.x, up.y, up.z, 0.0],
            shadow_params: [
                self.directional.shadow_bias,
                self.directional.shadow_normal_bias,
                self.directional.ortho_size,
                self.directional.ortho_far,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_default_rig_values() {
        let rig = LightRig::default();
        assert_eq!(rig.ambient.intensity, 0.6);
        assert_eq!(rig.ambient.color, Color::WHITE);
        assert_eq!(rig.directional.intensity, 0.8);
        assert_eq!(rig.directional.position, Vec3::new(5.0, 10.0, 7.5));
        assert!(rig.directional.cast_shadow);
        assert_eq!(rig.hemisphere.intensity, 0.4);
        assert_eq!(rig.hemisphere.ground_color.to_rgba8(), [0x44, 0x44, 0x44, 255]);
        assert_eq!(rig.hemisphere.position, Vec3::new(0.0, 20.0, 0.0));
    }

    #[test]
    fn test_uniform_packs_direction_and_flags() {
        let u = LightRig::default().uniform();
        let dir = Vec3::new(5.0, 10.0, 7.5).normalize();
        assert_relative_eq!(u.direction[0], dir.x, epsilon = 1e-6);
        assert_relative_eq!(u.direction[1], dir.y, epsilon = 1e-6);
        assert_eq!(u.direction[3], 0.8);
        assert_eq!(u.directional_color[3], 1.0);
        assert_eq!(u.hemisphere_up, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(std::mem::size_of::<LightUniform>(), 176);
    }

    #[test]
    fn test_reserved_shadow_fields_follow_light() {
        let mut rig = LightRig::default();
        rig.directional.fit_to_scene(Vec3::ZERO, 2.0);
        let u = rig.uniform();
        assert_eq!(u.shadow_params[2], 3.0);
        assert_eq!(u.shadow_params[3], 8.0);
        let expected = rig.directional.projection_matrix() * rig.directional.view_matrix();
        assert_eq!(u.light_view_proj, expected.to_cols_array_2d());
    }

    #[test]
    fn test_shader_light_struct_matches_uniform_size() {
        let module = naga::front::wgsl::parse_str(include_str!("shaders/mesh.wgsl")).unwrap();
        let span = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(name), naga::TypeInner::Struct { span, .. }) if name == "LightUniform" => {
                    Some(*span)
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(span as usize, std::mem::size_of::<LightUniform>());
    }

    #[test]
    fn test_fit_to_scene() {
        let mut light = DirectionalLight::new();
        light.fit_to_scene(Vec3::ZERO, 2.0);
        assert_eq!(light.ortho_size, 3.0);
        assert_eq!(light.ortho_far, 8.0);

        light.fit_to_scene(Vec3::ZERO, 0.0);
        assert_eq!(light.ortho_size, 1.5);
    }
}
