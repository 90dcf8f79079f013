//! Material and light parameters packed for the `pbr_matrices` block.

use glam::{Vec3, Vec4};

/// Reflectance of dielectrics at normal incidence.
pub const DIELECTRIC_SPECULAR: f32 = 0.04;

/// Metallic-roughness material parameters.
///
/// Packed into `_PBRDATA` as four rows:
///
/// | Row | x | y | z | w |
/// |-----|---|---|---|---|
/// | 0 | metallic | roughness | exposure | gamma |
/// | 1 | F0.r | F0.g | F0.b | 0 |
/// | 2 | cDiff.r | cDiff.g | cDiff.b | 0 |
/// | 3 | base.r | base.g | base.b | base.a |
#[derive(Debug, Clone, PartialEq)]
pub struct PbrMaterial {
    pub base_color_factor: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub exposure: f32,
    pub gamma: f32,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE,
            metallic: 1.0,
            roughness: 1.0,
            exposure: 1.0,
            gamma: 2.2,
        }
    }
}

impl PbrMaterial {
    pub fn with_base_color(mut self, color: Vec4) -> Self {
        self.base_color_factor = color;
        self
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.exposure = exposure;
        self
    }

    /// Specular color at normal incidence.
    ///
    /// Dielectrics reflect a constant 4%; metals reflect their base color.
    pub fn f0(&self) -> Vec3 {
        let metallic = self.metallic.clamp(0.0, 1.0);
        Vec3::splat(DIELECTRIC_SPECULAR).lerp(self.base_color_factor.truncate(), metallic)
    }

    /// Diffuse color. Metals have none.
    pub fn diffuse_color(&self) -> Vec3 {
        let metallic = self.metallic.clamp(0.0, 1.0);
        let dielectric = self.base_color_factor.truncate() * (1.0 - DIELECTRIC_SPECULAR);
        dielectric.lerp(Vec3::ZERO, metallic)
    }

    /// Pack this material into the four `_PBRDATA` rows.
    pub fn pbr_data(&self) -> [Vec4; 4] {
        [
            Vec4::new(
                self.metallic.clamp(0.0, 1.0),
                self.roughness.clamp(0.0, 1.0),
                self.exposure,
                self.gamma,
            ),
            self.f0().extend(0.0),
            self.diffuse_color().extend(0.0),
            self.base_color_factor,
        ]
    }
}

/// The scene's directional light as the PBR shaders receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            position: Vec3::new(5000.0, 5000.0, 10000.0),
        }
    }
}

impl DirectionalLight {
    pub fn new(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            position,
        }
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    /// Pack into the two `_LIGHT_0` rows: color + intensity, then position.
    pub fn light_data(&self) -> [Vec4; 2] {
        [self.color.extend(self.intensity), self.position.extend(0.0)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material_is_full_metal() {
        let data = PbrMaterial::default().pbr_data();
        assert_eq!(data[0], Vec4::new(1.0, 1.0, 1.0, 2.2));
        // Fully metallic: F0 is the base color, no diffuse.
        assert!((data[1] - Vec4::new(1.0, 1.0, 1.0, 0.0)).abs().max_element() < 1e-6);
        assert_eq!(data[2], Vec4::ZERO);
        assert_eq!(data[3], Vec4::ONE);
    }

    #[test]
    fn test_dielectric_material() {
        let material = PbrMaterial::default()
            .with_base_color(Vec4::new(0.5, 0.25, 1.0, 1.0))
            .with_metallic(0.0);

        let f0 = material.f0();
        assert!((f0 - Vec3::splat(0.04)).abs().max_element() < 1e-6);

        let diffuse = material.diffuse_color();
        assert!((diffuse - Vec3::new(0.48, 0.24, 0.96)).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_factors_are_clamped() {
        let data = PbrMaterial::default()
            .with_metallic(1.5)
            .with_roughness(-0.2)
            .pbr_data();
        assert_eq!(data[0].x, 1.0);
        assert_eq!(data[0].y, 0.0);
    }

    #[test]
    fn test_light_data() {
        let mut light = DirectionalLight::default();
        light.set_intensity(0.5);
        let data = light.light_data();
        assert_eq!(data[0], Vec4::new(1.0, 1.0, 1.0, 0.5));
        assert_eq!(data[1], Vec4::new(5000.0, 5000.0, 10000.0, 0.0));
    }
}
