//! Host-side mirrors of the uniform blocks.
//!
//! These structs are uploaded verbatim with `bytemuck`. Field order and
//! padding follow the std140 offsets of the matching GLSL blocks; the size
//! assertions below fail the build if either side drifts.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::error::{InterfaceError, Result};
use crate::lighting::{DirectionalLight, PbrMaterial};

/// Length of the `uModelMatrix` array in both blocks.
pub const MAX_MODEL_MATRICES: usize = 3;

/// A `vec3` padded to the 16-byte std140 array stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Std140Vec3 {
    pub value: Vec3,
    _pad: f32,
}

impl Std140Vec3 {
    pub fn new(value: Vec3) -> Self {
        Self { value, _pad: 0.0 }
    }
}

impl From<Vec3> for Std140Vec3 {
    fn from(value: Vec3) -> Self {
        Self::new(value)
    }
}

/// Mirror of the base `uniform_matrices` block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformMatrices {
    pub model: [Mat4; MAX_MODEL_MATRICES],
}

impl Default for UniformMatrices {
    fn default() -> Self {
        Self {
            model: [Mat4::IDENTITY; MAX_MODEL_MATRICES],
        }
    }
}

impl UniformMatrices {
    pub fn set_model_matrix(&mut self, index: usize, matrix: Mat4) -> Result<()> {
        let slot = self
            .model
            .get_mut(index)
            .ok_or(InterfaceError::IndexOutOfRange {
                index,
                len: MAX_MODEL_MATRICES,
            })?;
        *slot = matrix;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Mirror of the `pbr_matrices` std140 block.
///
/// | Field | GLSL | Offset | Size |
/// |-------|------|--------|------|
/// | `pbr_data` | `vec4 _PBRDATA[4]` | 0 | 64 |
/// | `model` | `mat4 uModelMatrix[3]` | 64 | 192 |
/// | `light0` | `vec4 _LIGHT_0[2]` | 256 | 32 |
/// | `view_position` | `vec3 _VIEWPOS[2]` | 288 | 32 |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PbrMatrices {
    pub pbr_data: [Vec4; 4],
    pub model: [Mat4; MAX_MODEL_MATRICES],
    pub light0: [Vec4; 2],
    /// Slot 0 holds the camera position; slot 1 is reserved and kept zero.
    pub view_position: [Std140Vec3; 2],
}

impl Default for PbrMatrices {
    fn default() -> Self {
        Self {
            pbr_data: PbrMaterial::default().pbr_data(),
            model: [Mat4::IDENTITY; MAX_MODEL_MATRICES],
            light0: DirectionalLight::default().light_data(),
            view_position: [Std140Vec3::default(); 2],
        }
    }
}

impl PbrMatrices {
    pub fn set_model_matrix(&mut self, index: usize, matrix: Mat4) -> Result<()> {
        let slot = self
            .model
            .get_mut(index)
            .ok_or(InterfaceError::IndexOutOfRange {
                index,
                len: MAX_MODEL_MATRICES,
            })?;
        *slot = matrix;
        Ok(())
    }

    pub fn set_material(&mut self, material: &PbrMaterial) {
        self.pbr_data = material.pbr_data();
    }

    pub fn set_light(&mut self, light: &DirectionalLight) {
        self.light0 = light.light_data();
    }

    pub fn set_view_position(&mut self, position: Vec3) {
        self.view_position[0] = Std140Vec3::new(position);
    }

    /// Take the view position from the translation of a camera matrix.
    pub fn set_view_from_camera(&mut self, camera: &Mat4) {
        self.set_view_position(camera.w_axis.truncate());
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<Std140Vec3>(), 16);
static_assertions::const_assert_eq!(std::mem::size_of::<UniformMatrices>(), 192);
static_assertions::const_assert_eq!(std::mem::size_of::<PbrMatrices>(), 320);
static_assertions::assert_impl_all!(PbrMatrices: Send, Sync);
