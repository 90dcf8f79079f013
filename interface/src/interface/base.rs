//! The `v450` interface: unlit geometry with one texture.
//!
//! | Symbol | Value |
//! |--------|-------|
//! | `MATRIX_LOCATION_UNIFORM` | 0 |
//! | `SAMPLER_LOCATION_UNIFORM` | 1 |
//! | `TRANSLATE_LOCATION_IN` | 0 |
//! | `VERTEX_LOCATION_IN` | 1 |
//! | `COLOR_LOCATION_IN` | 2 |
//! | `COLOR_LOCATION_OUT` | 3 |
//! | `TEXCOORD0_LOCATION_OUT` | 4 |
//! | `FRAGCOLOR_LOCATION_OUT` | 5 |

use super::{DefineGroup, InterfaceVariable, SamplerBinding, ShaderInterface};
use crate::blocks::MAX_MODEL_MATRICES;
use crate::header::DefineExpr;
use crate::layout::{BlockMember, UniformBlock};
use crate::types::{GlslType, Precision};

pub const DIRECTORY: &str = "v450";

pub const MATRIX_LOCATION_UNIFORM: u32 = 0;
pub const SAMPLER_LOCATION_UNIFORM: u32 = 1;

pub const TRANSLATE_LOCATION_IN: u32 = 0;
pub const VERTEX_LOCATION_IN: u32 = 1;
pub const COLOR_LOCATION_IN: u32 = 2;

pub const COLOR_LOCATION_OUT: u32 = 3;
pub const TEXCOORD0_LOCATION_OUT: u32 = 4;
pub const FRAGCOLOR_LOCATION_OUT: u32 = 5;

static_assertions::const_assert!(MATRIX_LOCATION_UNIFORM != SAMPLER_LOCATION_UNIFORM);

impl ShaderInterface {
    /// The `v450` table.
    pub fn base() -> Self {
        let lit = |value: u32| DefineExpr::literal(value.into());

        Self::new("base", DIRECTORY)
            .with_define(
                "MATRIX_LOCATION_UNIFORM",
                lit(MATRIX_LOCATION_UNIFORM),
                DefineGroup::Uniform,
            )
            .with_define(
                "SAMPLER_LOCATION_UNIFORM",
                lit(SAMPLER_LOCATION_UNIFORM),
                DefineGroup::Uniform,
            )
            .with_define("TRANSLATE_LOCATION_IN", lit(TRANSLATE_LOCATION_IN), DefineGroup::In)
            .with_define("VERTEX_LOCATION_IN", lit(VERTEX_LOCATION_IN), DefineGroup::In)
            .with_define("COLOR_LOCATION_IN", lit(COLOR_LOCATION_IN), DefineGroup::In)
            .with_define("COLOR_LOCATION_OUT", lit(COLOR_LOCATION_OUT), DefineGroup::Out)
            .with_define("TEXCOORD0_LOCATION_OUT", lit(TEXCOORD0_LOCATION_OUT), DefineGroup::Out)
            .with_define("FRAGCOLOR_LOCATION_OUT", lit(FRAGCOLOR_LOCATION_OUT), DefineGroup::Out)
            .with_uniform_block(
                UniformBlock::new("uniform_matrices", MATRIX_LOCATION_UNIFORM)
                    .with_binding_symbol("MATRIX_LOCATION_UNIFORM")
                    .with_member(BlockMember::array(
                        "uModelMatrix",
                        GlslType::Mat4,
                        MAX_MODEL_MATRICES as u32,
                    )),
            )
            .with_sampler(
                SamplerBinding::new("uTexture", SAMPLER_LOCATION_UNIFORM)
                    .with_symbol("SAMPLER_LOCATION_UNIFORM")
                    .with_precision(Precision::Lowp),
            )
            .with_input(
                InterfaceVariable::new("aTranslate", GlslType::Vec3, TRANSLATE_LOCATION_IN)
                    .with_symbol("TRANSLATE_LOCATION_IN"),
            )
            .with_input(
                InterfaceVariable::new("aVertex", GlslType::Vec3, VERTEX_LOCATION_IN)
                    .with_symbol("VERTEX_LOCATION_IN"),
            )
            .with_input(
                InterfaceVariable::new("aColor", GlslType::Vec4, COLOR_LOCATION_IN)
                    .with_symbol("COLOR_LOCATION_IN"),
            )
            .with_output(
                InterfaceVariable::new("color", GlslType::Vec4, COLOR_LOCATION_OUT)
                    .with_symbol("COLOR_LOCATION_OUT"),
            )
            .with_output(
                InterfaceVariable::new("vTexCoord", GlslType::Vec2, TEXCOORD0_LOCATION_OUT)
                    .with_symbol("TEXCOORD0_LOCATION_OUT"),
            )
            .with_output(
                InterfaceVariable::new("fragColor", GlslType::Vec4, FRAGCOLOR_LOCATION_OUT)
                    .with_symbol("FRAGCOLOR_LOCATION_OUT"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_match_table() {
        let iface = ShaderInterface::base();
        for (name, value) in iface.shader_defs().unwrap() {
            let expected = match name.as_str() {
                "MATRIX_LOCATION_UNIFORM" => MATRIX_LOCATION_UNIFORM,
                "SAMPLER_LOCATION_UNIFORM" => SAMPLER_LOCATION_UNIFORM,
                "TRANSLATE_LOCATION_IN" => TRANSLATE_LOCATION_IN,
                "VERTEX_LOCATION_IN" => VERTEX_LOCATION_IN,
                "COLOR_LOCATION_IN" => COLOR_LOCATION_IN,
                "COLOR_LOCATION_OUT" => COLOR_LOCATION_OUT,
                "TEXCOORD0_LOCATION_OUT" => TEXCOORD0_LOCATION_OUT,
                "FRAGCOLOR_LOCATION_OUT" => FRAGCOLOR_LOCATION_OUT,
                other => panic!("unexpected define {other}"),
            };
            assert_eq!(value, expected, "{name}");
        }
    }

    #[test]
    fn test_matrix_block() {
        let iface = ShaderInterface::base();
        let block = iface.uniform_block("uniform_matrices").unwrap();
        assert_eq!(block.instance_name, None);
        assert_eq!(block.std140().unwrap().size, 192);
    }
}
