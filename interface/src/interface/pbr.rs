//! The `v450/gltf` interface: metallic-roughness PBR.
//!
//! Vertex inputs use literal locations 0..=7. The varyings start at 8 and
//! end with three multi-slot values whose locations are chained:
//!
//! ```text
//! LIGHT_LOCATION         14   Light     (LIGHT_LOCATIONS slots)
//! MATERIAL_LOCATION      17   Material  (MATERIAL_LOCATIONS slots)
//! TANGENTLIGHT_LOCATION  24   mat3      (3 slots)
//! LAST_LOCATION_IN       27
//! ```
//!
//! The fragment output takes the first location after the varyings.

use super::{DefineGroup, InterfaceVariable, SamplerBinding, ShaderInterface, StructType};
use crate::blocks::MAX_MODEL_MATRICES;
use crate::header::DefineExpr;
use crate::layout::{BlockLayout, BlockMember, UniformBlock};
use crate::types::GlslType;

pub const DIRECTORY: &str = "v450/gltf";

// Sampler and block bindings.
pub const TEXTURE0_BINDING: u32 = 0;
pub const TEXTURE_NORMAL_BINDING: u32 = 1;
pub const TEXTURE_MR_BINDING: u32 = 2;
pub const TEXTURE_OCCLUSION_BINDING: u32 = 3;
pub const PBR_MATRICES_BINDING: u32 = 4;

// Vertex inputs.
pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TANGENT_LOCATION: u32 = 2;
pub const BITANGENT_LOCATION: u32 = 3;
pub const TEXCOORD_0_LOCATION: u32 = 4;
pub const TEXCOORD_NORMAL_LOCATION: u32 = 5;
pub const TEXCOORD_MR_LOCATION: u32 = 6;
pub const TEXCOORD_OCCLUSION_LOCATION: u32 = 7;

// Varyings.
pub const DIFFUSECOLOR_LOCATION: u32 = 8;
pub const TEXCOORD0_LOCATION: u32 = 9;
pub const TEXNORMAL_LOCATION: u32 = 10;
pub const TEXMR_LOCATION: u32 = 11;
pub const TEXOCCL_LOCATION: u32 = 12;
pub const WORLDPOS_LOCATION: u32 = 13;
pub const LIGHT_LOCATION: u32 = 14;

/// Slots taken by a `Light` varying.
pub const LIGHT_LOCATIONS: u32 = 3;
/// Slots taken by a `Material` varying.
pub const MATERIAL_LOCATIONS: u32 = 7;
/// Slots taken by the `mat3` tangent-space matrix.
pub const TANGENTLIGHT_LOCATIONS: u32 = 3;

pub const MATERIAL_LOCATION: u32 = LIGHT_LOCATION + LIGHT_LOCATIONS;
pub const TANGENTLIGHT_LOCATION: u32 = MATERIAL_LOCATION + MATERIAL_LOCATIONS;
pub const LAST_LOCATION_IN: u32 = TANGENTLIGHT_LOCATION + TANGENTLIGHT_LOCATIONS;

pub const FRAGCOLOR_LOCATION_OUT: u32 = LAST_LOCATION_IN;
pub const FRAGCOLOR_LOCATION: u32 = FRAGCOLOR_LOCATION_OUT;

static_assertions::const_assert_eq!(MATERIAL_LOCATION, 17);
static_assertions::const_assert_eq!(TANGENTLIGHT_LOCATION, 24);
static_assertions::const_assert_eq!(LAST_LOCATION_IN, 27);
static_assertions::const_assert!(TEXCOORD_OCCLUSION_LOCATION < DIFFUSECOLOR_LOCATION);

/// `struct Light`, as passed from the vertex to the fragment stage.
pub fn light_struct() -> StructType {
    StructType::new("Light")
        .with_member(GlslType::Vec4, "color")
        .with_member(GlslType::Vec3, "position")
        .with_member(GlslType::Vec3, "viewDirection")
}

/// `struct Material`: the unpacked `_PBRDATA` rows.
pub fn material_struct() -> StructType {
    StructType::new("Material")
        .with_member(GlslType::Vec4, "diffuse")
        .with_member(GlslType::Vec3, "F0")
        .with_member(GlslType::Vec3, "cDiff")
        .with_member(GlslType::Float, "metallic")
        .with_member(GlslType::Float, "roughness")
        .with_member(GlslType::Float, "exposure")
        .with_member(GlslType::Float, "gamma")
}

impl ShaderInterface {
    /// The `v450/gltf` table.
    pub fn pbr() -> Self {
        let light = light_struct();
        let material = material_struct();
        let light_slots = light
            .location_slots()
            .expect("Light members are builtin types");
        let material_slots = material
            .location_slots()
            .expect("Material members are builtin types");

        let lit = |value: u32| DefineExpr::literal(value.into());
        let vec2 =
            |name: &str, location: u32| InterfaceVariable::new(name, GlslType::Vec2, location);

        Self::new("pbr", DIRECTORY)
            .with_struct(light)
            .with_struct(material)
            .with_define("LIGHT_LOCATIONS", lit(light_slots), DefineGroup::Struct)
            .with_define("MATERIAL_LOCATIONS", lit(material_slots), DefineGroup::Struct)
            .with_define("DIFFUSECOLOR_LOCATION", lit(DIFFUSECOLOR_LOCATION), DefineGroup::In)
            .with_define("TEXCOORD0_LOCATION", lit(TEXCOORD0_LOCATION), DefineGroup::In)
            .with_define("TEXNORMAL_LOCATION", lit(TEXNORMAL_LOCATION), DefineGroup::In)
            .with_define("TEXMR_LOCATION", lit(TEXMR_LOCATION), DefineGroup::In)
            .with_define("TEXOCCL_LOCATION", lit(TEXOCCL_LOCATION), DefineGroup::In)
            .with_define("WORLDPOS_LOCATION", lit(WORLDPOS_LOCATION), DefineGroup::In)
            .with_define("LIGHT_LOCATION", lit(LIGHT_LOCATION), DefineGroup::In)
            .with_define(
                "MATERIAL_LOCATION",
                DefineExpr::sum("LIGHT_LOCATION", "LIGHT_LOCATIONS"),
                DefineGroup::In,
            )
            .with_define(
                "TANGENTLIGHT_LOCATION",
                DefineExpr::sum("MATERIAL_LOCATION", "MATERIAL_LOCATIONS"),
                DefineGroup::In,
            )
            .with_define(
                "LAST_LOCATION_IN",
                DefineExpr::offset("TANGENTLIGHT_LOCATION", TANGENTLIGHT_LOCATIONS.into()),
                DefineGroup::In,
            )
            .with_define(
                "FRAGCOLOR_LOCATION_OUT",
                DefineExpr::symbol("LAST_LOCATION_IN"),
                DefineGroup::Out,
            )
            .with_define(
                "FRAGCOLOR_LOCATION",
                DefineExpr::symbol("FRAGCOLOR_LOCATION_OUT"),
                DefineGroup::Out,
            )
            .with_sampler(SamplerBinding::new("uTexture0", TEXTURE0_BINDING))
            .with_sampler(SamplerBinding::new("uTextureNormal", TEXTURE_NORMAL_BINDING))
            .with_sampler(SamplerBinding::new("uTextureMR", TEXTURE_MR_BINDING))
            .with_sampler(SamplerBinding::new(
                "uTextureOcclusion",
                TEXTURE_OCCLUSION_BINDING,
            ))
            .with_uniform_block(
                UniformBlock::new("pbr_matrices", PBR_MATRICES_BINDING)
                    .with_layout(BlockLayout::Std140)
                    .with_instance_name("pbrdata")
                    .with_member(BlockMember::array("_PBRDATA", GlslType::Vec4, 4))
                    .with_member(BlockMember::array(
                        "uModelMatrix",
                        GlslType::Mat4,
                        MAX_MODEL_MATRICES as u32,
                    ))
                    .with_member(BlockMember::array("_LIGHT_0", GlslType::Vec4, 2))
                    .with_member(BlockMember::array("_VIEWPOS", GlslType::Vec3, 2)),
            )
            .with_input(InterfaceVariable::new("POSITION", GlslType::Vec3, POSITION_LOCATION))
            .with_input(InterfaceVariable::new("NORMAL", GlslType::Vec3, NORMAL_LOCATION))
            .with_input(InterfaceVariable::new("TANGENT", GlslType::Vec4, TANGENT_LOCATION))
            .with_input(InterfaceVariable::new(
                "BITANGENT",
                GlslType::Vec3,
                BITANGENT_LOCATION,
            ))
            .with_input(vec2("TEXCOORD_0", TEXCOORD_0_LOCATION))
            .with_input(vec2("_TEXCOORDNORMAL", TEXCOORD_NORMAL_LOCATION))
            .with_input(vec2("_TEXCOORDMR", TEXCOORD_MR_LOCATION))
            .with_input(vec2("_TEXCOORDOCCLUSION", TEXCOORD_OCCLUSION_LOCATION))
            .with_output(
                InterfaceVariable::new("vDiffuseColor", GlslType::Vec4, DIFFUSECOLOR_LOCATION)
                    .with_symbol("DIFFUSECOLOR_LOCATION"),
            )
            .with_output(vec2("vTexCoord0", TEXCOORD0_LOCATION).with_symbol("TEXCOORD0_LOCATION"))
            .with_output(vec2("vTexNormal", TEXNORMAL_LOCATION).with_symbol("TEXNORMAL_LOCATION"))
            .with_output(vec2("vTexMR", TEXMR_LOCATION).with_symbol("TEXMR_LOCATION"))
            .with_output(vec2("vTexOccl", TEXOCCL_LOCATION).with_symbol("TEXOCCL_LOCATION"))
            .with_output(
                InterfaceVariable::new("vWorldPos", GlslType::Vec4, WORLDPOS_LOCATION)
                    .with_symbol("WORLDPOS_LOCATION"),
            )
            .with_output(
                InterfaceVariable::new("light", GlslType::Struct("Light".into()), LIGHT_LOCATION)
                    .with_symbol("LIGHT_LOCATION"),
            )
            .with_output(
                InterfaceVariable::new(
                    "material",
                    GlslType::Struct("Material".into()),
                    MATERIAL_LOCATION,
                )
                .with_symbol("MATERIAL_LOCATION"),
            )
            .with_output(
                InterfaceVariable::new("mTangentLight", GlslType::Mat3, TANGENTLIGHT_LOCATION)
                    .with_symbol("TANGENTLIGHT_LOCATION"),
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
    fn test_struct_slots_match_constants() {
        assert_eq!(light_struct().location_slots().unwrap(), LIGHT_LOCATIONS);
        assert_eq!(material_struct().location_slots().unwrap(), MATERIAL_LOCATIONS);
        assert_eq!(
            GlslType::Mat3.location_slots(),
            Some(TANGENTLIGHT_LOCATIONS)
        );
    }

    #[test]
    fn test_table_matches_constants() {
        let iface = ShaderInterface::pbr();
        let expect = [
            ("LIGHT_LOCATIONS", LIGHT_LOCATIONS),
            ("MATERIAL_LOCATIONS", MATERIAL_LOCATIONS),
            ("DIFFUSECOLOR_LOCATION", DIFFUSECOLOR_LOCATION),
            ("WORLDPOS_LOCATION", WORLDPOS_LOCATION),
            ("MATERIAL_LOCATION", MATERIAL_LOCATION),
            ("TANGENTLIGHT_LOCATION", TANGENTLIGHT_LOCATION),
            ("LAST_LOCATION_IN", LAST_LOCATION_IN),
            ("FRAGCOLOR_LOCATION_OUT", FRAGCOLOR_LOCATION_OUT),
            ("FRAGCOLOR_LOCATION", FRAGCOLOR_LOCATION),
        ];
        for (name, value) in expect {
            assert_eq!(iface.define_value(name).unwrap(), value, "{name}");
        }
        assert_eq!(iface.location_of("_TEXCOORDOCCLUSION"), Some(7));
        assert_eq!(iface.binding_of("uTextureMR"), Some(TEXTURE_MR_BINDING));
    }

    #[test]
    fn test_pbr_block_layout() {
        let iface = ShaderInterface::pbr();
        let block = iface.uniform_block("pbr_matrices").unwrap();
        assert_eq!(block.layout, BlockLayout::Std140);
        assert_eq!(block.instance_name.as_deref(), Some("pbrdata"));

        let layout = block.std140().unwrap();
        let offsets: Vec<(u32, u32)> = layout.members.iter().map(|m| (m.offset, m.size)).collect();
        assert_eq!(offsets, vec![(0, 64), (64, 192), (256, 32), (288, 32)]);
        assert_eq!(layout.size, 320);
    }

    #[test]
    fn test_varyings_are_contiguous() {
        let iface = ShaderInterface::pbr();
        let mut next = DIFFUSECOLOR_LOCATION;
        for output in &iface.outputs {
            if output.name == "fragColor" {
                continue;
            }
            assert_eq!(output.location, next, "{}", output.name);
            next += iface.slots_of(&output.ty).unwrap();
        }
        assert_eq!(next, LAST_LOCATION_IN);
    }
}
