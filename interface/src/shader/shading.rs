//! Texture map selection for the PBR program.
//!
//! Each PBR program variant is compiled with a subset of the material maps.
//! The selection turns into `#define` / `#undef` lines at the top of both
//! stages and into a key for caching compiled programs.

use super::ShaderDef;
use crate::interface::pbr;

bitflags::bitflags! {
    /// Material texture maps a PBR program samples.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShadingMaps: u32 {
        const BASE_COLOR_MAP = 1 << 0;
        const NORMAL_MAP = 1 << 1;
        const METALLIC_ROUGHNESS_MAP = 1 << 2;
        const OCCLUSION_MAP = 1 << 3;
    }
}

/// Flag, preprocessor macro and sampler uniform, in declaration order.
const MAPS: [(ShadingMaps, &str, &str); 4] = [
    (ShadingMaps::BASE_COLOR_MAP, "TEXTURE", "uTexture0"),
    (ShadingMaps::NORMAL_MAP, "NORMAL_MAP", "uTextureNormal"),
    (ShadingMaps::METALLIC_ROUGHNESS_MAP, "MR_MAP", "uTextureMR"),
    (ShadingMaps::OCCLUSION_MAP, "OCCLUSION_MAP", "uTextureOcclusion"),
];

impl ShadingMaps {
    /// `#define NAME 1` for every set map and `#undef NAME` for every other.
    pub fn defines(&self) -> String {
        MAPS.iter()
            .map(|(flag, name, _)| {
                if self.contains(*flag) {
                    format!("#define {name} 1\n")
                } else {
                    format!("#undef {name}\n")
                }
            })
            .collect()
    }

    /// One boolean definition per map, for [`ShaderComposer`](super::ShaderComposer).
    pub fn shader_defs(&self) -> Vec<(&'static str, ShaderDef)> {
        MAPS.iter()
            .map(|(flag, name, _)| (*name, ShaderDef::Bool(self.contains(*flag))))
            .collect()
    }

    /// Sampler uniforms the selected maps read, with their bindings.
    pub fn samplers(&self) -> Vec<(&'static str, u32)> {
        let bindings = [
            pbr::TEXTURE0_BINDING,
            pbr::TEXTURE_NORMAL_BINDING,
            pbr::TEXTURE_MR_BINDING,
            pbr::TEXTURE_OCCLUSION_BINDING,
        ];
        MAPS.iter()
            .zip(bindings)
            .filter(|((flag, _, _), _)| self.contains(*flag))
            .map(|((_, _, sampler), binding)| (*sampler, binding))
            .collect()
    }

    /// Cache key for a compiled program variant, e.g. `pbr5`.
    pub fn program_key(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShaderInterface;

    #[test]
    fn test_defines_follow_declaration_order() {
        let maps = ShadingMaps::BASE_COLOR_MAP | ShadingMaps::METALLIC_ROUGHNESS_MAP;
        assert_eq!(
            maps.defines(),
            "#define TEXTURE 1\n#undef NORMAL_MAP\n#define MR_MAP 1\n#undef OCCLUSION_MAP\n"
        );
        assert_eq!(
            ShadingMaps::empty().defines(),
            "#undef TEXTURE\n#undef NORMAL_MAP\n#undef MR_MAP\n#undef OCCLUSION_MAP\n"
        );
    }

    #[test]
    fn test_shader_defs() {
        let defs = ShadingMaps::NORMAL_MAP.shader_defs();
        assert_eq!(defs.len(), 4);
        assert_eq!(defs[0], ("TEXTURE", ShaderDef::Bool(false)));
        assert_eq!(defs[1], ("NORMAL_MAP", ShaderDef::Bool(true)));
    }

    #[test]
    fn test_program_key() {
        let maps = ShadingMaps::BASE_COLOR_MAP | ShadingMaps::METALLIC_ROUGHNESS_MAP;
        assert_eq!(maps.program_key("pbr"), "pbr5");
        assert_eq!(ShadingMaps::all().program_key("pbr"), "pbr15");
        assert_ne!(
            ShadingMaps::NORMAL_MAP.program_key("pbr"),
            ShadingMaps::OCCLUSION_MAP.program_key("pbr")
        );
    }

    #[test]
    fn test_samplers_match_interface() {
        let iface = ShaderInterface::pbr();
        for (name, binding) in ShadingMaps::all().samplers() {
            assert_eq!(iface.binding_of(name), Some(binding), "{name}");
        }
        assert_eq!(
            ShadingMaps::OCCLUSION_MAP.samplers(),
            vec![("uTextureOcclusion", 3)]
        );
    }
}
