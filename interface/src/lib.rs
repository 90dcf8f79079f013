//! # Prism Interface
//!
//! Binding and location tables shared by the vertex and fragment stages of
//! the Prism GLSL shader families.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`ShaderInterface`] - The `v450` and `v450/gltf` tables, with validation
//! - [`header`] - `defines.h` generation, parsing and verification
//! - [`blocks`] - `bytemuck` mirrors of the uniform blocks
//! - [`layout`] - std140 offsets for uniform block declarations
//! - [`shader`] - Include resolution and naga-backed composition
//!
//! ## Example
//!
//! ```ignore
//! use prism_interface::{HeaderWriter, ShaderInterface};
//!
//! let pbr = ShaderInterface::pbr();
//! pbr.validate()?;
//! std::fs::write(pbr.header_path(), HeaderWriter::new(&pbr).write())?;
//! ```

pub mod bindings;
pub mod blocks;
pub mod error;
pub mod header;
pub mod interface;
pub mod layout;
pub mod lighting;
pub mod shader;
pub mod types;
pub mod vertex;

pub use bindings::{BindingLayout, BindingLayoutEntry, BindingType, ShaderStageFlags};
pub use blocks::{PbrMatrices, Std140Vec3, UniformMatrices, MAX_MODEL_MATRICES};
pub use error::{InterfaceError, Result};
pub use header::{
    verify_header, DefineExpr, DefineTable, HeaderConfig, HeaderDocument, HeaderWriter,
};
pub use interface::{
    Define, DefineGroup, InterfaceVariable, SamplerBinding, ShaderInterface, StructType,
};
pub use layout::{BlockLayout, BlockMember, Std140Layout, UniformBlock};
pub use lighting::{DirectionalLight, PbrMaterial};
pub use shader::{ShaderComposer, ShaderDef, ShaderStage, ShadingMaps};
pub use types::{GlslType, Precision};
pub use vertex::{
    VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexBufferLayout,
    VertexLayout, VertexStepMode,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Every shader family shipped with the engine.
pub fn all_interfaces() -> Vec<ShaderInterface> {
    vec![ShaderInterface::base(), ShaderInterface::pbr()]
}

/// Log the crate version and the registered shader families.
pub fn init() {
    log::info!(
        "Prism interface v{} initialized ({} shader families)",
        VERSION,
        all_interfaces().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_all_interfaces_validate() {
        let names: Vec<String> = all_interfaces()
            .into_iter()
            .map(|iface| {
                iface.validate().unwrap();
                iface.name
            })
            .collect();
        assert_eq!(names, vec!["base", "pbr"]);
    }
}
