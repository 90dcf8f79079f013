//! Shader interface tables.
//!
//! A [`ShaderInterface`] describes everything the stages of one shader family
//! agree on: location and binding defines, struct types used as varyings,
//! samplers, uniform blocks, and the `in` / `out` declarations. The two
//! families shipped with the engine are built by [`ShaderInterface::base`]
//! (`v450`) and [`ShaderInterface::pbr`] (`v450/gltf`).
//!
//! The tables are constants. They are generated into `defines.h` headers by
//! [`HeaderWriter`](crate::header::HeaderWriter), parsed back by
//! [`HeaderDocument`](crate::header::HeaderDocument), and checked by
//! [`ShaderInterface::validate`].

pub mod base;
pub mod pbr;

use std::collections::{BTreeMap, HashMap};

use crate::bindings::{BindingLayout, BindingLayoutEntry, BindingType, ShaderStageFlags};
use crate::error::{InterfaceError, Result};
use crate::header::{DefineExpr, DefineTable};
use crate::layout::UniformBlock;
use crate::types::{GlslType, Precision};

/// An `in` or `out` declaration with a fixed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVariable {
    pub name: String,
    pub ty: GlslType,
    pub location: u32,
    /// Define used in the location qualifier instead of the literal number.
    pub symbol: Option<String>,
}

impl InterfaceVariable {
    pub fn new(name: impl Into<String>, ty: GlslType, location: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            location,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// A `uniform sampler2D` bound to a texture unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerBinding {
    pub name: String,
    pub binding: u32,
    pub symbol: Option<String>,
    pub precision: Option<Precision>,
}

impl SamplerBinding {
    pub fn new(name: impl Into<String>, binding: u32) -> Self {
        Self {
            name: name.into(),
            binding,
            symbol: None,
            precision: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = Some(precision);
        self
    }
}

/// A struct passed between stages as a varying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub name: String,
    pub members: Vec<(GlslType, String)>,
}

impl StructType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, ty: GlslType, name: impl Into<String>) -> Self {
        self.members.push((ty, name.into()));
        self
    }

    /// Locations taken by a varying of this type: the sum of its members.
    pub fn location_slots(&self) -> Result<u32> {
        self.members.iter().try_fold(0, |acc, (ty, member)| {
            let slots = ty.location_slots().ok_or_else(|| {
                InterfaceError::UnknownType(format!("{}.{member}: {ty}", self.name))
            })?;
            Ok(acc + slots)
        })
    }
}

/// Section a define is emitted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DefineGroup {
    Uniform,
    In,
    Out,
    /// Slot counts of struct varyings.
    Struct,
}

impl DefineGroup {
    /// Comment line heading the group in a header.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Uniform => "// uniform locations",
            Self::In => "// in locations",
            Self::Out => "// out locations",
            Self::Struct => "// struct locations",
        }
    }
}

/// A `#define NAME EXPR` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub expr: DefineExpr,
    pub group: DefineGroup,
}

/// The complete interface of one shader family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInterface {
    /// Short name, e.g. `base` or `pbr`.
    pub name: String,
    /// Asset directory the header lives in, e.g. `v450/gltf`.
    pub directory: String,
    pub defines: Vec<Define>,
    pub structs: Vec<StructType>,
    pub samplers: Vec<SamplerBinding>,
    pub uniform_blocks: Vec<UniformBlock>,
    pub inputs: Vec<InterfaceVariable>,
    pub outputs: Vec<InterfaceVariable>,
}

impl ShaderInterface {
    pub fn new(name: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            defines: Vec::new(),
            structs: Vec::new(),
            samplers: Vec::new(),
            uniform_blocks: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    // ========================================================================
    // Builders
    // ========================================================================

    pub fn with_define(
        mut self,
        name: impl Into<String>,
        expr: DefineExpr,
        group: DefineGroup,
    ) -> Self {
        self.defines.push(Define {
            name: name.into(),
            expr,
            group,
        });
        self
    }

    pub fn with_struct(mut self, ty: StructType) -> Self {
        self.structs.push(ty);
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerBinding) -> Self {
        self.samplers.push(sampler);
        self
    }

    pub fn with_uniform_block(mut self, block: UniformBlock) -> Self {
        self.uniform_blocks.push(block);
        self
    }

    pub fn with_input(mut self, variable: InterfaceVariable) -> Self {
        self.inputs.push(variable);
        self
    }

    pub fn with_output(mut self, variable: InterfaceVariable) -> Self {
        self.outputs.push(variable);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Path of the generated header relative to the asset root.
    pub fn header_path(&self) -> String {
        format!("{}/defines.h", self.directory)
    }

    pub fn input(&self, name: &str) -> Option<&InterfaceVariable> {
        self.inputs.iter().find(|v| v.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&InterfaceVariable> {
        self.outputs.iter().find(|v| v.name == name)
    }

    pub fn struct_type(&self, name: &str) -> Option<&StructType> {
        self.structs.iter().find(|s| s.name == name)
    }

    pub fn sampler(&self, name: &str) -> Option<&SamplerBinding> {
        self.samplers.iter().find(|s| s.name == name)
    }

    pub fn uniform_block(&self, name: &str) -> Option<&UniformBlock> {
        self.uniform_blocks.iter().find(|b| b.name == name)
    }

    pub fn define(&self, name: &str) -> Option<&Define> {
        self.defines.iter().find(|d| d.name == name)
    }

    /// Location of an input or output. Inputs are searched first.
    pub fn location_of(&self, name: &str) -> Option<u32> {
        self.input(name)
            .or_else(|| self.output(name))
            .map(|v| v.location)
    }

    /// Binding of a sampler or uniform block.
    pub fn binding_of(&self, name: &str) -> Option<u32> {
        self.sampler(name)
            .map(|s| s.binding)
            .or_else(|| self.uniform_block(name).map(|b| b.binding))
    }

    /// Number of consecutive locations a value of `ty` occupies.
    pub fn slots_of(&self, ty: &GlslType) -> Result<u32> {
        match ty {
            GlslType::Struct(name) => self
                .struct_type(name)
                .ok_or_else(|| InterfaceError::UnknownType(name.clone()))?
                .location_slots(),
            builtin => builtin
                .location_slots()
                .ok_or_else(|| InterfaceError::UnknownType(builtin.to_string())),
        }
    }

    /// All defines as an evaluable table.
    pub fn define_table(&self) -> DefineTable {
        let mut table = DefineTable::new();
        for define in &self.defines {
            table.insert(define.name.clone(), define.expr.clone());
        }
        table
    }

    /// Evaluate a define to a location or binding number.
    pub fn define_value(&self, name: &str) -> Result<u32> {
        let value = self.define_table().evaluate(name)?;
        to_location(name, value)
    }

    /// Every define with its value, in declaration order.
    pub fn shader_defs(&self) -> Result<Vec<(String, u32)>> {
        let table = self.define_table();
        self.defines
            .iter()
            .map(|d| {
                let value = to_location(&d.name, table.evaluate(&d.name)?)?;
                Ok((d.name.clone(), value))
            })
            .collect()
    }

    /// Start locations of all inputs and outputs.
    ///
    /// Inputs and outputs are separate namespaces; where both use the same
    /// location the input is listed.
    pub fn location_map(&self) -> BTreeMap<u32, String> {
        let mut map = BTreeMap::new();
        for variable in self.inputs.iter().chain(&self.outputs) {
            map.entry(variable.location)
                .or_insert_with(|| variable.name.clone());
        }
        map
    }

    /// Descriptor bindings for the samplers and uniform blocks.
    pub fn binding_layout(&self) -> BindingLayout {
        let mut layout = BindingLayout::new().with_label(self.name.clone());
        for block in &self.uniform_blocks {
            layout = layout.with_entry(
                BindingLayoutEntry::new(block.binding, BindingType::UniformBuffer)
                    .with_visibility(ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT)
                    .with_label(block.name.clone()),
            );
        }
        for sampler in &self.samplers {
            layout = layout.with_entry(
                BindingLayoutEntry::new(sampler.binding, BindingType::CombinedTextureSampler)
                    .with_visibility(ShaderStageFlags::FRAGMENT)
                    .with_label(sampler.name.clone()),
            );
        }
        layout
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the table for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let values = self.evaluate_defines()?;
        self.check_symbols(&values)?;
        self.check_types()?;
        self.check_locations(&self.inputs)?;
        self.check_locations(&self.outputs)?;
        self.check_bindings()?;
        for block in &self.uniform_blocks {
            block.std140()?;
        }
        log::debug!(
            "Shader interface '{}' valid: {} inputs, {} outputs, {} defines",
            self.name,
            self.inputs.len(),
            self.outputs.len(),
            self.defines.len()
        );
        Ok(())
    }

    fn evaluate_defines(&self) -> Result<BTreeMap<String, i64>> {
        let values = self.define_table().evaluate_all()?;
        for (name, value) in &values {
            to_location(name, *value)?;
        }
        Ok(values)
    }

    fn check_symbols(&self, values: &BTreeMap<String, i64>) -> Result<()> {
        let variables = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .map(|v| (v.symbol.as_deref(), v.location));
        let samplers = self.samplers.iter().map(|s| (s.symbol.as_deref(), s.binding));
        let blocks = self
            .uniform_blocks
            .iter()
            .map(|b| (b.binding_symbol.as_deref(), b.binding));

        for (symbol, stored) in variables.chain(samplers).chain(blocks) {
            let Some(symbol) = symbol else { continue };
            let found = *values
                .get(symbol)
                .ok_or_else(|| InterfaceError::UnknownSymbol(symbol.to_string()))?;
            if found != i64::from(stored) {
                return Err(InterfaceError::SymbolMismatch {
                    name: symbol.to_string(),
                    expected: i64::from(stored),
                    found,
                });
            }
        }
        Ok(())
    }

    fn check_types(&self) -> Result<()> {
        for variable in self.inputs.iter().chain(&self.outputs) {
            if let GlslType::Struct(name) = &variable.ty {
                if self.struct_type(name).is_none() {
                    return Err(InterfaceError::UnknownType(name.clone()));
                }
            }
        }
        Ok(())
    }

    fn check_locations(&self, variables: &[InterfaceVariable]) -> Result<()> {
        let mut placed: Vec<(&str, u32, u32)> = Vec::with_capacity(variables.len());
        for variable in variables {
            let start = variable.location;
            let slots = self.slots_of(&variable.ty)?;
            let end = start
                .checked_add(slots)
                .ok_or_else(|| InterfaceError::LocationOutOfRange {
                    name: variable.name.clone(),
                    location: start,
                    slots,
                })?;
            for &(other, other_start, other_end) in &placed {
                if other_start == start {
                    return Err(InterfaceError::DuplicateLocation {
                        location: start,
                        first: other.to_string(),
                        second: variable.name.clone(),
                    });
                }
                if start < other_end && other_start < end {
                    return Err(InterfaceError::LocationOverlap {
                        first: other.to_string(),
                        first_range: (other_start, other_end),
                        second: variable.name.clone(),
                        second_range: (start, end),
                    });
                }
            }
            placed.push((variable.name.as_str(), start, end));
        }
        Ok(())
    }

    fn check_bindings(&self) -> Result<()> {
        let mut seen: HashMap<u32, &str> = HashMap::new();
        let samplers = self.samplers.iter().map(|s| (s.binding, s.name.as_str()));
        let blocks = self
            .uniform_blocks
            .iter()
            .map(|b| (b.binding, b.name.as_str()));
        for (binding, name) in samplers.chain(blocks) {
            if let Some(first) = seen.insert(binding, name) {
                return Err(InterfaceError::DuplicateBinding {
                    binding,
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn to_location(name: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| InterfaceError::NegativeLocation {
        name: name.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BlockLayout, BlockMember};

    #[test]
    fn test_base_and_pbr_validate() {
        ShaderInterface::base().validate().unwrap();
        ShaderInterface::pbr().validate().unwrap();
    }

    #[test]
    fn test_header_paths() {
        assert_eq!(ShaderInterface::base().header_path(), "v450/defines.h");
        assert_eq!(ShaderInterface::pbr().header_path(), "v450/gltf/defines.h");
    }

    #[test]
    fn test_pbr_derived_locations() {
        let pbr = ShaderInterface::pbr();
        assert_eq!(pbr.define_value("LIGHT_LOCATIONS").unwrap(), 3);
        assert_eq!(pbr.define_value("MATERIAL_LOCATIONS").unwrap(), 7);
        assert_eq!(pbr.define_value("MATERIAL_LOCATION").unwrap(), 17);
        assert_eq!(pbr.define_value("TANGENTLIGHT_LOCATION").unwrap(), 24);
        assert_eq!(pbr.define_value("LAST_LOCATION_IN").unwrap(), 27);
        assert_eq!(pbr.define_value("FRAGCOLOR_LOCATION").unwrap(), 27);
        assert_eq!(pbr.location_of("fragColor"), Some(27));
        assert_eq!(pbr.location_of("material"), Some(17));
    }

    #[test]
    fn test_queries() {
        let base = ShaderInterface::base();
        assert_eq!(base.location_of("aColor"), Some(2));
        assert_eq!(base.location_of("vTexCoord"), Some(4));
        assert_eq!(base.location_of("missing"), None);
        assert_eq!(base.binding_of("uTexture"), Some(1));
        assert_eq!(base.binding_of("uniform_matrices"), Some(0));

        let pbr = ShaderInterface::pbr();
        assert_eq!(pbr.binding_of("uTextureOcclusion"), Some(3));
        assert_eq!(pbr.binding_of("pbr_matrices"), Some(4));
        assert_eq!(pbr.input("TANGENT").unwrap().ty, GlslType::Vec4);
        assert_eq!(pbr.slots_of(&GlslType::Struct("Light".into())).unwrap(), 3);
        assert_eq!(pbr.slots_of(&GlslType::Mat3).unwrap(), 3);
        assert!(pbr.slots_of(&GlslType::Struct("Fog".into())).is_err());
    }

    #[test]
    fn test_shader_defs_in_declaration_order() {
        let defs = ShaderInterface::base().shader_defs().unwrap();
        assert_eq!(defs[0], ("MATRIX_LOCATION_UNIFORM".to_string(), 0));
        assert_eq!(defs.len(), 8);
        assert_eq!(defs[7], ("FRAGCOLOR_LOCATION_OUT".to_string(), 5));
    }

    #[test]
    fn test_location_map() {
        let map = ShaderInterface::pbr().location_map();
        assert_eq!(map.get(&0).map(String::as_str), Some("POSITION"));
        assert_eq!(map.get(&24).map(String::as_str), Some("mTangentLight"));
        assert_eq!(map.get(&27).map(String::as_str), Some("fragColor"));
        assert_eq!(map.len(), 18);
    }

    #[test]
    fn test_duplicate_input_location() {
        let iface = ShaderInterface::base()
            .with_input(InterfaceVariable::new("aExtra", GlslType::Vec2, 1));
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::DuplicateLocation {
                location: 1,
                first: "aVertex".to_string(),
                second: "aExtra".to_string(),
            })
        );
    }

    #[test]
    fn test_inputs_and_outputs_are_separate_namespaces() {
        let iface = ShaderInterface::base()
            .with_output(InterfaceVariable::new("vNormal", GlslType::Vec3, 0));
        iface.validate().unwrap();
    }

    #[test]
    fn test_struct_range_overlap() {
        // `material` spans 17..24; a varying at 20 lands inside it.
        let iface = ShaderInterface::pbr()
            .with_output(InterfaceVariable::new("vFog", GlslType::Float, 20));
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::LocationOverlap {
                first: "material".to_string(),
                first_range: (17, 24),
                second: "vFog".to_string(),
                second_range: (20, 21),
            })
        );
    }

    #[test]
    fn test_location_range_past_u32_is_rejected() {
        let iface = ShaderInterface::base()
            .with_input(InterfaceVariable::new("aBig", GlslType::Mat4, u32::MAX));
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::LocationOutOfRange {
                name: "aBig".to_string(),
                location: u32::MAX,
                slots: 4,
            })
        );
    }

    #[test]
    fn test_duplicate_binding() {
        let iface = ShaderInterface::pbr().with_sampler(SamplerBinding::new("uTextureEmissive", 4));
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::DuplicateBinding {
                binding: 4,
                first: "uTextureEmissive".to_string(),
                second: "pbr_matrices".to_string(),
            })
        );
    }

    #[test]
    fn test_symbol_mismatch() {
        let mut iface = ShaderInterface::base();
        iface.inputs[2].location = 7;
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::SymbolMismatch {
                name: "COLOR_LOCATION_IN".to_string(),
                expected: 7,
                found: 2,
            })
        );
    }

    #[test]
    fn test_negative_define() {
        let iface = ShaderInterface::new("broken", "tmp").with_define(
            "BROKEN_LOCATION",
            DefineExpr::parse("1 - 2").unwrap(),
            DefineGroup::In,
        );
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::NegativeLocation {
                name: "BROKEN_LOCATION".to_string(),
                value: -1,
            })
        );
    }

    #[test]
    fn test_unknown_struct_type() {
        let iface = ShaderInterface::new("broken", "tmp").with_output(InterfaceVariable::new(
            "fog",
            GlslType::Struct("Fog".into()),
            0,
        ));
        assert_eq!(
            iface.validate(),
            Err(InterfaceError::UnknownType("Fog".to_string()))
        );
    }

    #[test]
    fn test_unsupported_block_member() {
        let iface = ShaderInterface::new("broken", "tmp").with_uniform_block(
            UniformBlock::new("textures", 0)
                .with_layout(BlockLayout::Std140)
                .with_member(BlockMember::new("uTexture", GlslType::Sampler2D)),
        );
        assert!(matches!(
            iface.validate(),
            Err(InterfaceError::UnsupportedBlockMember { .. })
        ));
    }

    #[test]
    fn test_binding_layout() {
        let layout = ShaderInterface::pbr().binding_layout();
        assert_eq!(layout.entries.len(), 5);
        let block = layout.entry(4).unwrap();
        assert_eq!(block.binding_type, BindingType::UniformBuffer);
        assert!(block.visibility.contains(ShaderStageFlags::VERTEX));
        assert_eq!(block.label.as_deref(), Some("pbr_matrices"));

        let normal = layout.entry(1).unwrap();
        assert_eq!(normal.binding_type, BindingType::CombinedTextureSampler);
        assert_eq!(normal.visibility, ShaderStageFlags::FRAGMENT);
        layout.validate().unwrap();
    }
}
