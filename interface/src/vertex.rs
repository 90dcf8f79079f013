//! Vertex buffer layouts that feed the interface inputs.
//!
//! A [`VertexLayout`] describes how vertex data is laid out across one or
//! more buffers, and which shader input location each attribute is bound to.
//! [`VertexLayout::interleaved`] derives a single-buffer layout straight from
//! a [`ShaderInterface`]; [`VertexLayout::validate_against`] checks a
//! hand-built layout against one.
//!
//! # Example
//!
//! ```ignore
//! // Position in one buffer, texcoords in another:
//! let layout = VertexLayout::new()
//!     .with_buffer(VertexBufferLayout::new(12))
//!     .with_buffer(VertexBufferLayout::new(8))
//!     .with_attribute(VertexAttribute::new(
//!         VertexAttributeSemantic::Position,
//!         VertexAttributeFormat::Float3,
//!         0,
//!         pbr::POSITION_LOCATION,
//!     ))
//!     .with_attribute(
//!         VertexAttribute::new(
//!             VertexAttributeSemantic::TexCoord0,
//!             VertexAttributeFormat::Float2,
//!             0,
//!             pbr::TEXCOORD_0_LOCATION,
//!         )
//!         .at_buffer(1),
//!     );
//! layout.validate_against(&ShaderInterface::pbr())?;
//! ```

use crate::error::{InterfaceError, Result};
use crate::interface::ShaderInterface;
use crate::types::GlslType;

/// Meaning of a vertex attribute, named after the shader input it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    /// Per-vertex translation of the base pipeline.
    Translate,
    /// Position of the base pipeline.
    Vertex,
    Color,
    Position,
    Normal,
    /// Tangent with handedness in w.
    Tangent,
    Bitangent,
    TexCoord0,
    /// Texture coordinates for the normal map.
    TexCoordNormal,
    /// Texture coordinates for the metallic-roughness map.
    TexCoordMr,
    /// Texture coordinates for the occlusion map.
    TexCoordOcclusion,
}

impl VertexAttributeSemantic {
    pub const ALL: [Self; 11] = [
        Self::Translate,
        Self::Vertex,
        Self::Color,
        Self::Position,
        Self::Normal,
        Self::Tangent,
        Self::Bitangent,
        Self::TexCoord0,
        Self::TexCoordNormal,
        Self::TexCoordMr,
        Self::TexCoordOcclusion,
    ];

    /// Name of the matching `in` variable.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Self::Translate => "aTranslate",
            Self::Vertex => "aVertex",
            Self::Color => "aColor",
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Tangent => "TANGENT",
            Self::Bitangent => "BITANGENT",
            Self::TexCoord0 => "TEXCOORD_0",
            Self::TexCoordNormal => "_TEXCOORDNORMAL",
            Self::TexCoordMr => "_TEXCOORDMR",
            Self::TexCoordOcclusion => "_TEXCOORDOCCLUSION",
        }
    }

    pub fn from_attribute_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.attribute_name() == name)
    }

    /// Unique index of this semantic.
    pub fn index(&self) -> u32 {
        match self {
            Self::Translate => 0,
            Self::Vertex => 1,
            Self::Color => 2,
            Self::Position => 3,
            Self::Normal => 4,
            Self::Tangent => 5,
            Self::Bitangent => 6,
            Self::TexCoord0 => 7,
            Self::TexCoordNormal => 8,
            Self::TexCoordMr => 9,
            Self::TexCoordOcclusion => 10,
        }
    }
}

/// Data format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    Float,
    Float2,
    Float3,
    Float4,
}

impl VertexAttributeFormat {
    /// Size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Float => 4,
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
        }
    }

    /// Format that feeds an input of the given GLSL type.
    pub fn from_glsl(ty: &GlslType) -> Option<Self> {
        match ty {
            GlslType::Float => Some(Self::Float),
            GlslType::Vec2 => Some(Self::Float2),
            GlslType::Vec3 => Some(Self::Float3),
            GlslType::Vec4 => Some(Self::Float4),
            _ => None,
        }
    }

    pub fn glsl_type(&self) -> GlslType {
        match self {
            Self::Float => GlslType::Float,
            Self::Float2 => GlslType::Vec2,
            Self::Float3 => GlslType::Vec3,
            Self::Float4 => GlslType::Vec4,
        }
    }
}

/// How a vertex buffer advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    #[default]
    Vertex,
    Instance,
}

/// One vertex buffer binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    pub stride: u32,
    pub step_mode: VertexStepMode,
}

impl VertexBufferLayout {
    pub fn new(stride: u32) -> Self {
        Self {
            stride,
            step_mode: VertexStepMode::Vertex,
        }
    }

    pub fn per_instance(stride: u32) -> Self {
        Self {
            stride,
            step_mode: VertexStepMode::Instance,
        }
    }
}

/// A single vertex attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub semantic: VertexAttributeSemantic,
    pub format: VertexAttributeFormat,
    /// Byte offset within the vertex buffer.
    pub offset: u32,
    /// Index of the vertex buffer this attribute reads from.
    pub buffer_index: u32,
    /// `layout(location = N)` of the shader input.
    pub shader_location: u32,
}

impl VertexAttribute {
    /// Attribute read from buffer 0.
    pub fn new(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        offset: u32,
        shader_location: u32,
    ) -> Self {
        Self {
            semantic,
            format,
            offset,
            buffer_index: 0,
            shader_location,
        }
    }

    pub fn at_buffer(mut self, buffer_index: u32) -> Self {
        self.buffer_index = buffer_index;
        self
    }
}

/// Vertex data layout across one or more buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    pub buffers: Vec<VertexBufferLayout>,
    pub attributes: Vec<VertexAttribute>,
    pub label: Option<String>,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(mut self, buffer: VertexBufferLayout) -> Self {
        self.buffers.push(buffer);
        self
    }

    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Pack every input of `interface` into buffer 0, in declaration order.
    pub fn interleaved(interface: &ShaderInterface) -> Result<Self> {
        let mut attributes = Vec::with_capacity(interface.inputs.len());
        let mut offset = 0;
        for input in &interface.inputs {
            let semantic = VertexAttributeSemantic::from_attribute_name(&input.name).ok_or_else(
                || InterfaceError::AttributeMismatch {
                    attribute: input.name.clone(),
                    message: "no vertex semantic for this input".to_string(),
                },
            )?;
            let format = VertexAttributeFormat::from_glsl(&input.ty).ok_or_else(|| {
                InterfaceError::AttributeMismatch {
                    attribute: input.name.clone(),
                    message: format!("type {} cannot be a vertex attribute", input.ty),
                }
            })?;
            attributes.push(VertexAttribute::new(semantic, format, offset, input.location));
            offset += format.size();
        }

        Ok(Self {
            buffers: vec![VertexBufferLayout::new(offset)],
            attributes,
            label: Some(interface.name.clone()),
        })
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Stride of a buffer, 0 if it does not exist.
    pub fn buffer_stride(&self, buffer_index: usize) -> u32 {
        self.buffers
            .get(buffer_index)
            .map(|b| b.stride)
            .unwrap_or(0)
    }

    pub fn has_semantic(&self, semantic: VertexAttributeSemantic) -> bool {
        self.attributes.iter().any(|attr| attr.semantic == semantic)
    }

    pub fn get_attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|attr| attr.semantic == semantic)
    }

    pub fn attributes_for_buffer(
        &self,
        buffer_index: u32,
    ) -> impl Iterator<Item = &VertexAttribute> {
        self.attributes
            .iter()
            .filter(move |attr| attr.buffer_index == buffer_index)
    }

    /// True if `other` provides every semantic of this layout in the same
    /// format. Buffer placement may differ.
    pub fn is_compatible_with(&self, other: &VertexLayout) -> bool {
        self.attributes.iter().all(|attr| {
            other
                .attributes
                .iter()
                .any(|o| o.semantic == attr.semantic && o.format == attr.format)
        })
    }

    /// Check that every attribute reads from a declared buffer.
    pub fn validate(&self) -> Result<()> {
        for attr in &self.attributes {
            if attr.buffer_index as usize >= self.buffers.len() {
                return Err(InterfaceError::AttributeMismatch {
                    attribute: attr.semantic.attribute_name().to_string(),
                    message: format!(
                        "references buffer {} but only {} buffers are defined",
                        attr.buffer_index,
                        self.buffers.len()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Check that every attribute lands on the input of `interface` its
    /// semantic names, with a matching type.
    pub fn validate_against(&self, interface: &ShaderInterface) -> Result<()> {
        self.validate()?;
        for attr in &self.attributes {
            let name = attr.semantic.attribute_name();
            let input = interface
                .inputs
                .iter()
                .find(|i| i.location == attr.shader_location)
                .ok_or_else(|| InterfaceError::AttributeMismatch {
                    attribute: name.to_string(),
                    message: format!(
                        "no input at location {} in '{}'",
                        attr.shader_location, interface.name
                    ),
                })?;
            if input.name != name {
                return Err(InterfaceError::AttributeMismatch {
                    attribute: name.to_string(),
                    message: format!(
                        "location {} holds `{}` in '{}'",
                        attr.shader_location, input.name, interface.name
                    ),
                });
            }
            if VertexAttributeFormat::from_glsl(&input.ty) != Some(attr.format) {
                return Err(InterfaceError::AttributeMismatch {
                    attribute: name.to_string(),
                    message: format!(
                        "format {:?} does not match `{} {}`",
                        attr.format, input.ty, input.name
                    ),
                });
            }
        }
        Ok(())
    }
}
