//! Uniform block declarations and std140 packing.
//!
//! The host writes uniform data as raw bytes, so the offsets computed here
//! must agree exactly with what the driver derives from the block declaration.
//! Any disagreement shows up as garbage uniforms, never as an error.
//!
//! # std140 rules covered
//!
//! | Type | Base alignment | Size |
//! |------|----------------|------|
//! | `float` | 4 | 4 |
//! | `vec2` | 8 | 8 |
//! | `vec3` | 16 | 12 |
//! | `vec4` | 16 | 16 |
//! | `matN` | 16 | N columns of stride 16 |
//!
//! Arrays round their element stride up to 16. The block size is rounded up
//! to 16 as well.

use crate::error::{InterfaceError, Result};
use crate::types::GlslType;

/// Alignment of arrays, matrix columns and the block itself.
const VEC4_ALIGN: u32 = 16;

/// Memory layout qualifier of a uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockLayout {
    /// `layout(std140)`.
    Std140,
    /// No layout qualifier. The blocks in this crate only use members whose
    /// shared layout matches std140, so offsets are computed the same way.
    #[default]
    Shared,
}

/// A single member of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockMember {
    pub name: String,
    pub ty: GlslType,
    /// Declared array length, `None` for plain members.
    pub array_len: Option<u32>,
}

impl BlockMember {
    pub fn new(name: impl Into<String>, ty: GlslType) -> Self {
        Self {
            name: name.into(),
            ty,
            array_len: None,
        }
    }

    pub fn array(name: impl Into<String>, ty: GlslType, len: u32) -> Self {
        Self {
            name: name.into(),
            ty,
            array_len: Some(len),
        }
    }

    /// Number of elements, 1 for non-arrays.
    pub fn element_count(&self) -> u32 {
        self.array_len.unwrap_or(1)
    }
}

/// A `uniform` block bound to a fixed binding index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    /// Block name, e.g. `pbr_matrices`.
    pub name: String,
    /// Optional instance name following the closing brace.
    pub instance_name: Option<String>,
    pub binding: u32,
    /// Define used in the binding qualifier instead of the literal number.
    pub binding_symbol: Option<String>,
    pub layout: BlockLayout,
    pub members: Vec<BlockMember>,
}

impl UniformBlock {
    pub fn new(name: impl Into<String>, binding: u32) -> Self {
        Self {
            name: name.into(),
            instance_name: None,
            binding,
            binding_symbol: None,
            layout: BlockLayout::Shared,
            members: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: BlockMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_instance_name(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    pub fn with_binding_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.binding_symbol = Some(symbol.into());
        self
    }

    pub fn with_layout(mut self, layout: BlockLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Compute the byte layout of this block.
    pub fn std140(&self) -> Result<Std140Layout> {
        Std140Layout::compute(&self.members).map_err(|err| match err {
            InterfaceError::UnsupportedBlockMember { member, .. } => {
                InterfaceError::UnsupportedBlockMember {
                    block: self.name.clone(),
                    member,
                }
            }
            other => other,
        })
    }
}

/// Placement of one member within a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOffset {
    pub name: String,
    /// Byte offset from the start of the block.
    pub offset: u32,
    /// Bytes occupied, including array and column padding.
    pub size: u32,
    /// Distance between array elements, `None` for plain members.
    pub array_stride: Option<u32>,
}

/// Computed std140 layout of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Std140Layout {
    pub members: Vec<MemberOffset>,
    /// Total block size in bytes.
    pub size: u32,
}

impl Std140Layout {
    /// Lay out `members` in declaration order.
    pub fn compute(members: &[BlockMember]) -> Result<Self> {
        let mut offset = 0u32;
        let mut placed = Vec::with_capacity(members.len());

        for member in members {
            let unsupported = || InterfaceError::UnsupportedBlockMember {
                block: String::new(),
                member: member.name.clone(),
            };
            let (align, size) = base_alignment_and_size(&member.ty).ok_or_else(unsupported)?;

            let (align, total, stride) = match member.array_len {
                Some(len) => {
                    let stride = round_up(size, VEC4_ALIGN).ok_or_else(unsupported)?;
                    let total = stride.checked_mul(len).ok_or_else(unsupported)?;
                    (VEC4_ALIGN, total, Some(stride))
                }
                None => (align, size, None),
            };

            offset = round_up(offset, align).ok_or_else(unsupported)?;
            placed.push(MemberOffset {
                name: member.name.clone(),
                offset,
                size: total,
                array_stride: stride,
            });
            offset = offset.checked_add(total).ok_or_else(unsupported)?;
        }

        let size = round_up(offset, VEC4_ALIGN).ok_or_else(|| {
            InterfaceError::UnsupportedBlockMember {
                block: String::new(),
                member: placed.last().map(|m| m.name.clone()).unwrap_or_default(),
            }
        })?;
        Ok(Self {
            members: placed,
            size,
        })
    }

    /// Look up a member's placement by name.
    pub fn member(&self, name: &str) -> Option<&MemberOffset> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Base alignment and unpadded size for a non-array member.
fn base_alignment_and_size(ty: &GlslType) -> Option<(u32, u32)> {
    match ty {
        GlslType::Float => Some((4, 4)),
        GlslType::Vec2 => Some((8, 8)),
        GlslType::Vec3 => Some((16, 12)),
        GlslType::Vec4 => Some((16, 16)),
        GlslType::Mat2 => Some((VEC4_ALIGN, 2 * VEC4_ALIGN)),
        GlslType::Mat3 => Some((VEC4_ALIGN, 3 * VEC4_ALIGN)),
        GlslType::Mat4 => Some((VEC4_ALIGN, 4 * VEC4_ALIGN)),
        GlslType::Sampler2D | GlslType::Struct(_) => None,
    }
}

/// `None` when the rounded value does not fit in `u32`.
fn round_up(value: u32, align: u32) -> Option<u32> {
    value.div_ceil(align).checked_mul(align)
}
