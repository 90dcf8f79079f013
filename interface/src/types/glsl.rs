//! GLSL types and their sizes.

use std::fmt;

use crate::error::{InterfaceError, Result};

/// GL type enums as returned by `glGetActiveAttrib` / `glGetActiveUniform`.
pub mod gl {
    pub const FLOAT: u32 = 0x1406;
    pub const FLOAT_VEC2: u32 = 0x8B50;
    pub const FLOAT_VEC3: u32 = 0x8B51;
    pub const FLOAT_VEC4: u32 = 0x8B52;
    pub const FLOAT_MAT2: u32 = 0x8B5A;
    pub const FLOAT_MAT3: u32 = 0x8B5B;
    pub const FLOAT_MAT4: u32 = 0x8B5C;
    pub const SAMPLER_2D: u32 = 0x8B5E;
}

/// A GLSL type that can appear in a shader interface declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    /// A user struct, resolved through the owning interface's struct table.
    Struct(String),
}

impl GlslType {
    /// The GLSL spelling of this type.
    pub fn glsl_name(&self) -> &str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Sampler2D => "sampler2D",
            Self::Struct(name) => name,
        }
    }

    /// Parse a GLSL type name. Any name that is not a builtin is taken as a struct.
    pub fn parse(name: &str) -> Self {
        match name {
            "float" => Self::Float,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "mat2" => Self::Mat2,
            "mat3" => Self::Mat3,
            "mat4" => Self::Mat4,
            "sampler2D" => Self::Sampler2D,
            other => Self::Struct(other.to_string()),
        }
    }

    /// Map a GL type enum to a type.
    pub fn from_gl_enum(value: u32) -> Option<Self> {
        match value {
            gl::FLOAT => Some(Self::Float),
            gl::FLOAT_VEC2 => Some(Self::Vec2),
            gl::FLOAT_VEC3 => Some(Self::Vec3),
            gl::FLOAT_VEC4 => Some(Self::Vec4),
            gl::FLOAT_MAT2 => Some(Self::Mat2),
            gl::FLOAT_MAT3 => Some(Self::Mat3),
            gl::FLOAT_MAT4 => Some(Self::Mat4),
            gl::SAMPLER_2D => Some(Self::Sampler2D),
            _ => None,
        }
    }

    /// The GL type enum for this type, `None` for structs.
    pub fn gl_enum(&self) -> Option<u32> {
        match self {
            Self::Float => Some(gl::FLOAT),
            Self::Vec2 => Some(gl::FLOAT_VEC2),
            Self::Vec3 => Some(gl::FLOAT_VEC3),
            Self::Vec4 => Some(gl::FLOAT_VEC4),
            Self::Mat2 => Some(gl::FLOAT_MAT2),
            Self::Mat3 => Some(gl::FLOAT_MAT3),
            Self::Mat4 => Some(gl::FLOAT_MAT4),
            Self::Sampler2D => Some(gl::SAMPLER_2D),
            Self::Struct(_) => None,
        }
    }

    /// Number of floats a client-side copy of this variable needs.
    ///
    /// `array_size` is 1 for non-array variables. Samplers take one value
    /// (the texture unit).
    pub fn size_in_floats(&self, array_size: u32) -> Result<u32> {
        let per_element = match self {
            Self::Float | Self::Sampler2D => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
            Self::Struct(name) => return Err(InterfaceError::UnknownType(name.clone())),
        };
        Ok(per_element * array_size)
    }

    /// Components per attribute element, i.e. the `size` argument of
    /// `glVertexAttribPointer`. Matrices report their column height.
    pub fn component_count(&self) -> Option<u32> {
        match self {
            Self::Float => Some(1),
            Self::Vec2 | Self::Mat2 => Some(2),
            Self::Vec3 | Self::Mat3 => Some(3),
            Self::Vec4 | Self::Mat4 => Some(4),
            Self::Sampler2D | Self::Struct(_) => None,
        }
    }

    /// Number of consecutive locations a builtin type occupies.
    ///
    /// Structs return `None`; their slot count depends on the member list.
    pub fn location_slots(&self) -> Option<u32> {
        match self {
            Self::Float | Self::Vec2 | Self::Vec3 | Self::Vec4 | Self::Sampler2D => Some(1),
            Self::Mat2 => Some(2),
            Self::Mat3 => Some(3),
            Self::Mat4 => Some(4),
            Self::Struct(_) => None,
        }
    }

    /// Returns true for sampler types.
    pub fn is_sampler(&self) -> bool {
        matches!(self, Self::Sampler2D)
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// GLSL precision qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Lowp,
    Mediump,
    Highp,
}

impl Precision {
    pub fn glsl_name(&self) -> &'static str {
        match self {
            Self::Lowp => "lowp",
            Self::Mediump => "mediump",
            Self::Highp => "highp",
        }
    }

    pub fn parse(word: &str) -> Option<Self> {
        match word {
            "lowp" => Some(Self::Lowp),
            "mediump" => Some(Self::Mediump),
            "highp" => Some(Self::Highp),
            _ => None,
        }
    }
}
