//! GLSL value types used by shader interface declarations.
//!
//! This module contains the type enum shared by attributes, varyings,
//! samplers and uniform block members, along with the GL type enums
//! reported by program introspection.

mod glsl;

pub use glsl::{gl, GlslType, Precision};
