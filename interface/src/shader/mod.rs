//! Shader composition against the interface headers.
//!
//! [`ShaderComposer`] expands `#include` directives, inserts `#version` and
//! define lines, and runs the result through naga's GLSL frontend. The
//! generated `defines.h` of each shader family can be pre-registered with
//! [`ShaderComposer::with_interfaces`], so stage sources include them the
//! same way they include the files on disk.
//!
//! # Example
//!
//! ```ignore
//! let composer = ShaderComposer::with_interfaces();
//! let defs: Vec<_> = ShaderInterface::base()
//!     .shader_defs()?
//!     .into_iter()
//!     .map(|(name, value)| (name, ShaderDef::UInt(value)))
//!     .collect();
//! let defs: Vec<_> = defs.iter().map(|(n, d)| (n.as_str(), d.clone())).collect();
//! let wgsl = composer.compose(fragment_source, ShaderStage::Fragment, &defs)?;
//! ```

pub mod shading;

use std::collections::{HashMap, HashSet};

use crate::bindings::ShaderStageFlags;
use crate::error::{InterfaceError, Result};
use crate::header::HeaderWriter;
use crate::interface::ShaderInterface;

pub use shading::ShadingMaps;

/// Pipeline stage a source is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// Macro defined while composing for this stage.
    pub fn define_name(&self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
            Self::Compute => "COMPUTE",
        }
    }

    fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
            Self::Compute => naga::ShaderStage::Compute,
        }
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => Self::VERTEX,
            ShaderStage::Fragment => Self::FRAGMENT,
            ShaderStage::Compute => Self::COMPUTE,
        }
    }
}

/// Value of a compile-time definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderDef {
    /// Defined without a value when true, omitted when false.
    Bool(bool),
    Int(i32),
    UInt(u32),
}

impl ShaderDef {
    /// Text after the macro name, `None` when the macro is omitted.
    fn value(&self) -> Option<String> {
        match self {
            Self::Bool(true) => Some(String::new()),
            Self::Bool(false) => None,
            Self::Int(v) => Some(v.to_string()),
            Self::UInt(v) => Some(v.to_string()),
        }
    }
}

impl From<bool> for ShaderDef {
    fn from(v: bool) -> Self {
        ShaderDef::Bool(v)
    }
}

impl From<i32> for ShaderDef {
    fn from(v: i32) -> Self {
        ShaderDef::Int(v)
    }
}

impl From<u32> for ShaderDef {
    fn from(v: u32) -> Self {
        ShaderDef::UInt(v)
    }
}

/// Resolves includes and composes GLSL stage sources.
#[derive(Debug, Clone, Default)]
pub struct ShaderComposer {
    /// Include path -> source text.
    includes: HashMap<String, String>,
}

impl ShaderComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composer with `v450/defines.h` and `v450/gltf/defines.h` registered.
    pub fn with_interfaces() -> Self {
        let mut composer = Self::new();
        for iface in [ShaderInterface::base(), ShaderInterface::pbr()] {
            composer.register_interface(&iface);
        }
        composer
    }

    /// Register the generated header of `interface` under its header path.
    pub fn register_interface(&mut self, interface: &ShaderInterface) {
        let text = HeaderWriter::new(interface).write();
        self.register_include(&interface.header_path(), &text);
    }

    /// Register a source for `#include "path"`.
    pub fn register_include(&mut self, path: &str, source: &str) {
        self.includes.insert(path.to_string(), source.to_string());
    }

    pub fn has_include(&self, path: &str) -> bool {
        self.includes.contains_key(path)
    }

    /// Expand `#include` directives. Each path is included at most once.
    pub fn resolve_glsl(&self, source: &str) -> Result<String> {
        let mut included = HashSet::new();
        self.resolve_includes(source, &mut included)
    }

    /// Put `#version` first and `defines` directly after it.
    ///
    /// A source that already declares a version keeps it; otherwise
    /// `#version <version>` is prepended.
    pub fn versioned(source: &str, version: u32, defines: &str) -> String {
        let mut out = String::with_capacity(source.len() + defines.len() + 16);
        let mut lines = source.lines();

        let has_version = source
            .lines()
            .find(|l| !l.trim().is_empty())
            .is_some_and(|l| l.trim_start().starts_with("#version"));

        if has_version {
            // Keep everything up to and including the version line.
            for line in lines.by_ref() {
                out.push_str(line);
                out.push('\n');
                if line.trim_start().starts_with("#version") {
                    break;
                }
            }
        } else {
            out.push_str(&format!("#version {version}\n"));
        }

        out.push_str(defines);
        if !defines.is_empty() && !defines.ends_with('\n') {
            out.push('\n');
        }
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Stage macro plus user definitions, as `(name, value)` pairs.
    pub fn build_defines(
        stage: ShaderStage,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Vec<(String, String)> {
        let mut defines = vec![(stage.define_name().to_string(), String::new())];
        defines.extend(
            shader_defs
                .iter()
                .filter_map(|(name, def)| def.value().map(|v| (name.to_string(), v))),
        );
        defines
    }

    /// Render `(name, value)` pairs as `#define` lines.
    pub fn render_defines(defines: &[(String, String)]) -> String {
        defines
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    format!("#define {name}\n")
                } else {
                    format!("#define {name} {value}\n")
                }
            })
            .collect()
    }

    /// Compose and validate a stage, returning WGSL.
    pub fn compose(
        &self,
        source: &str,
        stage: ShaderStage,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<String> {
        let module = self.compose_to_naga(source, stage, shader_defs)?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        let info = validator.validate(&module).map_err(|e| {
            InterfaceError::ShaderCompilationFailed(format!("validation error: {e}"))
        })?;

        naga::back::wgsl::write_string(&module, &info, naga::back::wgsl::WriterFlags::empty())
            .map_err(|e| {
                InterfaceError::ShaderCompilationFailed(format!("WGSL generation error: {e}"))
            })
    }

    /// Compose a stage and return the naga module.
    pub fn compose_to_naga(
        &self,
        source: &str,
        stage: ShaderStage,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<naga::Module> {
        let resolved = self.resolve_glsl(source)?;

        let mut defines = naga::FastHashMap::default();
        for (name, value) in Self::build_defines(stage, shader_defs) {
            defines.insert(name, value);
        }
        log::debug!(
            "Composing {:?} shader with {} defines",
            stage,
            defines.len()
        );

        let options = naga::front::glsl::Options {
            stage: stage.to_naga(),
            defines,
        };
        let mut frontend = naga::front::glsl::Frontend::default();
        frontend.parse(&options, &resolved).map_err(|errors| {
            InterfaceError::ShaderCompilationFailed(format!("GLSL parse error:\n{errors}"))
        })
    }

    fn resolve_includes(&self, source: &str, included: &mut HashSet<String>) -> Result<String> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            let Some(path) = parse_include_directive(line.trim()) else {
                result.push_str(line);
                result.push('\n');
                continue;
            };
            if !included.insert(path.to_string()) {
                continue;
            }
            let include = self
                .includes
                .get(path)
                .ok_or_else(|| InterfaceError::IncludeNotFound(path.to_string()))?;
            result.push_str(&self.resolve_includes(include, included)?);
            result.push('\n');
        }

        Ok(result)
    }
}

/// Path of an `#include "path"` or `#include <path>` line.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?.trim();
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}
