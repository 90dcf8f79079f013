//! Header text generation.

use std::fmt::Write as _;

use super::HeaderConfig;
use crate::interface::{DefineGroup, InterfaceVariable, ShaderInterface};
use crate::layout::{BlockLayout, UniformBlock};

/// Order in which define groups are emitted. Struct slot counts come first
/// so that the location chains read top to bottom.
const GROUP_ORDER: [DefineGroup; 4] = [
    DefineGroup::Struct,
    DefineGroup::Uniform,
    DefineGroup::In,
    DefineGroup::Out,
];

/// Renders a [`ShaderInterface`] as GLSL header text.
pub struct HeaderWriter<'a> {
    interface: &'a ShaderInterface,
    config: HeaderConfig,
}

impl<'a> HeaderWriter<'a> {
    pub fn new(interface: &'a ShaderInterface) -> Self {
        Self {
            interface,
            config: HeaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HeaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Include guard macro, e.g. `V450_GLTF_DEFINES_H`.
    pub fn guard_name(&self) -> String {
        let dir: String = self
            .interface
            .directory
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{dir}_DEFINES_H")
    }

    /// Produce the header text.
    pub fn write(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if let Some(version) = self.config.version {
            sections.push(format!("#version {version}\n"));
        }

        let guard = self.guard_name();
        if self.config.guard {
            sections.push(format!("#ifndef {guard}\n#define {guard}\n"));
        }

        for ty in &self.interface.structs {
            let mut out = format!("struct {} {{\n", ty.name);
            for (member_ty, name) in &ty.members {
                let _ = writeln!(out, "{}{member_ty} {name};", self.config.indent);
            }
            out.push_str("};\n");
            sections.push(out);
        }

        for group in GROUP_ORDER {
            let mut defines = self
                .interface
                .defines
                .iter()
                .filter(|d| d.group == group)
                .peekable();
            if defines.peek().is_none() {
                continue;
            }
            let mut out = format!("{}\n", group.heading());
            for define in defines {
                let _ = writeln!(out, "#define {} {}", define.name, define.expr);
            }
            sections.push(out);
        }

        if !self.interface.samplers.is_empty() {
            let mut out = String::new();
            for sampler in &self.interface.samplers {
                let binding = qualifier_value(sampler.symbol.as_deref(), sampler.binding);
                let precision = sampler
                    .precision
                    .map(|p| format!("{} ", p.glsl_name()))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "layout(binding = {binding}) uniform {precision}sampler2D {};",
                    sampler.name
                );
            }
            sections.push(out);
        }

        for block in &self.interface.uniform_blocks {
            sections.push(self.block(block));
        }

        if !self.interface.inputs.is_empty() {
            sections.push(variables("in", &self.interface.inputs));
        }
        if !self.interface.outputs.is_empty() {
            sections.push(variables("out", &self.interface.outputs));
        }

        if self.config.guard {
            sections.push(format!("#endif // {guard}\n"));
        }

        log::debug!(
            "Generated header for '{}' ({} sections)",
            self.interface.name,
            sections.len()
        );
        sections.join("\n")
    }

    fn block(&self, block: &UniformBlock) -> String {
        let binding = qualifier_value(block.binding_symbol.as_deref(), block.binding);
        let qualifier = match block.layout {
            BlockLayout::Std140 => format!("std140, binding = {binding}"),
            BlockLayout::Shared => format!("binding = {binding}"),
        };

        let mut out = format!("layout({qualifier}) uniform {} {{\n", block.name);
        for member in &block.members {
            let suffix = member
                .array_len
                .map(|len| format!("[{len}]"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "{}{} {}{suffix};",
                self.config.indent, member.ty, member.name
            );
        }
        match &block.instance_name {
            Some(instance) => {
                let _ = writeln!(out, "}} {instance};");
            }
            None => out.push_str("};\n"),
        }
        out
    }
}

fn qualifier_value(symbol: Option<&str>, value: u32) -> String {
    symbol.map_or_else(|| value.to_string(), str::to_string)
}

fn variables(direction: &str, variables: &[InterfaceVariable]) -> String {
    let mut out = String::new();
    for variable in variables {
        let location = qualifier_value(variable.symbol.as_deref(), variable.location);
        let _ = writeln!(
            out,
            "layout(location = {location}) {direction} {} {};",
            variable.ty, variable.name
        );
    }
    out
}
