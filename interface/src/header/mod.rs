//! `defines.h` generation, parsing and verification.
//!
//! Each shader family ships one header that every stage includes. The header
//! is generated from a [`ShaderInterface`](crate::ShaderInterface) by
//! [`HeaderWriter`]. [`HeaderDocument`] reads headers back, including the
//! hand-written ones, so that [`verify_header`] can compare a file on disk
//! with the table it is supposed to mirror.

pub mod expr;
mod parser;
mod writer;

pub use expr::{DefineExpr, DefineTable};
pub use parser::{
    verify_header, HeaderDocument, ParsedBlock, ParsedDefine, ParsedSampler, ParsedVariable,
};
pub use writer::HeaderWriter;

/// Controls what [`HeaderWriter`] emits around the declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderConfig {
    /// Emit `#version N` first. Headers are normally included after the
    /// stage's own `#version`, so this is off by default.
    pub version: Option<u32>,
    /// Wrap the header in an `#ifndef` include guard.
    pub guard: bool,
    /// Indentation of block and struct members.
    pub indent: &'static str,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            version: None,
            guard: false,
            indent: "\t",
        }
    }
}

impl HeaderConfig {
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_guard(mut self, guard: bool) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }
}
