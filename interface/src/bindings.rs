//! Descriptor bindings derived from a shader interface.
//!
//! The GLSL headers fix a binding index for every sampler and uniform block.
//! A [`BindingLayout`] is the host-side view of the same table, used to
//! create descriptor set or bind group layouts that agree with the shaders.

use std::collections::HashMap;

use crate::error::{InterfaceError, Result};

/// Kind of resource expected at a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    UniformBuffer,
    /// GLSL `sampler2D`: texture and sampler in one binding.
    CombinedTextureSampler,
}

impl BindingType {
    /// Whether a GLSL `sampler*` uniform can be bound here.
    pub fn is_sampled(&self) -> bool {
        matches!(self, Self::CombinedTextureSampler)
    }
}

bitflags::bitflags! {
    /// Stages that read a binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
    }
}

/// One binding slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingLayoutEntry {
    pub binding: u32,
    pub binding_type: BindingType,
    pub visibility: ShaderStageFlags,
    /// Name of the sampler or block, for debugging.
    pub label: Option<String>,
}

impl BindingLayoutEntry {
    /// Entry visible to the vertex and fragment stages.
    pub fn new(binding: u32, binding_type: BindingType) -> Self {
        Self {
            binding,
            binding_type,
            visibility: ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT,
            label: None,
        }
    }

    pub fn with_visibility(mut self, visibility: ShaderStageFlags) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("binding {}", self.binding))
    }
}

/// All bindings of one shader family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingLayout {
    pub entries: Vec<BindingLayoutEntry>,
    pub label: Option<String>,
}

impl BindingLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, entry: BindingLayoutEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_uniform_buffer(self, binding: u32) -> Self {
        self.with_entry(BindingLayoutEntry::new(binding, BindingType::UniformBuffer))
    }

    pub fn with_combined_texture_sampler(self, binding: u32) -> Self {
        self.with_entry(
            BindingLayoutEntry::new(binding, BindingType::CombinedTextureSampler)
                .with_visibility(ShaderStageFlags::FRAGMENT),
        )
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Entry at a binding index.
    pub fn entry(&self, binding: u32) -> Option<&BindingLayoutEntry> {
        self.entries.iter().find(|e| e.binding == binding)
    }

    /// Highest binding index in use.
    pub fn max_binding(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.binding).max()
    }

    /// Entries sorted by binding index.
    pub fn sorted_entries(&self) -> Vec<&BindingLayoutEntry> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|e| e.binding);
        entries
    }

    /// Reject layouts that use a binding index twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<u32, &BindingLayoutEntry> = HashMap::new();
        for entry in &self.entries {
            if let Some(first) = seen.insert(entry.binding, entry) {
                return Err(InterfaceError::DuplicateBinding {
                    binding: entry.binding,
                    first: first.display_name(),
                    second: entry.display_name(),
                });
            }
        }
        Ok(())
    }
}
