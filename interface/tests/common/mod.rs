//! Shared fixtures for the integration tests.
//!
//! The headers under `fixtures/` are the hand-written `defines.h` files the
//! generated ones replace. They are kept verbatim so that the parser and the
//! verification stay compatible with headers already in the asset tree.

#![allow(dead_code)]

use prism_interface::ShaderInterface;

/// Hand-written `v450/defines.h`.
pub const BASE_HEADER: &str = include_str!("../fixtures/v450/defines.h");

/// Hand-written `v450/gltf/defines.h`. It uses `LIGHT_LOCATIONS` and
/// `MATERIAL_LOCATIONS` without defining them.
pub const PBR_HEADER: &str = include_str!("../fixtures/v450/gltf/defines.h");

/// Values the hand-written PBR header expects from the including shader.
pub const PBR_EXTERNALS: &[(&str, i64)] = &[("LIGHT_LOCATIONS", 3), ("MATERIAL_LOCATIONS", 7)];

/// Shader family under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Base,
    Pbr,
}

impl Variant {
    pub fn interface(self) -> ShaderInterface {
        match self {
            Variant::Base => ShaderInterface::base(),
            Variant::Pbr => ShaderInterface::pbr(),
        }
    }

    pub fn hand_written_header(self) -> &'static str {
        match self {
            Variant::Base => BASE_HEADER,
            Variant::Pbr => PBR_HEADER,
        }
    }

    pub fn externals(self) -> &'static [(&'static str, i64)] {
        match self {
            Variant::Base => &[],
            Variant::Pbr => PBR_EXTERNALS,
        }
    }
}

/// Route `log` output to the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
