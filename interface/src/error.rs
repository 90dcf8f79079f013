//! Shader interface error types.

use std::fmt;

/// Errors that can occur while building, validating or parsing a shader interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    /// Two variables of the same direction start at the same location.
    DuplicateLocation {
        location: u32,
        first: String,
        second: String,
    },
    /// Two variables of the same direction occupy overlapping location ranges.
    LocationOverlap {
        first: String,
        first_range: (u32, u32),
        second: String,
        second_range: (u32, u32),
    },
    /// A variable's location range runs past the last representable location.
    LocationOutOfRange {
        name: String,
        location: u32,
        slots: u32,
    },
    /// Two samplers or uniform blocks share a binding index.
    DuplicateBinding {
        binding: u32,
        first: String,
        second: String,
    },
    /// A define expression references a symbol that is not defined.
    UnknownSymbol(String),
    /// A define refers back to itself through its dependencies.
    CyclicDefine(String),
    /// A define expression could not be parsed.
    InvalidExpression { expr: String, message: String },
    /// A define used as a location or binding evaluated below zero.
    NegativeLocation { name: String, value: i64 },
    /// A variable names a struct type that the interface does not declare.
    UnknownType(String),
    /// A uniform block member has a type std140 packing does not cover.
    UnsupportedBlockMember { block: String, member: String },
    /// A symbolic slot does not evaluate to the number recorded for it.
    SymbolMismatch {
        name: String,
        expected: i64,
        found: i64,
    },
    /// A vertex attribute does not fit the shader input it feeds.
    AttributeMismatch { attribute: String, message: String },
    /// An array index is past the end of a fixed-size block array.
    IndexOutOfRange { index: usize, len: usize },
    /// Header text could not be parsed.
    HeaderParse { line: usize, message: String },
    /// An `#include` names a source that was never registered.
    IncludeNotFound(String),
    /// naga rejected the composed shader.
    ShaderCompilationFailed(String),
    /// Reading or writing a header failed.
    Io(String),
}

impl fmt::Display for InterfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateLocation {
                location,
                first,
                second,
            } => write!(f, "location {location} used by both `{first}` and `{second}`"),
            Self::LocationOverlap {
                first,
                first_range,
                second,
                second_range,
            } => write!(
                f,
                "`{first}` (locations {}..{}) overlaps `{second}` (locations {}..{})",
                first_range.0, first_range.1, second_range.0, second_range.1
            ),
            Self::LocationOutOfRange {
                name,
                location,
                slots,
            } => write!(
                f,
                "`{name}` at location {location} needs {slots} slots past the last location"
            ),
            Self::DuplicateBinding {
                binding,
                first,
                second,
            } => write!(f, "binding {binding} used by both `{first}` and `{second}`"),
            Self::UnknownSymbol(name) => write!(f, "unknown symbol `{name}`"),
            Self::CyclicDefine(name) => write!(f, "define `{name}` depends on itself"),
            Self::InvalidExpression { expr, message } => {
                write!(f, "invalid define expression `{expr}`: {message}")
            }
            Self::NegativeLocation { name, value } => {
                write!(f, "`{name}` evaluates to negative slot {value}")
            }
            Self::UnknownType(name) => write!(f, "unknown type `{name}`"),
            Self::UnsupportedBlockMember { block, member } => {
                write!(f, "member `{member}` of block `{block}` cannot be packed as std140")
            }
            Self::SymbolMismatch {
                name,
                expected,
                found,
            } => write!(f, "`{name}` expected {expected}, found {found}"),
            Self::AttributeMismatch { attribute, message } => {
                write!(f, "vertex attribute `{attribute}`: {message}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for array of length {len}")
            }
            Self::HeaderParse { line, message } => write!(f, "line {line}: {message}"),
            Self::IncludeNotFound(path) => write!(f, "include not found: \"{path}\""),
            Self::ShaderCompilationFailed(msg) => write!(f, "shader compilation failed: {msg}"),
            Self::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for InterfaceError {}

impl From<std::io::Error> for InterfaceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InterfaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InterfaceError::UnknownSymbol("LIGHT_LOCATIONS".to_string());
        assert_eq!(err.to_string(), "unknown symbol `LIGHT_LOCATIONS`");

        let err = InterfaceError::DuplicateLocation {
            location: 4,
            first: "vTexCoord".to_string(),
            second: "vTexNormal".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "location 4 used by both `vTexCoord` and `vTexNormal`"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: InterfaceError = io.into();
        assert!(matches!(err, InterfaceError::Io(_)));
    }
}
