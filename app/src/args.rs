//! Command line arguments trait and default implementation.
//!
//! Uses clap for CLI parsing with help text and validation of the
//! variant selection.

use std::path::{Path, PathBuf};

use prism_interface::ShaderInterface;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUT_DIR: &str = "assets";

/// Which shader families to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariantSelection {
    /// `v450` only.
    Base,
    /// `v450/gltf` only.
    Pbr,
    /// Every family.
    #[default]
    All,
}

impl VariantSelection {
    /// Interface tables for the selection, in directory order.
    pub fn interfaces(&self) -> Vec<ShaderInterface> {
        match self {
            Self::Base => vec![ShaderInterface::base()],
            Self::Pbr => vec![ShaderInterface::pbr()],
            Self::All => prism_interface::all_interfaces(),
        }
    }
}

/// Trait for parsing command line arguments.
///
/// Every method except [`parse`](HeadersArgs::parse) has a default, so a
/// custom implementation only overrides the options it cares about.
///
/// # Example
///
/// ```ignore
/// use prism_app::{HeadersArgs, VariantSelection};
///
/// struct CheckPbr;
///
/// impl HeadersArgs for CheckPbr {
///     fn parse() -> Self {
///         CheckPbr
///     }
///
///     fn variant(&self) -> VariantSelection {
///         VariantSelection::Pbr
///     }
///
///     fn check(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait HeadersArgs: Sized {
    /// Parse command line arguments.
    fn parse() -> Self;

    /// Root directory the headers are written under.
    ///
    /// Default: `assets`
    fn out_dir(&self) -> &Path {
        Path::new(DEFAULT_OUT_DIR)
    }

    /// Shader families to process.
    ///
    /// Default: `VariantSelection::All`
    fn variant(&self) -> VariantSelection {
        VariantSelection::All
    }

    /// Compare the headers on disk instead of writing them.
    ///
    /// Default: false
    fn check(&self) -> bool {
        false
    }

    /// Write the headers to stdout instead of to files.
    ///
    /// Default: false
    fn print(&self) -> bool {
        false
    }
}

// ============================================================================
// CLI variant selection
// ============================================================================

/// Shader family selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliVariant {
    /// Flat-shaded `v450` family.
    Base,
    /// glTF PBR family under `v450/gltf`.
    Pbr,
    /// Both families.
    #[default]
    All,
}

impl From<CliVariant> for VariantSelection {
    fn from(cli: CliVariant) -> Self {
        match cli {
            CliVariant::Base => VariantSelection::Base,
            CliVariant::Pbr => VariantSelection::Pbr,
            CliVariant::All => VariantSelection::All,
        }
    }
}

// ============================================================================
// Default args (clap)
// ============================================================================

/// Default command line arguments implementation.
///
/// # Examples
///
/// ```bash
/// # Regenerate every header under ./assets
/// prism-headers
///
/// # Check the PBR header in a different asset root
/// prism-headers --out-dir ../game/assets --variant pbr --check
///
/// # Show the generated base header
/// prism-headers --variant base --print
/// ```
#[derive(Debug, Clone)]
pub struct DefaultHeadersArgs {
    out_dir: PathBuf,
    variant: VariantSelection,
    check: bool,
    print: bool,
}

impl Default for DefaultHeadersArgs {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            variant: VariantSelection::All,
            check: false,
            print: false,
        }
    }
}

impl DefaultHeadersArgs {
    /// Default args writing under `out_dir`.
    pub fn with_out_dir(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            ..Default::default()
        }
    }

    /// Restrict to some shader families.
    pub fn with_variant(mut self, variant: VariantSelection) -> Self {
        self.variant = variant;
        self
    }

    /// Compare instead of writing.
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Print instead of writing.
    pub fn with_print(mut self, print: bool) -> Self {
        self.print = print;
        self
    }
}

mod native {
    use super::*;
    use clap::Parser;

    /// Prism shader interface header generator.
    #[derive(Parser, Debug)]
    #[command(
        name = "prism-headers",
        about = "Generate the defines.h headers shared by Prism shader stages",
        long_about = "Generates the defines.h header of each shader family from the \
            interface tables compiled into this tool.\n\n\
            The headers land in <OUT_DIR>/v450/defines.h and \
            <OUT_DIR>/v450/gltf/defines.h.\n\n\
            EXAMPLES:\n\
              # Regenerate everything\n\
              prism-headers --out-dir assets\n\
            \n\
              # Fail if the checked-in headers drifted\n\
              prism-headers --check",
        version
    )]
    pub(super) struct ClapArgs {
        /// Root directory of the shader assets.
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        pub out_dir: PathBuf,

        /// Shader family to process.
        #[arg(long, default_value = "all", value_enum)]
        pub variant: CliVariant,

        /// Verify the headers on disk instead of writing them.
        #[arg(long, conflicts_with = "print")]
        pub check: bool,

        /// Write the headers to stdout.
        #[arg(long)]
        pub print: bool,
    }

    impl From<ClapArgs> for DefaultHeadersArgs {
        fn from(args: ClapArgs) -> Self {
            Self {
                out_dir: args.out_dir,
                variant: args.variant.into(),
                check: args.check,
                print: args.print,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let args: DefaultHeadersArgs = ClapArgs::parse_from(["prism-headers"]).into();
            assert_eq!(args.out_dir(), Path::new("assets"));
            assert_eq!(args.variant(), VariantSelection::All);
            assert!(!args.check());
            assert!(!args.print());
        }

        #[test]
        fn test_all_options() {
            let args: DefaultHeadersArgs = ClapArgs::parse_from([
                "prism-headers",
                "--out-dir",
                "shaders",
                "--variant",
                "pbr",
                "--check",
            ])
            .into();
            assert_eq!(args.out_dir(), Path::new("shaders"));
            assert_eq!(args.variant(), VariantSelection::Pbr);
            assert!(args.check());
        }

        #[test]
        fn test_check_conflicts_with_print() {
            let result = ClapArgs::try_parse_from(["prism-headers", "--check", "--print"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_unknown_variant_is_rejected() {
            let result = ClapArgs::try_parse_from(["prism-headers", "--variant", "es300"]);
            assert!(result.is_err());
        }
    }
}

impl HeadersArgs for DefaultHeadersArgs {
    fn parse() -> Self {
        use clap::Parser;
        native::ClapArgs::parse().into()
    }

    fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn variant(&self) -> VariantSelection {
        self.variant
    }

    fn check(&self) -> bool {
        self.check
    }

    fn print(&self) -> bool {
        self.print
    }
}
