//! # Prism App
//!
//! Command line front end that keeps the `defines.h` headers in a shader
//! asset tree in step with the interface tables in `prism-interface`.
//!
//! ## Overview
//!
//! - [`HeadersArgs`] - Trait for parsing command line arguments
//! - [`run`] - Generate, print or check the selected headers
//! - [`HeadersError`] - Everything that can fail along the way
//!
//! ## Example
//!
//! ```ignore
//! use prism_app::{DefaultHeadersArgs, HeadersArgs};
//!
//! fn main() {
//!     let args = DefaultHeadersArgs::parse();
//!     prism_app::run(&args).unwrap();
//! }
//! ```

mod args;
mod error;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use prism_interface::{verify_header, DefineGroup, HeaderWriter, ShaderInterface};

pub use args::{CliVariant, DefaultHeadersArgs, HeadersArgs, VariantSelection, DEFAULT_OUT_DIR};
pub use error::HeadersError;

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the app subsystem.
pub fn init() {
    log::info!("Prism App v{} initialized", VERSION);
    prism_interface::init();
}

/// Generate, print or check every selected header.
pub fn run(args: &impl HeadersArgs) -> Result<(), HeadersError> {
    let stdout = io::stdout();
    run_with_output(args, &mut stdout.lock())
}

/// [`run`] with `--print` output sent to `out`.
pub fn run_with_output(args: &impl HeadersArgs, out: &mut impl Write) -> Result<(), HeadersError> {
    let mut mismatches = Vec::new();

    for interface in args.variant().interfaces() {
        interface.validate()?;
        let text = HeaderWriter::new(&interface).write();
        let path = args.out_dir().join(interface.header_path());

        if args.print() {
            print_header(out, &interface, &text)?;
        } else if args.check() {
            if !check_header(&path, &interface)? {
                mismatches.push(path);
            }
        } else {
            write_header(&path, &text)?;
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(HeadersError::Mismatch(mismatches))
    }
}

fn print_header(
    out: &mut impl Write,
    interface: &ShaderInterface,
    text: &str,
) -> Result<(), HeadersError> {
    let io_err = |source| HeadersError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    };
    writeln!(out, "// {}", interface.header_path()).map_err(io_err)?;
    out.write_all(text.as_bytes()).map_err(io_err)?;
    out.flush().map_err(io_err)
}

fn write_header(path: &Path, text: &str) -> Result<(), HeadersError> {
    let io_err = |source| HeadersError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, text).map_err(io_err)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Returns `false` when the header on disk disagrees with the table.
fn check_header(path: &Path, interface: &ShaderInterface) -> Result<bool, HeadersError> {
    let text = fs::read_to_string(path).map_err(|source| HeadersError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Hand-written headers leave the struct slot counts to the includer.
    let externals = struct_slot_counts(interface)?;
    let externals: Vec<(&str, i64)> = externals
        .iter()
        .map(|(name, value)| (name.as_str(), i64::from(*value)))
        .collect();

    match verify_header(&text, interface, &externals) {
        Ok(()) => {
            log::info!("{} is up to date", path.display());
            Ok(true)
        }
        Err(err) => {
            log::warn!("{} is out of date: {err}", path.display());
            Ok(false)
        }
    }
}

fn struct_slot_counts(interface: &ShaderInterface) -> Result<Vec<(String, u32)>, HeadersError> {
    let values = interface.shader_defs()?;
    Ok(values
        .into_iter()
        .filter(|(name, _)| {
            interface
                .define(name)
                .is_some_and(|d| d.group == DefineGroup::Struct)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    /// Fresh scratch directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("prism-app-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_write_then_check() {
        let dir = scratch_dir("write-check");
        let args = DefaultHeadersArgs::with_out_dir(&dir);
        run(&args).unwrap();

        let base = fs::read_to_string(dir.join("v450/defines.h")).unwrap();
        assert!(base.contains("#define MATRIX_LOCATION_UNIFORM 0"));
        assert!(dir.join("v450/gltf/defines.h").exists());

        run(&args.with_check(true)).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_check_reports_drift() {
        let dir = scratch_dir("drift");
        run(&DefaultHeadersArgs::with_out_dir(&dir)).unwrap();

        let path = dir.join("v450/gltf/defines.h");
        let edited = fs::read_to_string(&path)
            .unwrap()
            .replace("#define LIGHT_LOCATION 14", "#define LIGHT_LOCATION 15");
        fs::write(&path, edited).unwrap();

        let err = run(&DefaultHeadersArgs::with_out_dir(&dir).with_check(true)).unwrap_err();
        match err {
            HeadersError::Mismatch(paths) => assert_eq!(paths, vec![path]),
            other => panic!("unexpected error: {other}"),
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_check_reports_overflowing_define() {
        let dir = scratch_dir("overflow");
        run(&DefaultHeadersArgs::with_out_dir(&dir)).unwrap();

        let path = dir.join("v450/defines.h");
        let edited = fs::read_to_string(&path).unwrap().replace(
            "#define MATRIX_LOCATION_UNIFORM 0",
            "#define MATRIX_LOCATION_UNIFORM 9223372036854775807 + 1",
        );
        fs::write(&path, edited).unwrap();

        let err = run(&DefaultHeadersArgs::with_out_dir(&dir).with_check(true)).unwrap_err();
        match err {
            HeadersError::Mismatch(paths) => assert_eq!(paths, vec![path]),
            other => panic!("unexpected error: {other}"),
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_check_accepts_header_without_struct_counts() {
        let dir = scratch_dir("externals");
        let pbr = ShaderInterface::pbr();
        let text: String = HeaderWriter::new(&pbr)
            .write()
            .lines()
            .filter(|line| !line.contains("_LOCATIONS "))
            .map(|line| format!("{line}\n"))
            .collect();
        let path = dir.join(pbr.header_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();

        let args = DefaultHeadersArgs::with_out_dir(&dir)
            .with_variant(VariantSelection::Pbr)
            .with_check(true);
        run(&args).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_check_missing_file_is_io_error() {
        let dir = scratch_dir("missing");
        let args = DefaultHeadersArgs::with_out_dir(&dir).with_check(true);
        assert!(matches!(run(&args), Err(HeadersError::Io { .. })));
    }

    #[rstest]
    #[case::base(VariantSelection::Base, &["// v450/defines.h"])]
    #[case::pbr(VariantSelection::Pbr, &["// v450/gltf/defines.h"])]
    #[case::all(VariantSelection::All, &["// v450/defines.h", "// v450/gltf/defines.h"])]
    fn test_print(#[case] variant: VariantSelection, #[case] headings: &[&str]) {
        let dir = scratch_dir("print");
        let args = DefaultHeadersArgs::with_out_dir(&dir)
            .with_variant(variant)
            .with_print(true);
        let mut out = Vec::new();
        run_with_output(&args, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        for heading in headings {
            assert!(text.contains(heading), "{heading}");
        }
        assert!(!dir.exists());
    }
}
